use serde::Serialize;

use farmops_core::{Entity, PersonId};

use crate::ContactInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    id: PersonId,
    name: String,
    contact: ContactInfo,
    address: Option<String>,
}

impl Person {
    pub fn new(id: PersonId, name: impl Into<String>, contact: ContactInfo, address: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            contact,
            address,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn contact_mut(&mut self) -> &mut ContactInfo {
        &mut self.contact
    }

    pub fn set_address(&mut self, address: Option<String>) {
        self.address = address;
    }
}

impl Entity for Person {
    type Id = PersonId;

    const KIND: &'static str = "person";

    fn id(&self) -> &PersonId {
        &self.id
    }
}
