use serde::Serialize;

use farmops_core::{Entity, VendorId};

use crate::ContactInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vendor {
    id: VendorId,
    name: String,
    contact_name: Option<String>,
    contact: ContactInfo,
}

impl Vendor {
    pub fn new(
        id: VendorId,
        name: impl Into<String>,
        contact_name: Option<String>,
        contact: ContactInfo,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            contact_name,
            contact,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact_name(&self) -> Option<&str> {
        self.contact_name.as_deref()
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_contact_name(&mut self, contact_name: Option<String>) {
        self.contact_name = contact_name;
    }

    pub fn contact_mut(&mut self) -> &mut ContactInfo {
        &mut self.contact
    }
}

impl Entity for Vendor {
    type Id = VendorId;

    const KIND: &'static str = "vendor";

    fn id(&self) -> &VendorId {
        &self.id
    }
}
