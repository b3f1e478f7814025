//! Parties domain module: the vendors the farm buys from and the persons
//! (customers) it sells to.

pub mod person;
pub mod vendor;

pub use person::Person;
pub use vendor::Vendor;

use serde::Serialize;

/// Contact information shared by persons and vendors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
}
