//! Built-in console resources
//!
//! The four screens of the console (operators, services, regions, devices)
//! each get a resource type, a form, the filters the screen offers and a
//! fixture set for the in-memory data source.

pub mod device;
pub mod operator;
pub mod region;
pub mod service;

pub use device::{Device, DeviceForm};
pub use operator::{Operator, OperatorForm};
pub use region::{Region, RegionForm};
pub use service::{Service, ServiceForm};

use crate::core::filter::FilterSpec;

/// Regions of Uzbekistan, in display order
pub const REGIONS: [&str; 13] = [
    "Toshkent",
    "Samarqand",
    "Buxoro",
    "Farg'ona",
    "Andijon",
    "Namangan",
    "Xorazm",
    "Navoiy",
    "Qashqadaryo",
    "Surxondaryo",
    "Jizzax",
    "Sirdaryo",
    "Qoraqalpog'iston",
];

fn region_options(mut spec: FilterSpec) -> FilterSpec {
    for region in REGIONS {
        spec = spec.option(region, region);
    }
    spec
}
