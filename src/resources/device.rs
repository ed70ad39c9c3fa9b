//! Field devices (terminals, kiosks, modems)

use super::{REGIONS, region_options};
use crate::core::field::{FieldFormat, parse_timestamp};
use crate::core::filter::FilterSpec;
use crate::core::validation::validators;
use crate::impl_resource;
use regex::Regex;
use std::sync::OnceLock;

impl_resource!(
    Device,
    DeviceForm,
    "device",
    "devices",
    ["active", "inactive", "maintenance", "error"],
    ["name", "serial", "region"],
    {
        #[validate(length(min = 1, message = "kind is required"))]
        "kind" => kind: String,
        "region" => region: String,
        #[validate(length(min = 4, max = 32, message = "serial must have 4 to 32 characters"))]
        "serial" => serial: String,
        "firmware" => firmware: Option<String>,
    },
    |rules| rules.rule("firmware", validators::format(firmware_format()))
);

/// Device kinds known to the console
pub const KINDS: [&str; 3] = ["terminal", "kiosk", "modem"];

/// Semantic firmware version, e.g. `2.4.1`
fn firmware_format() -> FieldFormat {
    static FIRMWARE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = FIRMWARE_REGEX.get_or_init(|| {
        Regex::new(r"^\d+\.\d+(\.\d+)?$").expect("firmware pattern is valid")
    });
    FieldFormat::Custom(regex.clone())
}

impl Device {
    pub fn filter_specs() -> Vec<FilterSpec> {
        let mut kind = FilterSpec::multiselect("kind", "Kind");
        for value in KINDS {
            kind = kind.option(value, value);
        }
        vec![
            FilterSpec::select("status", "Status")
                .option("active", "Active")
                .option("inactive", "Inactive")
                .option("maintenance", "Maintenance")
                .option("error", "Error"),
            kind,
            region_options(FilterSpec::multiselect("region", "Region")),
            FilterSpec::date_range("createdAt", "Installed"),
        ]
    }

    /// Seed data of the devices screen
    pub fn fixtures() -> Vec<Self> {
        const STATUSES: [&str; 4] = ["active", "active", "maintenance", "error"];
        (0..10)
            .map(|i| Self {
                id: format!("dev-{}", i + 1),
                name: format!("{} #{}", KINDS[i % KINDS.len()], i + 1),
                status: STATUSES[i % STATUSES.len()].to_string(),
                kind: KINDS[i % KINDS.len()].to_string(),
                region: REGIONS[(i * 2) % REGIONS.len()].to_string(),
                serial: format!("UZ-{:06}", 100_000 + i * 7_919),
                firmware: if i % 3 == 2 { None } else { Some(format!("2.{}.0", i % 4)) },
                created_at: parse_timestamp(&format!("2024-{:02}-15T08:00:00Z", i + 1))
                    .unwrap_or_default(),
            })
            .collect()
    }
}
