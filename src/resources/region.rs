//! Administrative regions

use super::REGIONS;
use crate::core::field::parse_timestamp;
use crate::core::filter::FilterSpec;
use crate::impl_resource;

impl_resource!(
    Region,
    RegionForm,
    "region",
    "regions",
    ["active", "inactive"],
    ["name", "code"],
    {
        #[validate(length(min = 2, max = 3, message = "code must have 2 or 3 letters"))]
        "code" => code: String,
        "population" => population: u32,
    }
);

impl Region {
    pub fn filter_specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::select("status", "Status")
                .option("active", "Active")
                .option("inactive", "Inactive"),
            FilterSpec::numeric_range("population", "Population"),
            FilterSpec::date_range("createdAt", "Added"),
        ]
    }

    /// Seed data of the regions screen
    pub fn fixtures() -> Vec<Self> {
        const CODES: [&str; 13] = [
            "TAS", "SAM", "BUX", "FAR", "AND", "NAM", "XOR", "NAV", "QAS", "SUR", "JIZ", "SIR",
            "QR",
        ];
        const POPULATION: [u32; 13] = [
            3_040_000, 4_170_000, 2_000_000, 3_980_000, 3_340_000, 2_950_000, 1_960_000, 1_030_000,
            3_480_000, 2_790_000, 1_450_000, 910_000, 1_990_000,
        ];
        REGIONS
            .iter()
            .enumerate()
            .map(|(i, name)| Self {
                id: format!("reg-{}", i + 1),
                name: name.to_string(),
                status: if i == 12 { "inactive" } else { "active" }.to_string(),
                code: CODES[i].to_string(),
                population: POPULATION[i],
                created_at: parse_timestamp("2023-06-01").unwrap_or_default(),
            })
            .collect()
    }
}
