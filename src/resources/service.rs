//! Telecom services sold through the console

use super::{REGIONS, region_options};
use crate::core::field::parse_timestamp;
use crate::core::filter::FilterSpec;
use crate::core::validation::validators;
use crate::impl_resource;

impl_resource!(
    Service,
    ServiceForm,
    "service",
    "services",
    ["active", "inactive"],
    ["name", "category"],
    {
        #[validate(length(min = 1, message = "category is required"))]
        "category" => category: String,
        "price" => price: f64,
        "region" => region: String,
    },
    |rules| rules.rule("price", validators::non_negative())
);

/// Service categories offered in the console
pub const CATEGORIES: [&str; 4] = ["telecom", "internet", "esim", "roaming"];

impl Service {
    /// Filters of the services screen
    pub fn filter_specs() -> Vec<FilterSpec> {
        let mut category = FilterSpec::select("category", "Category");
        for value in CATEGORIES {
            category = category.option(value, value);
        }
        vec![
            FilterSpec::select("status", "Status")
                .option("active", "Active")
                .option("inactive", "Inactive"),
            category,
            region_options(FilterSpec::multiselect("region", "Region")),
            FilterSpec::numeric_range("price", "Price (UZS)"),
        ]
    }

    /// Build an active service with a fixed id
    pub fn fixture(id: &str, name: &str, category: &str, price: f64, region: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status: "active".to_string(),
            category: category.to_string(),
            price,
            region: region.to_string(),
            created_at: parse_timestamp("2024-01-01").unwrap_or_default(),
        }
    }

    /// Seed data of the services screen
    pub fn fixtures() -> Vec<Self> {
        let rows = [
            ("svc-1", "SIM karta", "telecom", 15_000.0, "active"),
            ("svc-2", "eSIM aktivatsiya", "esim", 25_000.0, "active"),
            ("svc-3", "Mobil internet 10 GB", "internet", 45_000.0, "active"),
            ("svc-4", "Mobil internet 30 GB", "internet", 90_000.0, "active"),
            ("svc-5", "Xalqaro rouming", "roaming", 120_000.0, "inactive"),
            ("svc-6", "Raqamni saqlash", "telecom", 5_000.0, "active"),
            ("svc-7", "eSIM almashtirish", "esim", 18_000.0, "inactive"),
            ("svc-8", "Cheksiz internet", "internet", 150_000.0, "active"),
        ];
        rows.iter()
            .enumerate()
            .map(|(i, (id, name, category, price, status))| Self {
                id: id.to_string(),
                name: name.to_string(),
                status: status.to_string(),
                category: category.to_string(),
                price: *price,
                region: REGIONS[(i * 3) % REGIONS.len()].to_string(),
                created_at: parse_timestamp(&format!("2024-{:02}-10", i + 1)).unwrap_or_default(),
            })
            .collect()
    }
}
