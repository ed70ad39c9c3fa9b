//! Call-centre operators

use super::{REGIONS, region_options};
use crate::core::field::{FieldFormat, parse_timestamp};
use crate::core::filter::FilterSpec;
use crate::core::validation::validators;
use crate::impl_resource;

impl_resource!(
    Operator,
    OperatorForm,
    "operator",
    "operators",
    ["active", "inactive"],
    ["name", "phone", "region"],
    {
        #[validate(length(min = 1, message = "region is required"))]
        "region" => region: String,
        "phone" => phone: String,
        "citizenship" => citizenship: String,
    },
    |rules| rules.rule("phone", validators::format(FieldFormat::Phone))
);

impl Operator {
    /// Filters of the operators screen
    pub fn filter_specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::select("status", "Status")
                .option("active", "Active")
                .option("inactive", "Inactive"),
            region_options(FilterSpec::multiselect("region", "Region")),
            FilterSpec::select("citizenship", "Citizenship")
                .option("UZ", "Uzbekistan")
                .option("KZ", "Kazakhstan")
                .option("TJ", "Tajikistan"),
            FilterSpec::date_range("createdAt", "Registered"),
        ]
    }

    /// Build an operator with a fixed id and creation time
    pub fn fixture(id: &str, name: &str, region: &str, status: &str, created_at: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status: status.to_string(),
            region: region.to_string(),
            phone: "+998901234567".to_string(),
            citizenship: "UZ".to_string(),
            created_at: parse_timestamp(created_at).unwrap_or_default(),
        }
    }

    /// Seed data of the operators screen
    pub fn fixtures() -> Vec<Self> {
        let rows = [
            ("op-1", "Alisher Karimov", "active", "2024-01-15T09:12:00Z"),
            ("op-2", "Malika Yusupova", "active", "2024-02-03T10:45:00Z"),
            ("op-3", "Bobur Rahimov", "inactive", "2024-02-21T14:05:00Z"),
            ("op-4", "Dilnoza Tursunova", "active", "2024-03-11T08:30:00Z"),
            ("op-5", "Jasur Aliyev", "active", "2024-04-02T16:20:00Z"),
            ("op-6", "Nodira Saidova", "inactive", "2024-04-27T11:00:00Z"),
            ("op-7", "Sardor Ismoilov", "active", "2024-05-19T13:40:00Z"),
            ("op-8", "Gulnora Hasanova", "active", "2024-06-08T09:55:00Z"),
            ("op-9", "Otabek Nazarov", "inactive", "2024-07-01T17:10:00Z"),
            ("op-10", "Kamola Ergasheva", "active", "2024-07-23T12:25:00Z"),
            ("op-11", "Rustam Qodirov", "active", "2024-08-14T15:00:00Z"),
            ("op-12", "Zarina Mirzayeva", "active", "2024-09-05T10:15:00Z"),
        ];
        rows.iter()
            .enumerate()
            .map(|(i, (id, name, status, created_at))| Self {
                id: id.to_string(),
                name: name.to_string(),
                status: status.to_string(),
                region: REGIONS[i % REGIONS.len()].to_string(),
                phone: format!("+99890{:07}", 1_000_000 + i * 111_111),
                citizenship: if i % 5 == 4 { "KZ" } else { "UZ" }.to_string(),
                created_at: parse_timestamp(created_at).unwrap_or_default(),
            })
            .collect()
    }
}
