//! Reference catalog records.

use serde::{Deserialize, Serialize};

use crate::domain::instance::CloudProvider;

/// One priced instance shape offered in a region.
///
/// Catalog data is read-only reference material; portfolios never write
/// back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub provider: CloudProvider,
    pub region: String,
    pub size: String,
    pub vcpu: u32,
    pub memory_gib: f64,
    pub on_demand_hourly: f64,
    pub reserved_hourly: f64,
    pub spot_hourly: f64,
}

/// Column order of the tabular template.
pub const TEMPLATE_HEADER: [&str; 8] = [
    "provider",
    "region",
    "size",
    "vcpu",
    "memory_gib",
    "on_demand_hourly",
    "reserved_hourly",
    "spot_hourly",
];

impl CatalogEntry {
    /// Returns the entry's fields in template column order.
    pub fn template_record(&self) -> [String; 8] {
        [
            self.provider.as_str().to_string(),
            self.region.clone(),
            self.size.clone(),
            self.vcpu.to_string(),
            format!("{}", self.memory_gib),
            format!("{:.4}", self.on_demand_hourly),
            format!("{:.4}", self.reserved_hourly),
            format!("{:.4}", self.spot_hourly),
        ]
    }
}
