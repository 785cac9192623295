//! Built-in instance catalog.
//!
//! Ships a small reference table per provider. A JSON file with the same
//! record shape can replace it.

use crate::domain::catalog::CatalogEntry;
use crate::domain::instance::CloudProvider;
use crate::ports::InstanceCatalog;

/// Catalog backed by an in-memory list of entries.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Parses a JSON array of catalog entries.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        use CloudProvider::{Aws, Azure, Gcp};

        let mut entries = Vec::new();
        let shapes: [(CloudProvider, &[&str], &[(&str, u32, f64, f64)]); 3] = [
            (
                Aws,
                &["us-east-1", "us-west-2", "eu-west-1"],
                &[
                    ("m5.large", 2, 8.0, 0.096),
                    ("m5.2xlarge", 8, 32.0, 0.384),
                    ("c5a.24xlarge", 96, 192.0, 3.696),
                ],
            ),
            (
                Azure,
                &["eastus", "westeurope", "southeastasia"],
                &[
                    ("Standard_D2s_v3", 2, 8.0, 0.096),
                    ("Standard_D8s_v3", 8, 32.0, 0.384),
                    ("Standard_F16s_v2", 16, 32.0, 0.677),
                ],
            ),
            (
                Gcp,
                &["us-central1", "europe-west1", "asia-east1"],
                &[
                    ("n2-standard-4", 4, 16.0, 0.1942),
                    ("n2-standard-16", 16, 64.0, 0.7769),
                    ("e2-standard-8", 8, 32.0, 0.2681),
                ],
            ),
        ];

        for (provider, regions, sizes) in shapes {
            for region in regions {
                for &(size, vcpu, memory_gib, on_demand) in sizes {
                    entries.push(CatalogEntry {
                        provider,
                        region: region.to_string(),
                        size: size.to_string(),
                        vcpu,
                        memory_gib,
                        on_demand_hourly: on_demand,
                        reserved_hourly: on_demand * 0.62,
                        spot_hourly: on_demand * 0.30,
                    });
                }
            }
        }

        Self::new(entries)
    }
}

impl InstanceCatalog for StaticCatalog {
    fn entries(&self, provider: CloudProvider) -> Vec<CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.provider == provider)
            .cloned()
            .collect()
    }
}
