//! InstanceCatalog port - read-only region and size reference data.

use crate::domain::catalog::CatalogEntry;
use crate::domain::instance::CloudProvider;

/// Port for looking up what a provider offers.
///
/// The catalog is an external, read-only data source. Implementations
/// must return regions and sizes in a stable order.
pub trait InstanceCatalog: Send + Sync {
    /// All catalog entries for a provider.
    fn entries(&self, provider: CloudProvider) -> Vec<CatalogEntry>;

    /// Regions offered by a provider, deduplicated.
    fn regions(&self, provider: CloudProvider) -> Vec<String> {
        let mut regions: Vec<String> = Vec::new();
        for entry in self.entries(provider) {
            if !regions.contains(&entry.region) {
                regions.push(entry.region);
            }
        }
        regions
    }

    /// Sizes offered by a provider in a region.
    fn sizes(&self, provider: CloudProvider, region: &str) -> Vec<String> {
        self.entries(provider)
            .into_iter()
            .filter(|e| e.region == region)
            .map(|e| e.size)
            .collect()
    }

    fn is_valid_region(&self, provider: CloudProvider, region: &str) -> bool {
        self.regions(provider).iter().any(|r| r == region)
    }
}
