//! In-progress region/size selection held by the entry form.

use serde::{Deserialize, Serialize};

use super::provider::CloudProvider;

/// The region and size a user has picked but not yet committed.
///
/// Both option sets depend on the provider, so switching provider
/// discards the selection. Committed rows are never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSelection {
    provider: CloudProvider,
    region: Option<String>,
    size: Option<String>,
}

impl DraftSelection {
    pub fn new(provider: CloudProvider) -> Self {
        Self {
            provider,
            region: None,
            size: None,
        }
    }

    pub fn provider(&self) -> CloudProvider {
        self.provider
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    pub fn select_region(&mut self, region: impl Into<String>) {
        self.region = Some(region.into());
    }

    pub fn select_size(&mut self, size: impl Into<String>) {
        self.size = Some(size.into());
    }

    /// Switches provider. Returns true if the selection was discarded.
    pub fn switch_provider(&mut self, provider: CloudProvider) -> bool {
        if provider == self.provider {
            return false;
        }
        self.provider = provider;
        let had_selection = self.region.is_some() || self.size.is_some();
        self.clear();
        had_selection
    }

    pub fn clear(&mut self) {
        self.region = None;
        self.size = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_provider_discards_selection() {
        let mut draft = DraftSelection::new(CloudProvider::Aws);
        draft.select_region("us-east-1");
        draft.select_size("m5.xlarge");

        assert!(draft.switch_provider(CloudProvider::Gcp));
        assert_eq!(draft.provider(), CloudProvider::Gcp);
        assert_eq!(draft.region(), None);
        assert_eq!(draft.size(), None);
    }

    #[test]
    fn same_provider_keeps_selection() {
        let mut draft = DraftSelection::new(CloudProvider::Azure);
        draft.select_region("westeurope");

        assert!(!draft.switch_provider(CloudProvider::Azure));
        assert_eq!(draft.region(), Some("westeurope"));
    }
}
