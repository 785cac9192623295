//! Explicit application state owned by the portfolio store.

use crate::domain::instance::{CloudProvider, DraftSelection, InstanceRow};
use crate::domain::portfolio::Portfolio;

/// What the views are currently looking at.
///
/// - `provider` prices new rows and scopes region validation
/// - `active` is the selected saved portfolio, if any
/// - `draft` holds rows entered while nothing is selected
/// - `selection` is the region/size the entry form has picked so far
#[derive(Debug, Clone)]
pub struct AppState {
    provider: CloudProvider,
    active: Option<Portfolio>,
    draft: Vec<InstanceRow>,
    selection: DraftSelection,
}

impl AppState {
    pub fn new(provider: CloudProvider) -> Self {
        Self {
            provider,
            active: None,
            draft: Vec::new(),
            selection: DraftSelection::new(provider),
        }
    }

    pub fn provider(&self) -> CloudProvider {
        self.provider
    }

    pub fn active(&self) -> Option<&Portfolio> {
        self.active.as_ref()
    }

    pub fn draft(&self) -> &[InstanceRow] {
        &self.draft
    }

    pub fn selection(&self) -> &DraftSelection {
        &self.selection
    }

    /// Rows shown in the table: the active portfolio's, else the draft.
    pub fn visible_rows(&self) -> &[InstanceRow] {
        match &self.active {
            Some(portfolio) => portfolio.rows(),
            None => &self.draft,
        }
    }

    /// Returns true if the active portfolio has this name (case-insensitive).
    pub fn is_active(&self, name: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|p| p.name().key() == name.trim().to_lowercase())
    }

    pub(crate) fn set_active(&mut self, portfolio: Option<Portfolio>) {
        self.active = portfolio;
    }

    pub(crate) fn take_active(&mut self) -> Option<Portfolio> {
        self.active.take()
    }

    pub(crate) fn set_draft(&mut self, rows: Vec<InstanceRow>) {
        self.draft = rows;
    }

    pub(crate) fn selection_mut(&mut self) -> &mut DraftSelection {
        &mut self.selection
    }

    /// Switches provider and clears the draft selection. Returns true if
    /// the provider changed.
    pub(crate) fn switch_provider(&mut self, provider: CloudProvider) -> bool {
        let changed = self.provider != provider;
        self.provider = provider;
        self.selection.switch_provider(provider);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::RowId;
    use crate::domain::instance::PricingModel;
    use crate::domain::portfolio::PortfolioName;

    fn row() -> InstanceRow {
        InstanceRow {
            id: RowId::new(),
            region: "us-east-1".to_string(),
            size: "m5.large".to_string(),
            quantity: 1,
            hours: 730,
            pricing_model: PricingModel::OnDemand,
        }
    }

    #[test]
    fn visible_rows_prefer_active_portfolio() {
        let mut state = AppState::new(CloudProvider::Aws);
        state.set_draft(vec![row(), row()]);
        assert_eq!(state.visible_rows().len(), 2);

        let portfolio = Portfolio::draft(
            PortfolioName::new("Prod").unwrap(),
            CloudProvider::Aws,
            vec![row()],
        );
        state.set_active(Some(portfolio));

        assert_eq!(state.visible_rows().len(), 1);
        assert!(state.is_active(" prod "));
        assert!(!state.is_active("Staging"));
    }

    #[test]
    fn switching_provider_clears_selection() {
        let mut state = AppState::new(CloudProvider::Aws);
        state.selection_mut().select_region("us-east-1");

        assert!(state.switch_provider(CloudProvider::Gcp));
        assert_eq!(state.provider(), CloudProvider::Gcp);
        assert_eq!(state.selection().region(), None);
        assert!(!state.switch_provider(CloudProvider::Gcp));
    }
}
