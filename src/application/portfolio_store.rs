//! PortfolioStore - the single entry point for portfolio commands.
//!
//! Every command follows the same sequence:
//!
//! 1. Validate everything the command touches
//! 2. Apply the change to a copy of the affected state
//! 3. Persist through the `SnapshotStore`
//! 4. Commit the copy into memory
//! 5. Publish sync signals, then a status notice
//!
//! A command that fails at any step returns before step 4, so neither the
//! in-memory state nor the persisted snapshots change.

use std::sync::Arc;

use crate::domain::foundation::{RowId, Timestamp, ValidationError};
use crate::domain::instance::{CloudProvider, InstanceRow, RawInstanceRow, RowValidator};
use crate::domain::mutation::{replace_all, ReplaceField, ReplaceRules};
use crate::domain::portfolio::{Portfolio, PortfolioError, PortfolioName, PortfolioSummary};
use crate::domain::projection::{CostConstants, CostProjector};
use crate::domain::sync::{Notice, SyncSignal, DEFAULT_NOTICE_TTL_SECS};
use crate::ports::{InstanceCatalog, SignalPublisher, SnapshotStore, SnapshotStoreError};

use super::cost_report::CostReport;
use super::state::AppState;

/// Tunables the store is opened with.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub default_provider: CloudProvider,
    pub constants: CostConstants,
    pub notice_ttl_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            default_provider: CloudProvider::default(),
            constants: CostConstants::default(),
            notice_ttl_secs: DEFAULT_NOTICE_TTL_SECS,
        }
    }
}

/// A successfully applied command, waiting to be announced.
struct Committed<T> {
    value: T,
    signals: Vec<SyncSignal>,
    message: String,
}

impl<T> Committed<T> {
    fn new(value: T, signals: Vec<SyncSignal>, message: impl Into<String>) -> Self {
        Self {
            value,
            signals,
            message: message.into(),
        }
    }
}

fn storage_error(err: SnapshotStoreError) -> PortfolioError {
    PortfolioError::storage(err.to_string())
}

/// Owns the portfolio index and the application state.
///
/// Commands take `&mut self`, so two commands can never interleave on the
/// same snapshot key.
pub struct PortfolioStore {
    snapshots: Arc<dyn SnapshotStore>,
    publisher: Arc<dyn SignalPublisher>,
    catalog: Arc<dyn InstanceCatalog>,
    projector: CostProjector,
    notice_ttl_secs: u64,
    index: Vec<PortfolioSummary>,
    state: AppState,
}

impl PortfolioStore {
    /// Opens the store, loading the portfolio index from storage.
    pub async fn open(
        snapshots: Arc<dyn SnapshotStore>,
        publisher: Arc<dyn SignalPublisher>,
        catalog: Arc<dyn InstanceCatalog>,
        settings: StoreSettings,
    ) -> Result<Self, PortfolioError> {
        let index = snapshots.load_index().await.map_err(storage_error)?;
        tracing::debug!(portfolios = index.len(), "portfolio index loaded");

        Ok(Self {
            snapshots,
            publisher,
            catalog,
            projector: CostProjector::new(settings.constants),
            notice_ttl_secs: settings.notice_ttl_secs,
            index,
            state: AppState::new(settings.default_provider),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Saved portfolios in creation order, for the sidebar.
    pub fn list_portfolios(&self) -> &[PortfolioSummary] {
        &self.index
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Rows currently shown in the table.
    pub fn rows(&self) -> &[InstanceRow] {
        self.state.visible_rows()
    }

    pub fn projector(&self) -> &CostProjector {
        &self.projector
    }

    /// Projections and grand totals for the visible rows.
    pub fn cost_report(&self) -> CostReport {
        CostReport::build(&self.projector, self.state.visible_rows())
    }

    /// Regions offered by the active provider.
    pub fn regions(&self) -> Vec<String> {
        self.catalog.regions(self.state.provider())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Portfolio commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates and persists a portfolio from raw rows.
    ///
    /// # Errors
    ///
    /// - `DuplicateName` if the name matches an existing one, ignoring case
    /// - `Validation` if the name is blank, there are no rows, or a row is
    ///   incomplete or invalid
    /// - `Storage` if the snapshot or index could not be written
    pub async fn add_portfolio(
        &mut self,
        name: &str,
        provider: CloudProvider,
        rows: &[RawInstanceRow],
    ) -> Result<PortfolioSummary, PortfolioError> {
        let outcome = self.try_add_portfolio(name, provider, rows).await;
        self.conclude("add_portfolio", outcome).await
    }

    /// Saves the draft table as a new portfolio and selects it.
    pub async fn save_draft(&mut self, name: &str) -> Result<PortfolioSummary, PortfolioError> {
        let outcome = self.try_save_draft(name).await;
        self.conclude("save_draft", outcome).await
    }

    /// Deletes a portfolio and its snapshot. Returns false if no portfolio
    /// had that name.
    pub async fn remove_portfolio(&mut self, name: &str) -> Result<bool, PortfolioError> {
        let outcome = self.try_remove_portfolio(name).await;
        self.conclude("remove_portfolio", outcome).await
    }

    /// Makes a saved portfolio active and returns its rows.
    ///
    /// A portfolio with no snapshot yields no rows; that is not an error.
    pub async fn select_portfolio(
        &mut self,
        name: &str,
    ) -> Result<Vec<InstanceRow>, PortfolioError> {
        let outcome = self.try_select_portfolio(name).await;
        self.conclude("select_portfolio", outcome).await
    }

    /// Renames a portfolio, moving its snapshot to the new key.
    pub async fn rename_portfolio(
        &mut self,
        from: &str,
        to: &str,
    ) -> Result<PortfolioSummary, PortfolioError> {
        let outcome = self.try_rename_portfolio(from, to).await;
        self.conclude("rename_portfolio", outcome).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Row commands (active portfolio, or the draft when none is selected)
    // ─────────────────────────────────────────────────────────────────────────

    /// Validates a complete raw row and appends it.
    pub async fn add_row(&mut self, raw: &RawInstanceRow) -> Result<InstanceRow, PortfolioError> {
        let outcome = self.try_add_row(raw).await;
        self.conclude("add_row", outcome).await
    }

    /// Merges a partial edit over a row and re-normalizes it.
    pub async fn update_row(
        &mut self,
        id: RowId,
        edit: &RawInstanceRow,
    ) -> Result<InstanceRow, PortfolioError> {
        let outcome = self.try_update_row(id, edit).await;
        self.conclude("update_row", outcome).await
    }

    pub async fn remove_row(&mut self, id: RowId) -> Result<InstanceRow, PortfolioError> {
        let outcome = self.try_remove_row(id).await;
        self.conclude("remove_row", outcome).await
    }

    /// Applies find-and-replace rules to the visible rows. Returns the
    /// number of rows that changed.
    pub async fn replace_all(&mut self, rules: &ReplaceRules) -> Result<usize, PortfolioError> {
        let outcome = self.try_replace_all(rules).await;
        self.conclude("replace_all", outcome).await
    }

    /// Empties the table: drops the draft and deselects the active
    /// portfolio. Saved snapshots are kept.
    pub async fn clear_table(&mut self) -> Result<(), PortfolioError> {
        let cleared = self.state.take_active().map(|p| p.name().clone());
        self.state.set_draft(Vec::new());

        let outcome = Ok(Committed::new(
            (),
            vec![SyncSignal::TableCleared { name: cleared }],
            "Table cleared",
        ));
        self.conclude("clear_table", outcome).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entry form
    // ─────────────────────────────────────────────────────────────────────────

    /// Switches the active provider. Committed rows are untouched; the
    /// form's region/size selection is discarded.
    pub async fn set_provider(&mut self, provider: CloudProvider) -> bool {
        let changed = self.state.switch_provider(provider);
        if changed {
            tracing::info!(provider = %provider, "provider switched");
            self.deliver(vec![SyncSignal::FormReset]).await;
        }
        changed
    }

    /// Picks a region in the entry form.
    pub fn select_region(&mut self, region: &str) -> Result<(), PortfolioError> {
        let provider = self.state.provider();
        if !self.catalog.is_valid_region(provider, region) {
            tracing::warn!("Rejected region {} for {}", region, provider);
            return Err(ValidationError::invalid_value(
                "region",
                region,
                format!("not offered by {}", provider),
            )
            .into());
        }
        self.state.selection_mut().select_region(region);
        Ok(())
    }

    pub fn select_size(&mut self, size: &str) {
        self.state.selection_mut().select_size(size);
    }

    /// Drops in-progress form input.
    pub async fn reset_form(&mut self) {
        self.state.selection_mut().clear();
        self.deliver(vec![SyncSignal::FormReset]).await;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Command bodies
    // ─────────────────────────────────────────────────────────────────────────

    async fn try_add_portfolio(
        &mut self,
        name: &str,
        provider: CloudProvider,
        raw_rows: &[RawInstanceRow],
    ) -> Result<Committed<PortfolioSummary>, PortfolioError> {
        // 1. Validate name, then rows
        let name = PortfolioName::new(name)?;
        self.ensure_unique(&name, None)?;

        let validator = self.validator(provider);
        let rows = raw_rows
            .iter()
            .map(|raw| validator.validate_new(raw))
            .collect::<Result<Vec<_>, _>>()?;

        // 2-4. Apply, persist, commit
        let (summary, portfolio) = self.create(name, provider, rows).await?;

        let signals = vec![SyncSignal::PortfolioSaved {
            name: summary.name.clone(),
            provider,
            row_count: portfolio.rows().len(),
        }];
        let message = format!("Portfolio '{}' saved", summary.name);
        Ok(Committed::new(summary, signals, message))
    }

    async fn try_save_draft(
        &mut self,
        name: &str,
    ) -> Result<Committed<PortfolioSummary>, PortfolioError> {
        let name = PortfolioName::new(name)?;
        self.ensure_unique(&name, None)?;

        let provider = self.state.provider();
        let rows = self.state.draft().to_vec();
        let (summary, portfolio) = self.create(name, provider, rows).await?;

        let row_count = portfolio.rows().len();
        self.state.set_draft(Vec::new());
        self.state.selection_mut().clear();
        self.state.set_active(Some(portfolio));

        let signals = vec![
            SyncSignal::PortfolioSaved {
                name: summary.name.clone(),
                provider,
                row_count,
            },
            SyncSignal::FormReset,
        ];
        let message = format!("Portfolio '{}' saved", summary.name);
        Ok(Committed::new(summary, signals, message))
    }

    /// Persists a brand-new portfolio and appends it to the index.
    async fn create(
        &mut self,
        name: PortfolioName,
        provider: CloudProvider,
        rows: Vec<InstanceRow>,
    ) -> Result<(PortfolioSummary, Portfolio), PortfolioError> {
        let mut portfolio = Portfolio::draft(name, provider, rows);
        portfolio.mark_saved()?;

        let summary = portfolio.summary(Timestamp::now());
        self.snapshots
            .put(summary.name.as_str(), portfolio.rows())
            .await
            .map_err(storage_error)?;

        let mut index = self.index.clone();
        index.push(summary.clone());
        if let Err(err) = self.snapshots.save_index(&index).await {
            // Without an index entry the snapshot is unreachable.
            if let Err(cleanup) = self.snapshots.delete(summary.name.as_str()).await {
                tracing::warn!("Orphaned snapshot for {}: {}", summary.name, cleanup);
            }
            return Err(storage_error(err));
        }
        self.index = index;

        tracing::info!(portfolio = %summary.name, rows = portfolio.rows().len(), "portfolio created");
        Ok((summary, portfolio))
    }

    async fn try_remove_portfolio(&mut self, name: &str) -> Result<Committed<bool>, PortfolioError> {
        let Some(position) = self.position_of(name) else {
            return Ok(Committed::new(
                false,
                Vec::new(),
                format!("No portfolio named '{}'; nothing removed", name.trim()),
            ));
        };
        let summary = self.index[position].clone();

        let mut doomed = Portfolio::reconstitute(&summary, Vec::new());
        doomed.mark_deleted()?;

        // The index is the commit point; a snapshot left behind is
        // unreachable and overwritten if the name is reused.
        let mut index = self.index.clone();
        index.remove(position);
        self.snapshots
            .save_index(&index)
            .await
            .map_err(storage_error)?;
        self.index = index;

        if let Err(err) = self.snapshots.delete(summary.name.as_str()).await {
            tracing::warn!("Failed to remove snapshot for {}: {}", summary.name, err);
        }

        let mut signals = vec![SyncSignal::PortfolioDeleted {
            name: summary.name.clone(),
        }];
        if self.state.is_active(summary.name.as_str()) {
            self.state.set_active(None);
            signals.push(SyncSignal::TableCleared {
                name: Some(summary.name.clone()),
            });
        }

        tracing::info!(portfolio = %summary.name, "portfolio deleted");
        let message = format!("Portfolio '{}' deleted", summary.name);
        Ok(Committed::new(true, signals, message))
    }

    async fn try_select_portfolio(
        &mut self,
        name: &str,
    ) -> Result<Committed<Vec<InstanceRow>>, PortfolioError> {
        let summary = self
            .position_of(name)
            .map(|i| self.index[i].clone())
            .ok_or_else(|| PortfolioError::not_found(name.trim()))?;

        let rows = self
            .snapshots
            .get(summary.name.as_str())
            .await
            .map_err(storage_error)?
            .unwrap_or_default();

        let mut signals = Vec::new();
        if self.state.switch_provider(summary.provider) {
            signals.push(SyncSignal::FormReset);
        }
        self.state
            .set_active(Some(Portfolio::reconstitute(&summary, rows.clone())));
        signals.push(SyncSignal::PortfolioSelected {
            name: summary.name.clone(),
            row_count: rows.len(),
        });

        let message = format!("Loaded portfolio '{}'", summary.name);
        Ok(Committed::new(rows, signals, message))
    }

    async fn try_rename_portfolio(
        &mut self,
        from: &str,
        to: &str,
    ) -> Result<Committed<PortfolioSummary>, PortfolioError> {
        // 1. Validate
        let position = self
            .position_of(from)
            .ok_or_else(|| PortfolioError::not_found(from.trim()))?;
        let old = self.index[position].name.clone();
        let new = PortfolioName::new(to)?;
        self.ensure_unique(&new, Some(position))?;

        if new == old {
            let message = format!("Portfolio '{}' unchanged", old);
            return Ok(Committed::new(self.index[position].clone(), Vec::new(), message));
        }

        // 2. Apply to copies
        let renamed_active = match self.state.active() {
            Some(active) if active.name() == &old => {
                let mut portfolio = active.clone();
                portfolio.rename(new.clone())?;
                Some(portfolio)
            }
            _ => None,
        };
        let mut index = self.index.clone();
        index[position].name = new.clone();

        // 3. Persist: new snapshot, index, then drop the old key
        let rows = self
            .snapshots
            .get(old.as_str())
            .await
            .map_err(storage_error)?
            .unwrap_or_default();
        self.snapshots
            .put(new.as_str(), &rows)
            .await
            .map_err(storage_error)?;
        if let Err(err) = self.snapshots.save_index(&index).await {
            if let Err(cleanup) = self.snapshots.delete(new.as_str()).await {
                tracing::warn!("Orphaned snapshot for {}: {}", new, cleanup);
            }
            return Err(storage_error(err));
        }
        if let Err(err) = self.snapshots.delete(old.as_str()).await {
            tracing::warn!("Failed to remove snapshot for {}: {}", old, err);
        }

        // 4. Commit
        let summary = index[position].clone();
        self.index = index;
        if let Some(portfolio) = renamed_active {
            self.state.set_active(Some(portfolio));
        }

        tracing::info!(from = %old, to = %new, "portfolio renamed");
        let message = format!("Renamed '{}' to '{}'", old, new);
        let signals = vec![SyncSignal::PortfolioNameChanged { from: old, to: new }];
        Ok(Committed::new(summary, signals, message))
    }

    async fn try_add_row(
        &mut self,
        raw: &RawInstanceRow,
    ) -> Result<Committed<InstanceRow>, PortfolioError> {
        let row = self.validator(self.row_provider()).validate_new(raw)?;

        let mut signals = match self.state.active() {
            Some(active) => {
                let mut portfolio = active.clone();
                portfolio.push_row(row.clone())?;
                self.persist(portfolio).await?
            }
            None => {
                let mut draft = self.state.draft().to_vec();
                draft.push(row.clone());
                self.state.set_draft(draft);
                Vec::new()
            }
        };
        self.state.selection_mut().clear();
        signals.push(SyncSignal::FormReset);

        let message = format!("Added {} x {}", row.quantity, row.size);
        Ok(Committed::new(row, signals, message))
    }

    async fn try_update_row(
        &mut self,
        id: RowId,
        edit: &RawInstanceRow,
    ) -> Result<Committed<InstanceRow>, PortfolioError> {
        let existing = self
            .state
            .visible_rows()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(PortfolioError::RowNotFound(id))?;
        let updated = self
            .validator(self.row_provider())
            .apply_edit(&existing, edit)?;

        let signals = match self.state.active() {
            Some(active) => {
                let mut portfolio = active.clone();
                portfolio.replace_row(updated.clone())?;
                self.persist(portfolio).await?
            }
            None => {
                let draft = self
                    .state
                    .draft()
                    .iter()
                    .map(|r| if r.id == id { updated.clone() } else { r.clone() })
                    .collect();
                self.state.set_draft(draft);
                Vec::new()
            }
        };

        let message = format!("Updated {}", updated.size);
        Ok(Committed::new(updated, signals, message))
    }

    async fn try_remove_row(&mut self, id: RowId) -> Result<Committed<InstanceRow>, PortfolioError> {
        let (removed, signals) = match self.state.active() {
            Some(active) => {
                let mut portfolio = active.clone();
                let removed = portfolio.remove_row(id)?;
                (removed, self.persist(portfolio).await?)
            }
            None => {
                let mut draft = self.state.draft().to_vec();
                let position = draft
                    .iter()
                    .position(|r| r.id == id)
                    .ok_or(PortfolioError::RowNotFound(id))?;
                let removed = draft.remove(position);
                self.state.set_draft(draft);
                (removed, Vec::new())
            }
        };

        let message = format!("Removed {}", removed.size);
        Ok(Committed::new(removed, signals, message))
    }

    async fn try_replace_all(
        &mut self,
        rules: &ReplaceRules,
    ) -> Result<Committed<usize>, PortfolioError> {
        // 1. Validate every rule before touching a row
        if let Some(rule) = rules.get(ReplaceField::Region).filter(|r| r.is_complete()) {
            let provider = self.row_provider();
            let target = rule.to.trim();
            if !self.catalog.is_valid_region(provider, target) {
                return Err(ValidationError::invalid_value(
                    "region",
                    target,
                    format!("not offered by {}", provider),
                )
                .into());
            }
        }

        // 2. Apply
        let outcome = replace_all(self.state.visible_rows(), rules)?;
        let changed = outcome.changed_count();
        if changed == 0 {
            return Ok(Committed::new(0, Vec::new(), "No rows matched"));
        }
        let rows = outcome.into_rows();

        // 3-4. Persist and commit
        let signals = match self.state.active() {
            Some(active) => {
                let mut portfolio = active.clone();
                portfolio.set_rows(rows)?;
                self.persist(portfolio).await?
            }
            None => {
                self.state.set_draft(rows);
                Vec::new()
            }
        };

        tracing::info!(changed, "find and replace applied");
        let message = format!("Replaced values in {} row(s)", changed);
        Ok(Committed::new(changed, signals, message))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Writes an edited copy of the active portfolio, then commits it.
    async fn persist(&mut self, mut portfolio: Portfolio) -> Result<Vec<SyncSignal>, PortfolioError> {
        portfolio.mark_saved()?;
        self.snapshots
            .put(portfolio.name().as_str(), portfolio.rows())
            .await
            .map_err(storage_error)?;

        let signal = SyncSignal::PortfolioSaved {
            name: portfolio.name().clone(),
            provider: portfolio.provider(),
            row_count: portfolio.rows().len(),
        };
        self.state.set_active(Some(portfolio));
        Ok(vec![signal])
    }

    /// Announces the outcome: signals then a notice on success, a notice
    /// alone on failure.
    async fn conclude<T>(
        &self,
        command: &'static str,
        outcome: Result<Committed<T>, PortfolioError>,
    ) -> Result<T, PortfolioError> {
        match outcome {
            Ok(Committed {
                value,
                mut signals,
                message,
            }) => {
                tracing::info!(command, "{}", message);
                signals.push(SyncSignal::Notice(Notice::success(
                    message,
                    self.notice_ttl_secs,
                )));
                self.deliver(signals).await;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(command, code = %err.code(), "{}", err);
                let notice = Notice::error(err.code(), err.to_string(), self.notice_ttl_secs);
                self.deliver(vec![SyncSignal::Notice(notice)]).await;
                Err(err)
            }
        }
    }

    /// Publishes signals. The state change is already committed, so a
    /// failing subscriber is logged rather than reported to the caller.
    async fn deliver(&self, signals: Vec<SyncSignal>) {
        if let Err(e) = self.publisher.publish_all(signals).await {
            tracing::warn!("Signal delivery failed: {}", e);
        }
    }

    fn validator(&self, provider: CloudProvider) -> RowValidator {
        RowValidator::new(provider, self.catalog.regions(provider))
            .with_hours_per_month(self.projector.constants().hours_per_month)
    }

    /// Provider that prices row edits: the active portfolio's, else the
    /// current selection.
    fn row_provider(&self) -> CloudProvider {
        self.state
            .active()
            .map_or(self.state.provider(), Portfolio::provider)
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        let key = name.trim().to_lowercase();
        self.index.iter().position(|s| s.name.key() == key)
    }

    fn ensure_unique(
        &self,
        name: &PortfolioName,
        except: Option<usize>,
    ) -> Result<(), PortfolioError> {
        let clash = self
            .index
            .iter()
            .enumerate()
            .any(|(i, s)| Some(i) != except && s.name.collides_with(name));
        if clash {
            return Err(PortfolioError::duplicate_name(name.as_str()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySnapshotStore, InMemorySyncBus, StaticCatalog};
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::domain::instance::PricingModel;
    use crate::domain::mutation::ReplaceRule;
    use crate::domain::portfolio::PortfolioStatus;
    use crate::domain::sync::{NoticeLevel, SignalKind};
    use crate::ports::{SignalHandler, SignalSubscriber};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Snapshot store whose writes can be switched to fail.
    struct FlakySnapshotStore {
        inner: InMemorySnapshotStore,
        fail_put: Mutex<bool>,
        fail_index: Mutex<bool>,
    }

    impl FlakySnapshotStore {
        fn new() -> Self {
            Self {
                inner: InMemorySnapshotStore::new(),
                fail_put: Mutex::new(false),
                fail_index: Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl SnapshotStore for FlakySnapshotStore {
        async fn get(&self, name: &str) -> Result<Option<Vec<InstanceRow>>, SnapshotStoreError> {
            self.inner.get(name).await
        }

        async fn put(&self, name: &str, rows: &[InstanceRow]) -> Result<(), SnapshotStoreError> {
            if *self.fail_put.lock().unwrap() {
                return Err(SnapshotStoreError::IoError("disk full".to_string()));
            }
            self.inner.put(name, rows).await
        }

        async fn delete(&self, name: &str) -> Result<(), SnapshotStoreError> {
            self.inner.delete(name).await
        }

        async fn load_index(&self) -> Result<Vec<PortfolioSummary>, SnapshotStoreError> {
            self.inner.load_index().await
        }

        async fn save_index(&self, index: &[PortfolioSummary]) -> Result<(), SnapshotStoreError> {
            if *self.fail_index.lock().unwrap() {
                return Err(SnapshotStoreError::IoError("disk full".to_string()));
            }
            self.inner.save_index(index).await
        }
    }

    struct Fixture {
        store: PortfolioStore,
        snapshots: Arc<FlakySnapshotStore>,
        bus: Arc<InMemorySyncBus>,
    }

    async fn fixture() -> Fixture {
        let snapshots = Arc::new(FlakySnapshotStore::new());
        let bus = Arc::new(InMemorySyncBus::new());
        let store = PortfolioStore::open(
            snapshots.clone(),
            bus.clone(),
            Arc::new(StaticCatalog::default()),
            StoreSettings::default(),
        )
        .await
        .unwrap();
        Fixture {
            store,
            snapshots,
            bus,
        }
    }

    fn raw(size: &str) -> RawInstanceRow {
        RawInstanceRow::new()
            .with_region("us-east-1")
            .with_size(size)
            .with_quantity("2")
            .with_hours("1000")
            .with_pricing_model("ondemand")
    }

    fn last_notice(bus: &InMemorySyncBus) -> Notice {
        match bus.signals_of_kind(SignalKind::Notice).pop() {
            Some(SyncSignal::Notice(notice)) => notice,
            other => panic!("expected a notice, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn add_portfolio_persists_and_announces() {
        let mut f = fixture().await;

        let summary = f
            .store
            .add_portfolio("Prod", CloudProvider::Aws, &[raw("c5a.24xlarge")])
            .await
            .unwrap();

        assert_eq!(summary.name.as_str(), "Prod");
        assert_eq!(f.store.list_portfolios().len(), 1);
        assert_eq!(f.snapshots.get("Prod").await.unwrap().unwrap().len(), 1);
        assert_eq!(f.snapshots.load_index().await.unwrap().len(), 1);
        assert_eq!(
            f.bus.published_kinds(),
            vec![SignalKind::PortfolioSaved, SignalKind::Notice]
        );
        assert_eq!(last_notice(&f.bus).level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_case_insensitively() {
        let mut f = fixture().await;
        f.store
            .add_portfolio("prod", CloudProvider::Aws, &[raw("m5.large")])
            .await
            .unwrap();

        let err = f
            .store
            .add_portfolio("Prod", CloudProvider::Gcp, &[raw("m5.large")])
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::DuplicateName);
        assert_eq!(f.store.list_portfolios().len(), 1);
        let notice = last_notice(&f.bus);
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.code.as_deref(), Some("DUPLICATE_NAME"));
    }

    #[tokio::test]
    async fn add_portfolio_requires_name_and_rows() {
        let mut f = fixture().await;

        let err = f
            .store
            .add_portfolio("   ", CloudProvider::Aws, &[raw("m5.large")])
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let err = f
            .store
            .add_portfolio("Prod", CloudProvider::Aws, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::Validation(_)));
        assert!(f.store.list_portfolios().is_empty());
    }

    #[tokio::test]
    async fn incomplete_row_blocks_the_whole_portfolio() {
        let mut f = fixture().await;
        let mut missing_hours = raw("m5.large");
        missing_hours.hours = None;

        let err = f
            .store
            .add_portfolio("Prod", CloudProvider::Aws, &[raw("m5.large"), missing_hours])
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::MissingField);
        assert!(f.snapshots.get("Prod").await.unwrap().is_none());
        assert!(f.store.list_portfolios().is_empty());
    }

    #[tokio::test]
    async fn failed_snapshot_write_leaves_store_unchanged() {
        let mut f = fixture().await;
        *f.snapshots.fail_put.lock().unwrap() = true;

        let err = f
            .store
            .add_portfolio("Prod", CloudProvider::Aws, &[raw("m5.large")])
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::StorageError);
        assert!(f.store.list_portfolios().is_empty());
    }

    #[tokio::test]
    async fn failed_index_write_rolls_back_snapshot() {
        let mut f = fixture().await;
        *f.snapshots.fail_index.lock().unwrap() = true;

        assert!(f
            .store
            .add_portfolio("Prod", CloudProvider::Aws, &[raw("m5.large")])
            .await
            .is_err());

        assert!(f.snapshots.get("Prod").await.unwrap().is_none());
        assert!(f.store.list_portfolios().is_empty());
    }

    #[tokio::test]
    async fn save_draft_publishes_saved_then_form_reset() {
        let mut f = fixture().await;
        f.store.add_row(&raw("m5.large")).await.unwrap();
        f.store.add_row(&raw("m5.2xlarge")).await.unwrap();
        assert_eq!(f.store.state().draft().len(), 2);
        f.bus.clear();

        f.store.save_draft("Staging").await.unwrap();

        assert_eq!(
            f.bus.published_kinds(),
            vec![
                SignalKind::PortfolioSaved,
                SignalKind::FormReset,
                SignalKind::Notice
            ]
        );
        assert!(f.store.state().draft().is_empty());
        let active = f.store.state().active().unwrap();
        assert_eq!(active.name().as_str(), "Staging");
        assert_eq!(active.status(), PortfolioStatus::Saved);
        assert_eq!(active.rows().len(), 2);
    }

    /// Sidebar that rejects every signal it receives.
    struct BrokenSidebar;

    #[async_trait]
    impl SignalHandler for BrokenSidebar {
        async fn handle(&self, _signal: &SyncSignal) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "sidebar unavailable"))
        }

        fn name(&self) -> &'static str {
            "BrokenSidebar"
        }
    }

    /// Records the kinds it receives.
    #[derive(Default)]
    struct KindRecorder(Mutex<Vec<SignalKind>>);

    #[async_trait]
    impl SignalHandler for KindRecorder {
        async fn handle(&self, signal: &SyncSignal) -> Result<(), DomainError> {
            self.0.lock().unwrap().push(signal.kind());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "KindRecorder"
        }
    }

    #[tokio::test]
    async fn failing_subscriber_does_not_suppress_later_signals() {
        let mut f = fixture().await;
        f.store.add_row(&raw("m5.large")).await.unwrap();
        let recorder = Arc::new(KindRecorder::default());
        f.bus.subscribe(&[SignalKind::PortfolioSaved], Arc::new(BrokenSidebar));
        f.bus.subscribe_all(recorder.clone());

        let summary = f.store.save_draft("Prod").await.unwrap();

        assert_eq!(summary.name.as_str(), "Prod");
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                SignalKind::PortfolioSaved,
                SignalKind::FormReset,
                SignalKind::Notice
            ]
        );
        assert_eq!(last_notice(&f.bus).level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn failing_subscriber_does_not_suppress_delete_notice() {
        let mut f = fixture().await;
        f.store
            .add_portfolio("Prod", CloudProvider::Aws, &[raw("m5.large")])
            .await
            .unwrap();
        f.store.select_portfolio("Prod").await.unwrap();
        let recorder = Arc::new(KindRecorder::default());
        f.bus.subscribe(&[SignalKind::PortfolioDeleted], Arc::new(BrokenSidebar));
        f.bus.subscribe_all(recorder.clone());

        assert!(f.store.remove_portfolio("Prod").await.unwrap());

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                SignalKind::PortfolioDeleted,
                SignalKind::TableCleared,
                SignalKind::Notice
            ]
        );
        assert!(f.store.list_portfolios().is_empty());
    }

    #[tokio::test]
    async fn save_empty_draft_is_rejected() {
        let mut f = fixture().await;
        let err = f.store.save_draft("Empty").await.unwrap_err();
        assert!(matches!(err, PortfolioError::Validation(_)));
    }

    #[tokio::test]
    async fn remove_clears_snapshot_and_active_selection() {
        let mut f = fixture().await;
        f.store
            .add_portfolio("Prod", CloudProvider::Aws, &[raw("m5.large")])
            .await
            .unwrap();
        f.store.select_portfolio("Prod").await.unwrap();
        f.bus.clear();

        assert!(f.store.remove_portfolio("PROD").await.unwrap());

        assert!(f.store.state().active().is_none());
        assert!(f.store.list_portfolios().is_empty());
        assert!(f.snapshots.get("Prod").await.unwrap().is_none());
        assert_eq!(
            f.bus.published_kinds(),
            vec![
                SignalKind::PortfolioDeleted,
                SignalKind::TableCleared,
                SignalKind::Notice
            ]
        );
    }

    #[tokio::test]
    async fn remove_absent_is_a_noop() {
        let mut f = fixture().await;
        assert!(!f.store.remove_portfolio("Ghost").await.unwrap());
        assert_eq!(f.bus.published_kinds(), vec![SignalKind::Notice]);
    }

    #[tokio::test]
    async fn select_missing_snapshot_yields_no_rows() {
        let mut f = fixture().await;
        f.store
            .add_portfolio("Prod", CloudProvider::Gcp, &[raw("n2-standard-4").with_region("us-central1")])
            .await
            .unwrap();
        f.snapshots.delete("Prod").await.unwrap();

        let rows = f.store.select_portfolio("prod").await.unwrap();

        assert!(rows.is_empty());
        assert_eq!(f.store.state().provider(), CloudProvider::Gcp);
    }

    #[tokio::test]
    async fn select_unknown_name_is_not_found() {
        let mut f = fixture().await;
        let err = f.store.select_portfolio("Ghost").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PortfolioNotFound);
    }

    #[tokio::test]
    async fn rename_moves_snapshot() {
        let mut f = fixture().await;
        f.store
            .add_portfolio("Prod", CloudProvider::Aws, &[raw("m5.large")])
            .await
            .unwrap();
        f.store.select_portfolio("Prod").await.unwrap();

        f.store.rename_portfolio("Prod", "Production").await.unwrap();

        assert!(f.snapshots.get("Prod").await.unwrap().is_none());
        assert_eq!(f.snapshots.get("Production").await.unwrap().unwrap().len(), 1);
        assert_eq!(f.store.list_portfolios()[0].name.as_str(), "Production");
        assert_eq!(
            f.store.state().active().unwrap().name().as_str(),
            "Production"
        );
        assert_eq!(f.bus.signals_of_kind(SignalKind::PortfolioNameChanged).len(), 1);
    }

    #[tokio::test]
    async fn rename_to_other_portfolio_name_is_rejected() {
        let mut f = fixture().await;
        f.store
            .add_portfolio("Prod", CloudProvider::Aws, &[raw("m5.large")])
            .await
            .unwrap();
        f.store
            .add_portfolio("Staging", CloudProvider::Aws, &[raw("m5.large")])
            .await
            .unwrap();

        let err = f.store.rename_portfolio("Staging", "PROD").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateName);

        f.store.rename_portfolio("Prod", "PROD").await.unwrap();
        assert_eq!(f.store.list_portfolios()[0].name.as_str(), "PROD");
    }

    #[tokio::test]
    async fn row_edits_on_active_portfolio_persist_immediately() {
        let mut f = fixture().await;
        f.store
            .add_portfolio("Prod", CloudProvider::Aws, &[raw("m5.large")])
            .await
            .unwrap();
        f.store.select_portfolio("Prod").await.unwrap();

        let added = f.store.add_row(&raw("c5a.24xlarge")).await.unwrap();
        let edited = f
            .store
            .update_row(added.id, &RawInstanceRow::new().with_quantity("5"))
            .await
            .unwrap();

        assert_eq!(edited.quantity, 5);
        assert_eq!(edited.hours, 1000);
        let stored = f.snapshots.get("Prod").await.unwrap().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].quantity, 5);

        f.store.remove_row(added.id).await.unwrap();
        assert_eq!(f.snapshots.get("Prod").await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_row_is_reported() {
        let mut f = fixture().await;
        let err = f.store.remove_row(RowId::new()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::RowNotFound);
    }

    #[tokio::test]
    async fn add_row_outside_provider_regions_is_rejected() {
        let mut f = fixture().await;
        let err = f
            .store
            .add_row(&raw("m5.large").with_region("westeurope"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert!(f.store.rows().is_empty());
    }

    #[tokio::test]
    async fn replace_all_rewrites_visible_rows() {
        let mut f = fixture().await;
        f.store.add_row(&raw("m5.large")).await.unwrap();
        f.store.add_row(&raw("c5a.24xlarge")).await.unwrap();

        let rules = ReplaceRules::new()
            .with(ReplaceField::Size, ReplaceRule::new("m5.large", "m5.2xlarge"))
            .with(ReplaceField::PricingModel, ReplaceRule::new("on-demand", "spot"));
        let changed = f.store.replace_all(&rules).await.unwrap();

        assert_eq!(changed, 2);
        assert_eq!(f.store.rows()[0].size, "m5.2xlarge");
        assert_eq!(f.store.rows()[1].size, "c5a.24xlarge");
        assert!(f.store.rows().iter().all(|r| r.pricing_model == PricingModel::Spot));
    }

    #[tokio::test]
    async fn replace_without_complete_rule_changes_nothing() {
        let mut f = fixture().await;
        f.store.add_row(&raw("m5.large")).await.unwrap();
        let before = f.store.rows().to_vec();

        let rules = ReplaceRules::new().with(ReplaceField::Size, ReplaceRule::new("m5.large", ""));
        let err = f.store.replace_all(&rules).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::RuleConflict);
        assert_eq!(f.store.rows(), before.as_slice());
    }

    #[tokio::test]
    async fn replace_region_must_target_provider_region() {
        let mut f = fixture().await;
        f.store.add_row(&raw("m5.large")).await.unwrap();

        let rules = ReplaceRules::new()
            .with(ReplaceField::Region, ReplaceRule::new("us-east-1", "westeurope"));
        let err = f.store.replace_all(&rules).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(f.store.rows()[0].region, "us-east-1");
    }

    #[tokio::test]
    async fn clear_table_deselects_but_keeps_snapshot() {
        let mut f = fixture().await;
        f.store
            .add_portfolio("Prod", CloudProvider::Aws, &[raw("m5.large")])
            .await
            .unwrap();
        f.store.select_portfolio("Prod").await.unwrap();

        f.store.clear_table().await.unwrap();

        assert!(f.store.rows().is_empty());
        assert!(f.snapshots.get("Prod").await.unwrap().is_some());
        assert!(matches!(
            f.bus.signals_of_kind(SignalKind::TableCleared).pop(),
            Some(SyncSignal::TableCleared { name: Some(_) })
        ));
    }

    #[tokio::test]
    async fn provider_switch_clears_selection_only() {
        let mut f = fixture().await;
        f.store.add_row(&raw("m5.large")).await.unwrap();
        f.store.select_region("us-west-2").unwrap();
        f.store.select_size("m5.large");

        assert!(f.store.set_provider(CloudProvider::Azure).await);

        assert_eq!(f.store.state().selection().region(), None);
        assert_eq!(f.store.rows().len(), 1);
        assert!(f.store.select_region("us-west-2").is_err());
        assert!(f.store.select_region("westeurope").is_ok());
        assert!(!f.store.set_provider(CloudProvider::Azure).await);
    }

    #[tokio::test]
    async fn cost_report_covers_visible_rows() {
        let mut f = fixture().await;
        f.store.add_row(&raw("c5a.24xlarge")).await.unwrap();

        let report = f.store.cost_report();

        assert_eq!(report.totals().rows, 1);
        assert_eq!(
            report.totals().current.annual_cost,
            crate::domain::foundation::Money::from_cents(2_880_000)
        );
    }
}
