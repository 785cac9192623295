//! Portfolio aggregate.
//!
//! A portfolio is a named, ordered set of instance rows priced against one
//! provider. Row order matters for display only.

use serde::{Deserialize, Serialize};

use super::errors::PortfolioError;
use super::name::PortfolioName;
use super::status::PortfolioStatus;
use crate::domain::foundation::{RowId, Timestamp, ValidationError};
use crate::domain::instance::{CloudProvider, InstanceRow};

/// Sidebar entry for a saved portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub name: PortfolioName,
    pub provider: CloudProvider,
    pub saved_at: Timestamp,
}

/// Portfolio aggregate.
///
/// # Invariants
///
/// - A saved portfolio was saved with at least one row
/// - Deleted portfolios cannot be modified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portfolio {
    name: PortfolioName,
    provider: CloudProvider,
    rows: Vec<InstanceRow>,
    status: PortfolioStatus,
}

impl Portfolio {
    /// Creates an unsaved portfolio.
    pub fn draft(name: PortfolioName, provider: CloudProvider, rows: Vec<InstanceRow>) -> Self {
        Self {
            name,
            provider,
            rows,
            status: PortfolioStatus::Draft,
        }
    }

    /// Reconstitutes a saved portfolio from its summary and snapshot.
    pub fn reconstitute(summary: &PortfolioSummary, rows: Vec<InstanceRow>) -> Self {
        Self {
            name: summary.name.clone(),
            provider: summary.provider,
            rows,
            status: PortfolioStatus::Saved,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn name(&self) -> &PortfolioName {
        &self.name
    }

    pub fn provider(&self) -> CloudProvider {
        self.provider
    }

    pub fn rows(&self) -> &[InstanceRow] {
        &self.rows
    }

    pub fn status(&self) -> PortfolioStatus {
        self.status
    }

    pub fn summary(&self, saved_at: Timestamp) -> PortfolioSummary {
        PortfolioSummary {
            name: self.name.clone(),
            provider: self.provider,
            saved_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Marks the portfolio saved.
    ///
    /// # Errors
    ///
    /// - `Validation` if the portfolio has no rows on first save
    /// - `InvalidState` if the portfolio was deleted
    pub fn mark_saved(&mut self) -> Result<(), PortfolioError> {
        if self.status == PortfolioStatus::Draft && self.rows.is_empty() {
            return Err(ValidationError::empty_field("rows").into());
        }
        self.transition(PortfolioStatus::Saved)
    }

    pub fn mark_deleted(&mut self) -> Result<(), PortfolioError> {
        self.transition(PortfolioStatus::Deleted)
    }

    pub fn rename(&mut self, name: PortfolioName) -> Result<PortfolioName, PortfolioError> {
        self.ensure_mutable()?;
        Ok(std::mem::replace(&mut self.name, name))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Row edits
    // ─────────────────────────────────────────────────────────────────────────

    pub fn push_row(&mut self, row: InstanceRow) -> Result<(), PortfolioError> {
        self.ensure_mutable()?;
        self.rows.push(row);
        Ok(())
    }

    /// Replaces the row with the same id, keeping its position.
    pub fn replace_row(&mut self, row: InstanceRow) -> Result<InstanceRow, PortfolioError> {
        self.ensure_mutable()?;
        let slot = self
            .rows
            .iter_mut()
            .find(|r| r.id == row.id)
            .ok_or(PortfolioError::RowNotFound(row.id))?;
        Ok(std::mem::replace(slot, row))
    }

    pub fn remove_row(&mut self, id: RowId) -> Result<InstanceRow, PortfolioError> {
        self.ensure_mutable()?;
        let index = self
            .rows
            .iter()
            .position(|r| r.id == id)
            .ok_or(PortfolioError::RowNotFound(id))?;
        Ok(self.rows.remove(index))
    }

    pub fn set_rows(&mut self, rows: Vec<InstanceRow>) -> Result<(), PortfolioError> {
        self.ensure_mutable()?;
        self.rows = rows;
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), PortfolioError> {
        if self.status.is_terminal() {
            return Err(PortfolioError::InvalidState {
                from: self.status,
                to: PortfolioStatus::Saved,
            });
        }
        Ok(())
    }

    fn transition(&mut self, target: PortfolioStatus) -> Result<(), PortfolioError> {
        if !self.status.can_transition_to(&target) {
            return Err(PortfolioError::InvalidState {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}
