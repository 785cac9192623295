//! Portfolio lifecycle status.

use serde::{Deserialize, Serialize};

/// Lifecycle of a portfolio.
///
/// `Draft → Saved`, `Saved → Saved` for every committed edit, and
/// `Saved → Deleted`. `Deleted` is terminal. There is no separate dirty
/// state: each committed edit persists immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortfolioStatus {
    #[default]
    Draft,
    Saved,
    Deleted,
}

impl PortfolioStatus {
    /// Returns true if transition from self to target is valid.
    pub fn can_transition_to(&self, target: &Self) -> bool {
        use PortfolioStatus::*;
        matches!(
            (self, target),
            (Draft, Saved) | (Saved, Saved) | (Saved, Deleted)
        )
    }

    /// Returns all valid target states from current state.
    pub fn valid_transitions(&self) -> Vec<Self> {
        use PortfolioStatus::*;
        match self {
            Draft => vec![Saved],
            Saved => vec![Saved, Deleted],
            Deleted => vec![],
        }
    }

    /// Checks if current state is terminal.
    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
