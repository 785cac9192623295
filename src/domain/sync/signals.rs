//! Typed signals carried by the sync bus.
//!
//! Views never reference each other; they publish and subscribe to these
//! signals instead:
//! - `PortfolioSaved` - a portfolio was created or its rows committed
//! - `PortfolioNameChanged` - a portfolio was renamed
//! - `PortfolioSelected` - the active portfolio changed
//! - `PortfolioDeleted` - a portfolio and its snapshot were removed
//! - `TableCleared` - the visible row table was emptied
//! - `FormReset` - the entry form should drop its in-progress input
//! - `Notice` - a transient status message for the notification bar

use serde::{Deserialize, Serialize};
use std::fmt;

use super::notice::Notice;
use crate::domain::instance::CloudProvider;
use crate::domain::portfolio::PortfolioName;

/// Discriminant used for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    PortfolioSaved,
    PortfolioNameChanged,
    PortfolioSelected,
    PortfolioDeleted,
    TableCleared,
    FormReset,
    Notice,
}

impl SignalKind {
    pub const ALL: [SignalKind; 7] = [
        SignalKind::PortfolioSaved,
        SignalKind::PortfolioNameChanged,
        SignalKind::PortfolioSelected,
        SignalKind::PortfolioDeleted,
        SignalKind::TableCleared,
        SignalKind::FormReset,
        SignalKind::Notice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::PortfolioSaved => "portfolio.saved",
            SignalKind::PortfolioNameChanged => "portfolio.name_changed",
            SignalKind::PortfolioSelected => "portfolio.selected",
            SignalKind::PortfolioDeleted => "portfolio.deleted",
            SignalKind::TableCleared => "table.cleared",
            SignalKind::FormReset => "form.reset",
            SignalKind::Notice => "notice",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signal and its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncSignal {
    PortfolioSaved {
        name: PortfolioName,
        provider: CloudProvider,
        row_count: usize,
    },
    PortfolioNameChanged {
        from: PortfolioName,
        to: PortfolioName,
    },
    PortfolioSelected {
        name: PortfolioName,
        row_count: usize,
    },
    PortfolioDeleted {
        name: PortfolioName,
    },
    TableCleared {
        name: Option<PortfolioName>,
    },
    FormReset,
    Notice(Notice),
}

impl SyncSignal {
    pub fn kind(&self) -> SignalKind {
        match self {
            SyncSignal::PortfolioSaved { .. } => SignalKind::PortfolioSaved,
            SyncSignal::PortfolioNameChanged { .. } => SignalKind::PortfolioNameChanged,
            SyncSignal::PortfolioSelected { .. } => SignalKind::PortfolioSelected,
            SyncSignal::PortfolioDeleted { .. } => SignalKind::PortfolioDeleted,
            SyncSignal::TableCleared { .. } => SignalKind::TableCleared,
            SyncSignal::FormReset => SignalKind::FormReset,
            SyncSignal::Notice(_) => SignalKind::Notice,
        }
    }
}
