//! SignalSubscriber port - Interface for subscribing to sync signals.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::sync::{SignalKind, SyncSignal};

/// A view-side handler for sync signals.
///
/// Handlers should be quick; they run inline with the publisher.
///
/// # Example
///
/// ```ignore
/// struct SidebarList { /* ... */ }
///
/// #[async_trait]
/// impl SignalHandler for SidebarList {
///     async fn handle(&self, signal: &SyncSignal) -> Result<(), DomainError> {
///         if let SyncSignal::PortfolioSaved { name, .. } = signal {
///             // add entry...
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "SidebarList"
///     }
/// }
/// ```
#[async_trait]
pub trait SignalHandler: Send + Sync {
    /// Process a signal.
    async fn handle(&self, signal: &SyncSignal) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Handle returned by `subscribe`; pass it to `unsubscribe` when the view
/// goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Port for subscribing to sync signals.
pub trait SignalSubscriber: Send + Sync {
    /// Subscribe a handler to the given signal kinds.
    fn subscribe(&self, kinds: &[SignalKind], handler: Arc<dyn SignalHandler>) -> SubscriptionId;

    /// Subscribe a handler to every signal kind.
    fn subscribe_all(&self, handler: Arc<dyn SignalHandler>) -> SubscriptionId {
        self.subscribe(&SignalKind::ALL, handler)
    }

    /// Remove a subscription. Returns false if it was already gone.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
