//! SignalPublisher port - Interface for publishing sync signals.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::sync::SyncSignal;

/// Port for publishing signals to every interested view.
///
/// Implementations must ensure:
/// - Delivery completes before `publish` returns
/// - Subscribers are invoked in subscription order
/// - A subscriber removed before delivery reaches it is skipped
#[async_trait]
pub trait SignalPublisher: Send + Sync {
    /// Publish a single signal.
    async fn publish(&self, signal: SyncSignal) -> Result<(), DomainError>;

    /// Publish several signals in order.
    ///
    /// Every signal is published even if an earlier one fails; failures
    /// are returned together once the batch is done.
    async fn publish_all(&self, signals: Vec<SyncSignal>) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        for signal in signals {
            let kind = signal.kind();
            if let Err(e) = self.publish(signal).await {
                errors.push(format!("{}: {}", kind.as_str(), e));
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Signal delivery errors: {}", errors.join("; ")),
            ));
        }
        Ok(())
    }
}
