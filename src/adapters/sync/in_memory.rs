//! In-memory sync bus.
//!
//! Delivers signals inline: `publish` returns only after every matching
//! subscriber has handled the signal, in the order they subscribed.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::sync::{SignalKind, SyncSignal};
use crate::ports::{SignalHandler, SignalPublisher, SignalSubscriber, SubscriptionId};

struct Subscription {
    id: SubscriptionId,
    kinds: Vec<SignalKind>,
    handler: Arc<dyn SignalHandler>,
}

/// Process-wide publish/subscribe channel for views.
///
/// Features:
/// - Ordered, synchronous-to-caller delivery
/// - Subscribers removed mid-delivery are skipped
/// - Signal capture for assertions
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemorySyncBus::new());
/// let id = bus.subscribe(&[SignalKind::PortfolioSaved], sidebar);
///
/// bus.publish(SyncSignal::FormReset).await?;
///
/// bus.unsubscribe(id);
/// ```
pub struct InMemorySyncBus {
    subscriptions: RwLock<Vec<Subscription>>,
    published: RwLock<Vec<SyncSignal>>,
    next_id: AtomicU64,
}

impl InMemorySyncBus {
    /// Creates a new bus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            published: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // === Test Helpers ===

    /// Returns all published signals.
    pub fn published_signals(&self) -> Vec<SyncSignal> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns published signals of one kind.
    pub fn signals_of_kind(&self, kind: SignalKind) -> Vec<SyncSignal> {
        self.published_signals()
            .into_iter()
            .filter(|s| s.kind() == kind)
            .collect()
    }

    /// Returns the kinds of all published signals, in publish order.
    pub fn published_kinds(&self) -> Vec<SignalKind> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(SyncSignal::kind)
            .collect()
    }

    /// Clears captured signals (for test isolation).
    pub fn clear(&self) {
        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|s| s.id == id)
    }
}

impl Default for InMemorySyncBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalPublisher for InMemorySyncBus {
    async fn publish(&self, signal: SyncSignal) -> Result<(), DomainError> {
        let kind = signal.kind();

        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(signal.clone());

        // Clone handlers to release lock before await points
        let targets: Vec<(SubscriptionId, Arc<dyn SignalHandler>)> = {
            let subscriptions = self.subscriptions.read().unwrap_or_else(|e| e.into_inner());
            subscriptions
                .iter()
                .filter(|s| s.kinds.contains(&kind))
                .map(|s| (s.id, Arc::clone(&s.handler)))
                .collect()
        };

        let mut errors = Vec::new();
        for (id, handler) in targets {
            // An earlier handler may have unsubscribed this one.
            if !self.is_subscribed(id) {
                tracing::debug!(signal = %kind, subscription = %id, "skipping removed subscriber");
                continue;
            }
            tracing::debug!(signal = %kind, handler = handler.name(), "delivering signal");
            if let Err(e) = handler.handle(&signal).await {
                errors.push(format!("{}: {}", handler.name(), e));
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Handler errors: {}", errors.join(", ")),
            ));
        }

        Ok(())
    }
}

impl SignalSubscriber for InMemorySyncBus {
    fn subscribe(&self, kinds: &[SignalKind], handler: Arc<dyn SignalHandler>) -> SubscriptionId {
        let id = SubscriptionId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(subscription = %id, handler = handler.name(), "subscribed");
        self.subscriptions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Subscription {
                id,
                kinds: kinds.to_vec(),
                handler,
            });
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write().unwrap_or_else(|e| e.into_inner());
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::PortfolioName;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl SignalHandler for Recorder {
        async fn handle(&self, _signal: &SyncSignal) -> Result<(), DomainError> {
            self.log.lock().unwrap().push(self.label);
            Ok(())
        }

        fn name(&self) -> &'static str {
            self.label
        }
    }

    /// Unsubscribes another subscription when it receives a signal.
    struct Unmounter {
        bus: Arc<InMemorySyncBus>,
        target: Mutex<Option<SubscriptionId>>,
    }

    #[async_trait]
    impl SignalHandler for Unmounter {
        async fn handle(&self, _signal: &SyncSignal) -> Result<(), DomainError> {
            if let Some(id) = *self.target.lock().unwrap() {
                self.bus.unsubscribe(id);
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "Unmounter"
        }
    }

    struct Failing;

    #[async_trait]
    impl SignalHandler for Failing {
        async fn handle(&self, _signal: &SyncSignal) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "view crashed"))
        }

        fn name(&self) -> &'static str {
            "Failing"
        }
    }

    struct Counter(AtomicUsize);

    #[async_trait]
    impl SignalHandler for Counter {
        async fn handle(&self, _signal: &SyncSignal) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "Counter"
        }
    }

    fn saved() -> SyncSignal {
        SyncSignal::PortfolioSaved {
            name: PortfolioName::new("Prod").unwrap(),
            provider: crate::domain::instance::CloudProvider::Aws,
            row_count: 1,
        }
    }

    #[tokio::test]
    async fn delivers_in_subscription_order() {
        let bus = InMemorySyncBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for label in ["sidebar", "table", "form"] {
            bus.subscribe_all(Arc::new(Recorder {
                label,
                log: log.clone(),
            }));
        }

        bus.publish(SyncSignal::FormReset).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["sidebar", "table", "form"]);
    }

    #[tokio::test]
    async fn only_matching_kinds_are_delivered() {
        let bus = InMemorySyncBus::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        bus.subscribe(&[SignalKind::PortfolioSaved], counter.clone());

        bus.publish(SyncSignal::FormReset).await.unwrap();
        bus.publish(saved()).await.unwrap();

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(
            bus.published_kinds(),
            vec![SignalKind::FormReset, SignalKind::PortfolioSaved]
        );
    }

    #[tokio::test]
    async fn unsubscribed_handler_receives_nothing() {
        let bus = InMemorySyncBus::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let id = bus.subscribe_all(counter.clone());

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(saved()).await.unwrap();

        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn subscriber_removed_mid_delivery_is_skipped() {
        let bus = Arc::new(InMemorySyncBus::new());
        let unmounter = Arc::new(Unmounter {
            bus: bus.clone(),
            target: Mutex::new(None),
        });
        let counter = Arc::new(Counter(AtomicUsize::new(0)));

        bus.subscribe_all(unmounter.clone());
        let victim = bus.subscribe_all(counter.clone());
        *unmounter.target.lock().unwrap() = Some(victim);

        bus.publish(saved()).await.unwrap();

        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_errors_are_reported_after_full_delivery() {
        let bus = InMemorySyncBus::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        bus.subscribe_all(Arc::new(Failing));
        bus.subscribe_all(counter.clone());

        let err = bus.publish(saved()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InternalError);
        assert!(err.message.contains("Failing"));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn publish_all_delivers_the_rest_of_the_batch_after_a_failure() {
        let bus = InMemorySyncBus::new();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        bus.subscribe(&[SignalKind::PortfolioSaved], Arc::new(Failing));
        bus.subscribe_all(counter.clone());

        let err = bus
            .publish_all(vec![saved(), SyncSignal::FormReset, saved()])
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message.matches("portfolio.saved").count(), 2);
        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
        assert_eq!(
            bus.published_kinds(),
            vec![
                SignalKind::PortfolioSaved,
                SignalKind::FormReset,
                SignalKind::PortfolioSaved
            ]
        );
    }

    #[tokio::test]
    async fn clear_drops_captured_signals() {
        let bus = InMemorySyncBus::new();
        bus.publish(SyncSignal::FormReset).await.unwrap();
        assert_eq!(bus.signals_of_kind(SignalKind::FormReset).len(), 1);

        bus.clear();

        assert!(bus.published_signals().is_empty());
    }
}
