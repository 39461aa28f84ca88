use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::core::models::notification::{Notification, NotificationKind};
use crate::core::services::content_engine::ContentLifecycleEngine;
use crate::core::services::media_engine::FeaturedAssetEngine;
use crate::core::services::request::RequestContext;
use crate::core::services::router::StorageRouter;
use crate::core::services::session_engine::UserSessionEngine;
use crate::core::services::taxonomy_engine::TaxonomyLifecycleEngine;
use crate::core::traits::directory::ContentDirectory;
use crate::core::traits::subscriber::Subscriber;

/// Subscription registry: routes each notification to the subscribers that
/// registered for its kind, in registration order, and records what they
/// produce.
pub struct EventBus {
    subscribers: HashMap<NotificationKind, Vec<Arc<dyn Subscriber>>>,
    router: StorageRouter,
}

impl EventBus {
    /// An empty bus writing through `router`.
    pub fn new(router: StorageRouter) -> Self {
        Self {
            subscribers: HashMap::new(),
            router,
        }
    }

    /// A bus with the content, taxonomy, featured-asset and session engines.
    pub fn with_standard_engines(router: StorageRouter, directory: Arc<dyn ContentDirectory>) -> Self {
        let mut bus = Self::new(router);
        bus.subscribe(Arc::new(ContentLifecycleEngine::new(directory.clone())));
        bus.subscribe(Arc::new(TaxonomyLifecycleEngine::new(directory.clone())));
        bus.subscribe(Arc::new(FeaturedAssetEngine::new(directory.clone())));
        bus.subscribe(Arc::new(UserSessionEngine::new(directory)));
        bus
    }

    /// Register a subscriber for every kind it declares.
    pub fn subscribe(&mut self, subscriber: Arc<dyn Subscriber>) {
        for kind in subscriber.subscriptions() {
            self.subscribers
                .entry(*kind)
                .or_default()
                .push(subscriber.clone());
        }
    }

    /// Number of subscribers registered for `kind`.
    pub fn subscriber_count(&self, kind: NotificationKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver a notification synchronously and record every resulting
    /// entry. Returns how many entries were handed to the router.
    pub fn dispatch(&self, notification: &Notification, request: &mut RequestContext) -> usize {
        let kind = notification.kind();
        let Some(subscribers) = self.subscribers.get(&kind) else {
            trace!(?kind, "no subscribers");
            return 0;
        };

        let mut recorded = 0;
        for subscriber in subscribers {
            let entries = subscriber.handle(notification, request);
            trace!(?kind, subscriber = subscriber.name(), produced = entries.len(), "dispatched");
            for entry in &entries {
                self.router.record(entry);
            }
            recorded += entries.len();
        }
        recorded
    }
}
