use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;

use super::message::LiveEvent;

pub type EventHandler = Arc<dyn Fn(&LiveEvent) + Send + Sync>;

/// Handlers registered for live events.
///
/// Handlers are invoked in registration order. The map is only read to take a
/// snapshot, so a handler may subscribe or unsubscribe without deadlocking.
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    handlers: DashMap<u64, EventHandler>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(self: &Arc<Self>, handler: EventHandler) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.handlers.insert(id, handler);
        tracing::debug!(subscription_id = id, "Live event subscriber registered");
        SubscriptionHandle {
            id,
            registry: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) -> bool {
        let removed = self.handlers.remove(&id).is_some();
        if removed {
            tracing::debug!(subscription_id = id, "Live event subscriber removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver `event` to every current handler
    pub fn emit(&self, event: &LiveEvent) -> usize {
        let mut snapshot: Vec<(u64, EventHandler)> = self
            .handlers
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        snapshot.sort_unstable_by_key(|(id, _)| *id);

        for (_, handler) in &snapshot {
            handler(event);
        }
        snapshot.len()
    }
}

/// Registration returned by `ConnectionManager::on_event`.
///
/// Dropping the handle keeps the subscription; call `unsubscribe` to end it.
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: u64,
    registry: Weak<SubscriberRegistry>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.handlers.contains_key(&self.id))
    }

    /// Stop delivery to this handler. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.remove(self.id),
            None => false,
        }
    }
}
