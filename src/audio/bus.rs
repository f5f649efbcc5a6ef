use std::collections::HashMap;

use super::types::{AudioEvent, EventKind};

/// Token returned by [`EventBus::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&AudioEvent)>;

/// Subscriber registry keyed by event kind.
///
/// Delivery is synchronous, in subscription order, inside the call that
/// emitted the event.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&AudioEvent) + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for handlers in self.subscribers.values_mut() {
            if let Some(pos) = handlers.iter().position(|(sid, _)| *sid == id) {
                handlers.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn emit(&mut self, event: &AudioEvent) {
        if let Some(handlers) = self.subscribers.get_mut(&event.kind()) {
            for (_, handler) in handlers.iter_mut() {
                handler(event);
            }
        }
    }
}
