//! # Event Bus
//!
//! Topic-keyed fan-out that lets screens react to each other without holding
//! references to each other.
//!
//! Topics are an enum and every payload is a [`BusEvent`] variant that knows
//! its own topic, so a subscriber to `Topic::TimerCompleted` can only ever be
//! handed a `BusEvent::TimerCompleted`.
//!
//! Publishing is synchronous and in subscription order. The subscriber list
//! is snapshotted when `publish` starts: subscribing or unsubscribing from
//! inside a handler takes effect on the next publish, never the current one.
//! All methods take `&self`, so handlers may call back into the bus.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::core::screen::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    TimerCompleted,
    TimerSlotDeleted,
    ScreenChanged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    TimerCompleted { slot: usize },
    TimerSlotDeleted { slot: usize },
    ScreenChanged { screen: ScreenId },
}

impl BusEvent {
    pub fn topic(&self) -> Topic {
        match self {
            BusEvent::TimerCompleted { .. } => Topic::TimerCompleted,
            BusEvent::TimerSlotDeleted { .. } => Topic::TimerSlotDeleted,
            BusEvent::ScreenChanged { .. } => Topic::ScreenChanged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&BusEvent)>;

#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<HashMap<Topic, Vec<(SubscriptionId, Handler)>>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: Topic, handler: impl Fn(&BusEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed to `topic`.
    pub fn unsubscribe(&self, topic: Topic, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let Some(list) = subscribers.get_mut(&topic) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sub, _)| *sub != id);
        before != list.len()
    }

    pub fn publish(&self, event: BusEvent) {
        let topic = event.topic();
        let snapshot: Vec<Handler> = match self.subscribers.borrow().get(&topic) {
            Some(list) => list.iter().map(|(_, h)| Rc::clone(h)).collect(),
            None => return,
        };

        debug!("Publishing {:?} to {} subscriber(s)", event, snapshot.len());
        for handler in snapshot {
            handler(&event);
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers.borrow().get(&topic).map_or(0, Vec::len)
    }
}
