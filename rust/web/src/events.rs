use crate::registry::PlayerId;
use crate::room::Phase;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

// Bounded channel with a reasonable buffer to prevent memory exhaustion.
// If a subscriber is slow, its events are dropped (backpressure).
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<GameEvent>;
pub type EventReceiver = mpsc::Receiver<GameEvent>;

/// A live subscription to the room's event stream. Dropping it removes the
/// subscriber from the bus.
pub struct EventSubscription {
    bus: EventBus,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn subscriber_id(&self) -> usize {
        self.subscriber_id
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscriber_id);
    }
}

/// Fan-out bus for the single shared room.
///
/// Most events are broadcast to every subscriber; `send_to` targets one
/// subscriber, which the SSE handler uses to push the initial room snapshot
/// into a freshly opened stream.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<Vec<(usize, EventSender)>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw();
        EventSubscription {
            bus: self.clone(),
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.push((id, tx));

        tracing::info!(subscriber_id = id, "client subscribed to room events");

        (id, rx)
    }

    pub fn broadcast(&self, event: GameEvent) {
        tracing::debug!(event = ?event, "broadcasting room event");

        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .expect("subscriber lock poisoned");
            guard.clone()
        };

        let mut failed = Vec::new();
        for (id, sender) in subscribers {
            // try_send avoids blocking on full channels; slow subscribers
            // lose events instead of stalling the room.
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    subscriber_id = id,
                    error = ?e,
                    "failed to send event to subscriber"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(&failed);
        }
    }

    /// Sends an event to one subscriber only. Returns false if the
    /// subscriber is gone or its channel is full.
    pub fn send_to(&self, subscriber_id: usize, event: GameEvent) -> bool {
        let sender = {
            let guard = self
                .inner
                .subscribers
                .read()
                .expect("subscriber lock poisoned");
            guard
                .iter()
                .find(|(id, _)| *id == subscriber_id)
                .map(|(_, tx)| tx.clone())
        };

        match sender {
            Some(tx) => tx.try_send(event).is_ok(),
            None => false,
        }
    }

    pub fn unsubscribe(&self, subscriber_id: usize) {
        self.remove_subscribers(&[subscriber_id]);
    }

    pub fn subscriber_count(&self) -> usize {
        let guard = self
            .inner
            .subscribers
            .read()
            .expect("subscriber lock poisoned");
        guard.len()
    }

    fn remove_subscribers(&self, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.retain(|(id, _)| !ids.contains(id));
    }
}

/// Events pushed over the SSE stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Unicast snapshot sent to a client right after it connects.
    Init {
        player_id: PlayerId,
        phase: Phase,
        countdown_remaining: u32,
        stake: u32,
        prize: u64,
        call_history: Vec<u8>,
    },
    Phase {
        phase: Phase,
    },
    Tick {
        countdown_remaining: u32,
        player_count: usize,
        prize: u64,
        stake: u32,
    },
    Players {
        count: usize,
    },
    GameStart,
    Call {
        number: u8,
        call_history: Vec<u8>,
    },
    Winner {
        player_id: PlayerId,
        prize: u64,
    },
}
