//! Push subscribers and per-session callback bookkeeping.
//!
//! A subscriber is an opaque handle the hosting layer hands us when a
//! client connects. We only ever call [`Subscriber::deliver`] on it. A
//! failed delivery means the client is gone: the handle is pruned and the
//! rest of the broadcast carries on.
//!
//! Broadcasts snapshot the subscriber list first and deliver outside any
//! map guard, so a slow client never blocks registry access.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use dinoforge_protocol::{PlayerId, Recipient};
use tokio::sync::mpsc;

use crate::DeliveryError;

/// Receives pushed events for one connected client.
pub trait Subscriber<E>: Send + Sync + 'static {
    fn deliver(&self, event: E) -> Result<(), DeliveryError>;
}

/// Channel senders are the default subscriber: the hosting layer keeps the
/// receiver and forwards events over its transport. Dropping the receiver
/// makes the next delivery fail, which prunes the subscriber.
impl<E: Send + 'static> Subscriber<E> for mpsc::UnboundedSender<E> {
    fn deliver(&self, event: E) -> Result<(), DeliveryError> {
        self.send(event).map_err(|_| DeliveryError::Disconnected)
    }
}

/// A shared, type-erased subscriber.
pub type SubscriberHandle<E> = Arc<dyn Subscriber<E>>;

/// Wraps a channel sender into a [`SubscriberHandle`].
pub fn channel_subscriber<E: Send + 'static>(
    sender: mpsc::UnboundedSender<E>,
) -> SubscriberHandle<E> {
    Arc::new(sender)
}

/// Tracks which clients are listening to which session.
///
/// Keyed by session code, then by player. A player has at most one
/// subscriber per session; registering again replaces the old one.
pub struct CallbackRegistry<E> {
    subscribers: DashMap<String, HashMap<PlayerId, SubscriberHandle<E>>>,
}

impl<E: Clone + Send + 'static> CallbackRegistry<E> {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    /// Binds a player's push target for a session.
    pub fn register(&self, code: &str, player: PlayerId, subscriber: SubscriberHandle<E>) {
        self.subscribers
            .entry(code.to_string())
            .or_default()
            .insert(player, subscriber);
        tracing::debug!(%code, %player, "subscriber registered");
    }

    /// Unbinds a player's push target. Returns `true` if one was bound.
    pub fn unregister(&self, code: &str, player: PlayerId) -> bool {
        let removed = self
            .subscribers
            .get_mut(code)
            .is_some_and(|mut map| map.remove(&player).is_some());
        self.subscribers.remove_if(code, |_, map| map.is_empty());
        removed
    }

    /// Drops every subscriber of a session. Safe to call repeatedly.
    pub fn clear(&self, code: &str) {
        self.subscribers.remove(code);
    }

    pub fn is_registered(&self, code: &str, player: PlayerId) -> bool {
        self.subscribers
            .get(code)
            .is_some_and(|map| map.contains_key(&player))
    }

    /// Number of live subscribers for a session.
    pub fn count(&self, code: &str) -> usize {
        self.subscribers.get(code).map_or(0, |map| map.len())
    }

    /// Delivers each event to its recipients, pruning subscribers whose
    /// delivery fails. Returns the number of successful deliveries.
    pub fn broadcast(&self, code: &str, events: Vec<(Recipient, E)>) -> usize {
        if events.is_empty() {
            return 0;
        }

        // Snapshot, then release the map guard before delivering.
        let snapshot: Vec<(PlayerId, SubscriberHandle<E>)> = match self.subscribers.get(code) {
            Some(map) => map
                .iter()
                .map(|(player, sub)| (*player, Arc::clone(sub)))
                .collect(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut failed: Vec<(PlayerId, SubscriberHandle<E>)> = Vec::new();

        for (recipient, event) in events {
            for (player, subscriber) in &snapshot {
                if !recipient.includes(*player) {
                    continue;
                }
                if failed.iter().any(|(p, _)| p == player) {
                    continue;
                }
                match subscriber.deliver(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!(%code, %player, error = %e, "pruning subscriber");
                        failed.push((*player, Arc::clone(subscriber)));
                    }
                }
            }
        }

        if !failed.is_empty() {
            if let Some(mut map) = self.subscribers.get_mut(code) {
                for (player, dead) in &failed {
                    // Only prune if the player hasn't re-registered meanwhile.
                    if map.get(player).is_some_and(|current| Arc::ptr_eq(current, dead)) {
                        map.remove(player);
                    }
                }
            }
            self.subscribers.remove_if(code, |_, map| map.is_empty());
        }

        delivered
    }

    /// Delivers one event to one player.
    pub fn send_to(&self, code: &str, player: PlayerId, event: E) -> bool {
        self.broadcast(code, vec![(Recipient::Player(player), event)]) == 1
    }
}

impl<E: Clone + Send + 'static> Default for CallbackRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
