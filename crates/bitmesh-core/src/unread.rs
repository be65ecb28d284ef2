//! Per-conversation unread counters.
//!
//! Counters are keyed by [`ConversationKey`]. A zero count is never stored:
//! opening a conversation removes its key. Every arrival is stamped with a
//! monotonically increasing sequence number, which drives the
//! "open latest unread" policy. The most recent arrival wins, not the
//! highest count.
//!
//! All mutations, including select-and-clear in
//! [`UnreadTracker::open_latest_unread`], happen under one lock and publish
//! before the lock is released. An arrival racing with an open is therefore
//! either cleared by it or counted afresh after it, never lost.

#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]
#![allow(clippy::expect_used, reason = "Mutex poisoning should cause a panic")]

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{Arc, Mutex},
};

use tokio::sync::watch;

use crate::{
    channel::{ChannelId, ChannelName},
    ids::PeerId,
    subscription::Subscription,
};

/// Unread-tracking bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversationKey {
    /// Private chat with a peer.
    Private(PeerId),
    /// Named channel chat.
    Channel(ChannelName),
    /// Public chat of the mesh or of a geohash cell.
    Public(ChannelId),
}

impl ConversationKey {
    /// Private conversation with `peer`.
    pub fn private(peer: impl Into<PeerId>) -> Self {
        Self::Private(peer.into())
    }

    /// Public chat of `channel`.
    pub fn public(channel: ChannelId) -> Self {
        Self::Public(channel)
    }

    /// Whether this is a private conversation.
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private(_))
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private(peer) => write!(f, "@{peer}"),
            Self::Channel(channel) => write!(f, "{channel}"),
            Self::Public(channel) => write!(f, "public {channel}"),
        }
    }
}

/// Immutable view of all non-zero unread counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnreadSnapshot {
    counts: BTreeMap<ConversationKey, u32>,
}

impl UnreadSnapshot {
    /// Unread count for a conversation. Zero if absent.
    pub fn count(&self, key: &ConversationKey) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Whether any private conversation has unread messages.
    pub fn has_any_unread_private(&self) -> bool {
        self.counts.keys().any(ConversationKey::is_private)
    }

    /// Sum of all unread counts.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    /// Whether nothing is unread.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of conversations with unread messages.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// All unread conversations with their counts, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConversationKey, u32)> + '_ {
        self.counts.iter().map(|(k, &c)| (k, c))
    }

    /// Unread private conversations.
    pub fn private(&self) -> impl Iterator<Item = (&PeerId, u32)> + '_ {
        self.counts.iter().filter_map(|(k, &c)| match k {
            ConversationKey::Private(peer) => Some((peer, c)),
            ConversationKey::Channel(_) | ConversationKey::Public(_) => None,
        })
    }

    /// Unread channel conversations.
    pub fn channels(&self) -> impl Iterator<Item = (&ChannelName, u32)> + '_ {
        self.counts.iter().filter_map(|(k, &c)| match k {
            ConversationKey::Channel(channel) => Some((channel, c)),
            ConversationKey::Private(_) | ConversationKey::Public(_) => None,
        })
    }

    /// Unread public chats.
    pub fn public(&self) -> impl Iterator<Item = (&ChannelId, u32)> + '_ {
        self.counts.iter().filter_map(|(k, &c)| match k {
            ConversationKey::Public(channel) => Some((channel, c)),
            ConversationKey::Private(_) | ConversationKey::Channel(_) => None,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u32,
    /// Sequence number of the most recent arrival.
    last_arrival: u64,
}

#[derive(Debug, Default)]
struct UnreadInner {
    counters: HashMap<ConversationKey, Counter>,
    /// Monotonic arrival sequence.
    next_seq: u64,
}

impl UnreadInner {
    fn snapshot(&self) -> UnreadSnapshot {
        UnreadSnapshot {
            counts: self.counters.iter().map(|(k, c)| (k.clone(), c.count)).collect(),
        }
    }

    fn latest(&self, filter: impl Fn(&ConversationKey) -> bool) -> Option<ConversationKey> {
        self.counters
            .iter()
            .filter(|&(key, _)| filter(key))
            .max_by_key(|(_, counter)| counter.last_arrival)
            .map(|(key, _)| key.clone())
    }
}

/// Thread-safe unread tracker.
///
/// Clone shares the same counters.
#[derive(Debug, Clone)]
pub struct UnreadTracker {
    inner: Arc<Mutex<UnreadInner>>,
    tx: Arc<watch::Sender<Arc<UnreadSnapshot>>>,
}

impl Default for UnreadTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UnreadTracker {
    /// Create a tracker with nothing unread.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(UnreadInner::default())),
            tx: Arc::new(watch::Sender::new(Arc::new(UnreadSnapshot::default()))),
        }
    }

    /// Count one new message. Returns the conversation's new unread count.
    pub fn on_message_arrived(&self, key: ConversationKey) -> u32 {
        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let counter =
            inner.counters.entry(key).or_insert(Counter { count: 0, last_arrival: seq });
        counter.count = counter.count.saturating_add(1);
        counter.last_arrival = seq;
        let count = counter.count;

        self.publish(&inner);
        count
    }

    /// Clear a conversation. Returns how many messages were unread.
    pub fn on_conversation_opened(&self, key: &ConversationKey) -> u32 {
        let mut inner = self.lock();
        let Some(cleared) = inner.counters.remove(key) else {
            return 0;
        };
        self.publish(&inner);
        drop(inner);

        tracing::debug!(conversation = %key, cleared = cleared.count, "conversation read");
        cleared.count
    }

    /// Select and clear the conversation with the most recent arrival.
    ///
    /// `None` when nothing is unread.
    pub fn open_latest_unread(&self) -> Option<ConversationKey> {
        self.take_latest_unread().map(|(key, _)| key)
    }

    /// Like [`Self::open_latest_unread`], restricted to private conversations.
    pub fn open_latest_unread_private(&self) -> Option<ConversationKey> {
        self.open_latest_matching(ConversationKey::is_private).map(|(key, _)| key)
    }

    /// Like [`Self::open_latest_unread`], also returning how many messages
    /// the open cleared.
    pub fn take_latest_unread(&self) -> Option<(ConversationKey, u32)> {
        self.open_latest_matching(|_| true)
    }

    /// Whether any private conversation has unread messages.
    pub fn has_any_unread_private(&self) -> bool {
        self.lock().counters.keys().any(ConversationKey::is_private)
    }

    /// Unread count for a conversation. Zero if absent.
    pub fn unread_count(&self, key: &ConversationKey) -> u32 {
        self.lock().counters.get(key).map_or(0, |c| c.count)
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<UnreadSnapshot> {
        self.tx.borrow().clone()
    }

    /// Subscribe to unread snapshots. The current snapshot is delivered
    /// first.
    pub fn subscribe(&self) -> Subscription<UnreadSnapshot> {
        Subscription::new(self.tx.subscribe())
    }

    fn open_latest_matching(
        &self,
        filter: impl Fn(&ConversationKey) -> bool,
    ) -> Option<(ConversationKey, u32)> {
        let mut inner = self.lock();
        let key = inner.latest(filter)?;
        let cleared = inner.counters.remove(&key).map_or(0, |c| c.count);
        self.publish(&inner);
        drop(inner);

        tracing::debug!(conversation = %key, cleared, "opened latest unread");
        Some((key, cleared))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, UnreadInner> {
        self.inner.lock().expect("unread tracker mutex poisoned")
    }

    /// Publish while the caller still holds the lock.
    fn publish(&self, inner: &UnreadInner) {
        let snapshot = Arc::new(inner.snapshot());
        self.tx.send_modify(|current| *current = snapshot);
    }
}
