//! Channel presence aggregation.
//!
//! Computes the "who is here" counter for the selected channel from inputs
//! supplied by the transport, the location provider and the UI:
//!
//! | selected channel     | count                                   | active when              |
//! |----------------------|-----------------------------------------|--------------------------|
//! | `Location(geohash)`  | participants reported for that geohash  | count > 0                |
//! | `Mesh` / no selection| connected peers, excluding ourselves    | connected and count > 0  |
//!
//! [`compute_presence`] is a pure function of [`PresenceInputs`]. The
//! [`ChannelPresenceAggregator`] only stores the most recent inputs and
//! republishes the computed snapshot whenever one input changes. Inputs are
//! not batched, so one logical event may yield several snapshots in a row.

#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]
#![allow(clippy::expect_used, reason = "Mutex poisoning should cause a panic")]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use tokio::sync::watch;

use crate::{
    channel::{ChannelId, ChannelName, Geohash},
    ids::PeerId,
    session::SessionState,
    subscription::Subscription,
};

/// Semantic urgency of a counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Urgency {
    /// Nothing to draw attention to.
    #[default]
    Inactive,
    /// Participants present and reachable.
    Active,
}

impl Urgency {
    fn when(condition: bool) -> Self {
        if condition { Self::Active } else { Self::Inactive }
    }

    /// Whether this is [`Urgency::Active`].
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// Mesh network status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    /// Transport reports no connectivity.
    Disconnected,
    /// Transport connected.
    Connected {
        /// Mesh peers reachable, excluding ourselves.
        peers: usize,
    },
}

/// Everything the presence counter depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceInputs {
    /// Our own peer id, excluded from mesh counts.
    pub local_peer: PeerId,
    /// Selected channel. `None` means mesh.
    pub selected: Option<ChannelId>,
    /// Peers currently connected over the mesh transport.
    pub connected_peers: Vec<PeerId>,
    /// Whether the mesh transport reports connectivity.
    pub transport_connected: bool,
    /// Joined named channels.
    pub joined_channels: HashSet<ChannelName>,
    /// Participant lists per geohash, as last reported by the location
    /// provider.
    pub geohash_participants: HashMap<Geohash, Vec<PeerId>>,
    /// Handshake state per peer. Display-only; does not affect counts.
    pub sessions: HashMap<PeerId, SessionState>,
}

impl PresenceInputs {
    /// Inputs for a fresh session: mesh selected, nothing connected.
    pub fn new(local_peer: PeerId) -> Self {
        Self {
            local_peer,
            selected: None,
            connected_peers: Vec::new(),
            transport_connected: false,
            joined_channels: HashSet::new(),
            geohash_participants: HashMap::new(),
            sessions: HashMap::new(),
        }
    }

    /// Number of connected mesh peers other than ourselves.
    pub fn mesh_peer_count(&self) -> usize {
        self.connected_peers.iter().filter(|peer| **peer != self.local_peer).count()
    }
}

/// Derived presence view for the selected channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    /// Channel the counter refers to. Never absent: no selection is mesh.
    pub channel: ChannelId,
    /// Participants in the selected channel.
    pub count: usize,
    /// Urgency class of `count`.
    pub urgency: Urgency,
    /// Number of joined named channels.
    pub joined_channels: usize,
    /// Urgency of the joined-channel indicator. Tracks connectivity only.
    pub joined_urgency: Urgency,
    /// Mesh network status, independent of the selected channel.
    pub network: NetworkStatus,
}

/// Compute the presence snapshot for a set of inputs.
///
/// Pure: equal inputs always produce equal snapshots.
pub fn compute_presence(inputs: &PresenceInputs) -> PresenceSnapshot {
    let channel = ChannelId::from_selection(inputs.selected.clone());
    let mesh_peers = inputs.mesh_peer_count();

    let (count, urgency) = match &channel {
        ChannelId::Location(geohash) => {
            let count = inputs.geohash_participants.get(geohash).map_or(0, Vec::len);
            (count, Urgency::when(count > 0))
        },
        ChannelId::Mesh => {
            (mesh_peers, Urgency::when(inputs.transport_connected && mesh_peers > 0))
        },
    };

    let joined_channels = inputs.joined_channels.len();
    let network = if inputs.transport_connected {
        NetworkStatus::Connected { peers: mesh_peers }
    } else {
        NetworkStatus::Disconnected
    };

    PresenceSnapshot {
        channel,
        count,
        urgency,
        joined_channels,
        joined_urgency: Urgency::when(inputs.transport_connected && joined_channels > 0),
        network,
    }
}

/// Recomputes and publishes [`PresenceSnapshot`]s as inputs change.
///
/// Thread-safe via `Arc<Mutex<_>>`. Clone shares the same inputs.
#[derive(Debug, Clone)]
pub struct ChannelPresenceAggregator {
    inputs: Arc<Mutex<PresenceInputs>>,
    tx: Arc<watch::Sender<Arc<PresenceSnapshot>>>,
}

impl ChannelPresenceAggregator {
    /// Create an aggregator for the given local peer.
    pub fn new(local_peer: PeerId) -> Self {
        let inputs = PresenceInputs::new(local_peer);
        let snapshot = compute_presence(&inputs);
        Self {
            inputs: Arc::new(Mutex::new(inputs)),
            tx: Arc::new(watch::Sender::new(Arc::new(snapshot))),
        }
    }

    /// Replace the connected-peer list.
    pub fn set_connected_peers(&self, peers: Vec<PeerId>) {
        self.update(|inputs| inputs.connected_peers = peers);
    }

    /// Record transport connectivity.
    pub fn set_transport_connected(&self, connected: bool) {
        self.update(|inputs| inputs.transport_connected = connected);
    }

    /// Replace the joined-channel set.
    pub fn set_joined_channels(&self, channels: impl IntoIterator<Item = ChannelName>) {
        let channels: HashSet<_> = channels.into_iter().collect();
        self.update(|inputs| inputs.joined_channels = channels);
    }

    /// Add one joined channel. Joining twice is a no-op.
    pub fn join_channel(&self, channel: ChannelName) {
        self.update(|inputs| {
            inputs.joined_channels.insert(channel);
        });
    }

    /// Remove one joined channel.
    pub fn leave_channel(&self, channel: &ChannelName) {
        self.update(|inputs| {
            inputs.joined_channels.remove(channel);
        });
    }

    /// Change the selected channel. `None` selects mesh.
    pub fn select_channel(&self, channel: Option<ChannelId>) {
        self.update(|inputs| inputs.selected = channel);
    }

    /// Replace the participant list for one geohash.
    pub fn set_geohash_participants(&self, geohash: Geohash, participants: Vec<PeerId>) {
        self.update(|inputs| {
            inputs.geohash_participants.insert(geohash, participants);
        });
    }

    /// Record a peer's handshake state.
    pub fn set_session_state(&self, peer: PeerId, state: SessionState) {
        self.update(|inputs| {
            inputs.sessions.insert(peer, state);
        });
    }

    /// Handshake state for a peer. Unknown peers are uninitialized.
    pub fn session_state(&self, peer: &PeerId) -> SessionState {
        self.lock().sessions.get(peer).copied().unwrap_or_default()
    }

    /// Selected channel, with no selection resolved to mesh.
    pub fn selected_channel(&self) -> ChannelId {
        ChannelId::from_selection(self.lock().selected.clone())
    }

    /// Copy of the current inputs.
    pub fn inputs(&self) -> PresenceInputs {
        self.lock().clone()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<PresenceSnapshot> {
        self.tx.borrow().clone()
    }

    /// Subscribe to presence snapshots. The current snapshot is delivered
    /// first.
    pub fn subscribe(&self) -> Subscription<PresenceSnapshot> {
        Subscription::new(self.tx.subscribe())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PresenceInputs> {
        self.inputs.lock().expect("presence inputs mutex poisoned")
    }

    /// Apply one input change, recompute, and publish if the snapshot moved.
    ///
    /// Publication happens under the inputs lock so concurrent updates
    /// publish in the order they were applied.
    fn update(&self, change: impl FnOnce(&mut PresenceInputs)) {
        let mut inputs = self.lock();
        change(&mut *inputs);
        let next = compute_presence(&inputs);

        let published = self.tx.send_if_modified(|current| {
            if **current == next {
                return false;
            }
            *current = Arc::new(next);
            true
        });
        drop(inputs);

        if published {
            tracing::trace!("presence snapshot republished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peers(ids: &[&str]) -> Vec<PeerId> {
        ids.iter().copied().map(PeerId::from).collect()
    }

    fn location(geohash: &str) -> ChannelId {
        ChannelId::Location(Geohash::parse(geohash).unwrap())
    }

    #[test]
    fn location_channel_counts_participants() {
        let mut inputs = PresenceInputs::new(PeerId::from("self"));
        let geohash = Geohash::parse("9q8yy").unwrap();
        inputs.selected = Some(location("9q8yy"));
        inputs.geohash_participants.insert(geohash.clone(), peers(&["p1", "p2", "p3"]));

        let snapshot = compute_presence(&inputs);
        assert_eq!(snapshot.count, 3);
        assert_eq!(snapshot.urgency, Urgency::Active);

        inputs.geohash_participants.insert(geohash, Vec::new());
        let snapshot = compute_presence(&inputs);
        assert_eq!(snapshot.count, 0);
        assert_eq!(snapshot.urgency, Urgency::Inactive);
    }

    #[test]
    fn location_urgency_ignores_transport() {
        let mut inputs = PresenceInputs::new(PeerId::from("self"));
        inputs.selected = Some(location("u4pru"));
        inputs.transport_connected = false;
        inputs.geohash_participants.insert(Geohash::parse("u4pru").unwrap(), peers(&["p1"]));

        assert_eq!(compute_presence(&inputs).urgency, Urgency::Active);
    }

    #[test]
    fn unknown_geohash_counts_zero() {
        let mut inputs = PresenceInputs::new(PeerId::from("self"));
        inputs.selected = Some(location("9q8yy"));
        inputs.geohash_participants.insert(Geohash::parse("9q8yz").unwrap(), peers(&["p1"]));

        let snapshot = compute_presence(&inputs);
        assert_eq!(snapshot.count, 0);
        assert_eq!(snapshot.urgency, Urgency::Inactive);
    }

    #[test]
    fn mesh_excludes_self() {
        let mut inputs = PresenceInputs::new(PeerId::from("self"));
        inputs.connected_peers = peers(&["A", "B", "self"]);
        inputs.transport_connected = true;

        let snapshot = compute_presence(&inputs);
        assert_eq!(snapshot.channel, ChannelId::Mesh);
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.urgency, Urgency::Active);
        assert_eq!(snapshot.network, NetworkStatus::Connected { peers: 2 });
    }

    #[test]
    fn mesh_requires_connectivity() {
        let mut inputs = PresenceInputs::new(PeerId::from("self"));
        inputs.connected_peers = peers(&["A"]);
        inputs.transport_connected = false;

        let snapshot = compute_presence(&inputs);
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.urgency, Urgency::Inactive);
        assert_eq!(snapshot.network, NetworkStatus::Disconnected);

        inputs.connected_peers = peers(&["self"]);
        inputs.transport_connected = true;
        assert_eq!(compute_presence(&inputs).urgency, Urgency::Inactive);
    }

    #[test]
    fn joined_channels_do_not_affect_urgency() {
        let mut inputs = PresenceInputs::new(PeerId::from("self"));
        inputs.transport_connected = true;
        inputs.joined_channels.insert(ChannelName::parse("general").unwrap());
        inputs.joined_channels.insert(ChannelName::parse("#general").unwrap());

        let snapshot = compute_presence(&inputs);
        assert_eq!(snapshot.joined_channels, 1);
        assert_eq!(snapshot.joined_urgency, Urgency::Active);
        assert_eq!(snapshot.urgency, Urgency::Inactive);
    }

    #[test]
    fn aggregator_publishes_on_change() {
        let aggregator = ChannelPresenceAggregator::new(PeerId::from("self"));
        let mut sub = aggregator.subscribe();
        assert_eq!(sub.try_next().map(|s| s.count), Some(0));

        aggregator.set_connected_peers(peers(&["A", "self"]));
        assert_eq!(sub.try_next().map(|s| s.count), Some(1));

        aggregator.set_transport_connected(true);
        assert_eq!(sub.try_next().map(|s| s.urgency), Some(Urgency::Active));

        // Same inputs again: nothing new to render.
        aggregator.set_connected_peers(peers(&["A", "self"]));
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn aggregator_follows_selection() {
        let aggregator = ChannelPresenceAggregator::new(PeerId::from("self"));
        let geohash = Geohash::parse("9q8yy").unwrap();
        aggregator.set_geohash_participants(geohash.clone(), peers(&["p1", "p2"]));

        aggregator.select_channel(Some(ChannelId::Location(geohash)));
        assert_eq!(aggregator.snapshot().count, 2);

        aggregator.select_channel(None);
        assert_eq!(aggregator.snapshot().channel, ChannelId::Mesh);
        assert_eq!(aggregator.selected_channel(), ChannelId::Mesh);
        assert_eq!(aggregator.snapshot().count, 0);
    }

    #[test]
    fn session_state_defaults_to_uninitialized() {
        let aggregator = ChannelPresenceAggregator::new(PeerId::from("self"));
        let peer = PeerId::from("A");
        assert_eq!(aggregator.session_state(&peer), SessionState::Uninitialized);

        aggregator.set_session_state(peer.clone(), SessionState::Established);
        assert!(aggregator.session_state(&peer).is_established());
    }

    #[test]
    fn join_and_leave_channels() {
        let aggregator = ChannelPresenceAggregator::new(PeerId::from("self"));
        let general = ChannelName::parse("general").unwrap();

        aggregator.join_channel(general.clone());
        aggregator.join_channel(general.clone());
        assert_eq!(aggregator.snapshot().joined_channels, 1);

        aggregator.leave_channel(&general);
        assert_eq!(aggregator.snapshot().joined_channels, 0);
    }
}
