//! Reference model for model-based testing.
//!
//! [`ReferenceModel`] re-implements the App's observable behavior with plain
//! vectors and linear scans: no indexes, no locks, no snapshot publication.
//! It is the oracle against which the real implementation is verified. Apply
//! the same [`AppEvent`] to both, then compare the returned actions and the
//! [`ObservableState`]s.

use std::collections::BTreeMap;

use bitmesh_app::{App, AppAction, AppEvent};
use bitmesh_core::{
    ChannelId, ChannelName, ConversationKey, Geohash, GroupId, GroupInfo, NetworkStatus, PeerId,
    Urgency,
};

/// Observable state for oracle comparison.
///
/// This is the subset of App state that both implementations expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Group ids in discovery order.
    pub group_ids: Vec<GroupId>,
    /// Group names in discovery order.
    pub group_names: Vec<String>,
    /// Group ids per region, discovery order within each region.
    pub regions: BTreeMap<String, Vec<GroupId>>,
    /// Selected channel.
    pub channel: ChannelId,
    /// Participant count for the selected channel.
    pub count: usize,
    /// Urgency of `count`.
    pub urgency: Urgency,
    /// Number of joined named channels.
    pub joined_channels: usize,
    /// Network status line.
    pub network: NetworkStatus,
    /// Non-zero unread counters.
    pub unread: BTreeMap<ConversationKey, u32>,
    /// Conversation on screen.
    pub open_conversation: Option<ConversationKey>,
}

impl ObservableState {
    /// Extract the observable state of the real App.
    pub fn from_app(app: &App) -> Self {
        let groups = app.registry().snapshot();
        let presence = app.presence().snapshot();

        Self {
            group_ids: groups.iter().map(|g| g.id().clone()).collect(),
            group_names: groups.iter().map(|g| g.name().to_owned()).collect(),
            regions: groups
                .by_region()
                .into_iter()
                .map(|(region, groups)| (region, groups.iter().map(|g| g.id().clone()).collect()))
                .collect(),
            channel: presence.channel.clone(),
            count: presence.count,
            urgency: presence.urgency,
            joined_channels: presence.joined_channels,
            network: presence.network,
            unread: app.unread().snapshot().iter().map(|(k, c)| (k.clone(), c)).collect(),
            open_conversation: app.open_conversation().cloned(),
        }
    }
}

/// Reference implementation of the App.
#[derive(Debug, Clone)]
pub struct ReferenceModel {
    local_peer: PeerId,
    groups: Vec<GroupInfo>,
    transport_connected: bool,
    peers: Vec<PeerId>,
    selected: Option<ChannelId>,
    participants: Vec<(Geohash, Vec<PeerId>)>,
    joined: Vec<ChannelName>,
    /// Unread conversations, least recent arrival first.
    unread: Vec<(ConversationKey, u32)>,
    open_conversation: Option<ConversationKey>,
}

impl ReferenceModel {
    /// Create a model for `local_peer` with mesh selected.
    pub fn new(local_peer: impl Into<PeerId>) -> Self {
        Self {
            local_peer: local_peer.into(),
            groups: Vec::new(),
            transport_connected: false,
            peers: Vec::new(),
            selected: None,
            participants: Vec::new(),
            joined: Vec::new(),
            unread: Vec::new(),
            open_conversation: None,
        }
    }

    /// Apply an event and return the actions the App should produce.
    pub fn apply(&mut self, event: &AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Quit => vec![AppAction::Quit],
            AppEvent::TransportStatus { connected } => {
                self.transport_connected = *connected;
                vec![AppAction::Render]
            },
            AppEvent::PeersChanged { peers } => {
                self.peers.clone_from(peers);
                vec![AppAction::Render]
            },
            AppEvent::SessionChanged { .. } => vec![AppAction::Render],
            AppEvent::GroupAdvertised(group) => {
                if self.groups.iter().any(|g| g.id() == group.id()) {
                    return vec![];
                }
                self.groups.push(group.clone());
                vec![AppAction::Render]
            },
            AppEvent::ChannelJoined(channel) => {
                if !self.joined.contains(channel) {
                    self.joined.push(channel.clone());
                }
                vec![AppAction::Render]
            },
            AppEvent::ChannelLeft(channel) => {
                self.joined.retain(|c| c != channel);
                vec![AppAction::Render]
            },
            AppEvent::ChannelSelected(selection) => {
                self.selected.clone_from(selection);
                vec![AppAction::Render]
            },
            AppEvent::GeohashParticipants { geohash, peers } => {
                self.participants.retain(|(g, _)| g != geohash);
                self.participants.push((geohash.clone(), peers.clone()));
                vec![AppAction::Render]
            },
            AppEvent::MessageArrived(conversation) => self.message_arrived(conversation),
            AppEvent::ConversationOpened(conversation) => {
                self.take_unread(conversation);
                self.open_conversation = Some(conversation.clone());
                vec![AppAction::Render]
            },
            AppEvent::ConversationClosed => {
                self.open_conversation = None;
                vec![AppAction::Render]
            },
            AppEvent::OpenLatestUnread { private_only } => {
                let latest = self
                    .unread
                    .iter()
                    .rev()
                    .find(|(key, _)| !private_only || key.is_private())
                    .map(|(key, _)| key.clone());

                let Some(conversation) = latest else {
                    return vec![AppAction::Render];
                };
                self.take_unread(&conversation);
                self.open_conversation = Some(conversation.clone());
                vec![AppAction::OpenConversation { conversation }, AppAction::Render]
            },
        }
    }

    fn message_arrived(&mut self, conversation: &ConversationKey) -> Vec<AppAction> {
        if self.open_conversation.as_ref() == Some(conversation) {
            return vec![AppAction::Render];
        }

        let unread = self.take_unread(conversation) + 1;
        self.unread.push((conversation.clone(), unread));

        if conversation.is_private() {
            vec![AppAction::Notify { conversation: conversation.clone(), unread }, AppAction::Render]
        } else {
            vec![AppAction::Render]
        }
    }

    /// Remove a conversation's unread entry, returning its count.
    fn take_unread(&mut self, conversation: &ConversationKey) -> u32 {
        let position = self.unread.iter().position(|(key, _)| key == conversation);
        position.map_or(0, |i| self.unread.remove(i).1)
    }

    fn mesh_peers(&self) -> usize {
        self.peers.iter().filter(|p| **p != self.local_peer).count()
    }

    /// Observable state for comparison with [`ObservableState::from_app`].
    pub fn observable(&self) -> ObservableState {
        let mut regions: BTreeMap<String, Vec<GroupId>> = BTreeMap::new();
        for group in &self.groups {
            regions.entry(group.region().to_owned()).or_default().push(group.id().clone());
        }

        let mesh_peers = self.mesh_peers();
        let (channel, count, active) = match &self.selected {
            Some(ChannelId::Location(geohash)) => {
                let count = self
                    .participants
                    .iter()
                    .find(|(g, _)| g == geohash)
                    .map_or(0, |(_, peers)| peers.len());
                (ChannelId::Location(geohash.clone()), count, count > 0)
            },
            Some(ChannelId::Mesh) | None => {
                (ChannelId::Mesh, mesh_peers, self.transport_connected && mesh_peers > 0)
            },
        };

        ObservableState {
            group_ids: self.groups.iter().map(|g| g.id().clone()).collect(),
            group_names: self.groups.iter().map(|g| g.name().to_owned()).collect(),
            regions,
            channel,
            count,
            urgency: if active { Urgency::Active } else { Urgency::Inactive },
            joined_channels: self.joined.len(),
            network: if self.transport_connected {
                NetworkStatus::Connected { peers: mesh_peers }
            } else {
                NetworkStatus::Disconnected
            },
            unread: self.unread.iter().cloned().collect(),
            open_conversation: self.open_conversation.clone(),
        }
    }
}
