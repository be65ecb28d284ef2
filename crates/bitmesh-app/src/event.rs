//! Application input events.
//!
//! This module defines [`AppEvent`], the inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from three sources:
//! - The mesh transport (connectivity, peers, group advertisements, messages).
//! - The location provider (geohash participant lists).
//! - User interactions (channel selection, opening conversations) and ticks.

use bitmesh_core::{
    ChannelId, ChannelName, ConversationKey, Geohash, GroupInfo, PeerId, SessionState,
};

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Periodic tick.
    Tick,

    /// Mesh transport connectivity changed.
    TransportStatus {
        /// Whether the transport reports connectivity.
        connected: bool,
    },

    /// Connected peer list replaced.
    PeersChanged {
        /// Peers currently reachable over the mesh.
        peers: Vec<PeerId>,
    },

    /// Handshake state of a peer changed.
    SessionChanged {
        /// Peer whose session changed.
        peer: PeerId,
        /// New state.
        state: SessionState,
    },

    /// Group advertisement seen on the mesh.
    GroupAdvertised(GroupInfo),

    /// Joined a named channel.
    ChannelJoined(ChannelName),

    /// Left a named channel.
    ChannelLeft(ChannelName),

    /// User selected a channel. `None` selects mesh.
    ChannelSelected(Option<ChannelId>),

    /// Location provider reported participants for a geohash.
    GeohashParticipants {
        /// Geohash cell.
        geohash: Geohash,
        /// Participants currently in the cell.
        peers: Vec<PeerId>,
    },

    /// A message arrived for a conversation.
    MessageArrived(ConversationKey),

    /// User opened a conversation.
    ConversationOpened(ConversationKey),

    /// User closed the open conversation.
    ConversationClosed,

    /// User asked to jump to the most recently active unread conversation.
    OpenLatestUnread {
        /// Only consider private conversations.
        private_only: bool,
    },

    /// User asked to quit.
    Quit,
}
