//! Application state machine.
//!
//! This module defines the [`App`] state machine, which routes inbound
//! events into the presence core and decides what the UI should do next.
//!
//! [`App::handle`] consumes [`crate::AppEvent`] inputs and produces
//! [`crate::AppAction`] instructions for the runtime to execute. The core
//! components it owns are cloneable handles, so readers elsewhere can
//! subscribe to their snapshots while the app keeps feeding them.
//!
//! # Responsibilities
//!
//! - Owns the group registry, presence aggregator and unread tracker for one
//!   session.
//! - Tracks the open conversation. Messages for it are read on arrival and
//!   never counted as unread.
//! - Raises notifications for private messages arriving elsewhere.

use bitmesh_core::{
    ChannelPresenceAggregator, ConversationKey, GroupRegistry, PeerId, UnreadTracker,
};

use crate::{AppAction, AppConfig, AppEvent};

/// Application state machine.
///
/// No I/O dependencies, fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    config: AppConfig,
    registry: GroupRegistry,
    presence: ChannelPresenceAggregator,
    unread: UnreadTracker,
    /// Conversation currently on screen. `None` if none is open.
    open_conversation: Option<ConversationKey>,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create an App for one session.
    pub fn new(config: AppConfig) -> Self {
        let presence = ChannelPresenceAggregator::new(config.local_peer.clone());
        if config.initial_channel.is_some() {
            presence.select_channel(config.initial_channel.clone());
        }

        Self {
            config,
            registry: GroupRegistry::new(),
            presence,
            unread: UnreadTracker::new(),
            open_conversation: None,
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::TransportStatus { connected } => {
                self.presence.set_transport_connected(connected);
                vec![AppAction::Render]
            },
            AppEvent::PeersChanged { peers } => {
                self.presence.set_connected_peers(peers);
                vec![AppAction::Render]
            },
            AppEvent::SessionChanged { peer, state } => {
                tracing::debug!(peer = %peer, state = %state, "session state changed");
                self.presence.set_session_state(peer, state);
                vec![AppAction::Render]
            },
            AppEvent::GroupAdvertised(group) => {
                let name = group.name().to_owned();
                if !self.registry.add_group(group) {
                    return vec![];
                }
                self.status_message = Some(format!("Discovered group {name}"));
                vec![AppAction::Render]
            },
            AppEvent::ChannelJoined(channel) => {
                self.status_message = Some(format!("Joined {channel}"));
                self.presence.join_channel(channel);
                vec![AppAction::Render]
            },
            AppEvent::ChannelLeft(channel) => {
                self.presence.leave_channel(&channel);
                self.status_message = Some(format!("Left {channel}"));
                vec![AppAction::Render]
            },
            AppEvent::ChannelSelected(selection) => {
                self.presence.select_channel(selection);
                vec![AppAction::Render]
            },
            AppEvent::GeohashParticipants { geohash, peers } => {
                self.presence.set_geohash_participants(geohash, peers);
                vec![AppAction::Render]
            },
            AppEvent::MessageArrived(conversation) => self.message_arrived(conversation),
            AppEvent::ConversationOpened(conversation) => {
                self.open(conversation);
                vec![AppAction::Render]
            },
            AppEvent::ConversationClosed => {
                self.open_conversation = None;
                vec![AppAction::Render]
            },
            AppEvent::OpenLatestUnread { private_only } => self.open_latest_unread(private_only),
            AppEvent::Quit => self.quit(),
        }
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    fn message_arrived(&mut self, conversation: ConversationKey) -> Vec<AppAction> {
        if self.open_conversation.as_ref() == Some(&conversation) {
            tracing::trace!(conversation = %conversation, "message read on arrival");
            return vec![AppAction::Render];
        }

        let unread = self.unread.on_message_arrived(conversation.clone());
        if conversation.is_private() {
            vec![AppAction::Notify { conversation, unread }, AppAction::Render]
        } else {
            vec![AppAction::Render]
        }
    }

    fn open(&mut self, conversation: ConversationKey) {
        self.unread.on_conversation_opened(&conversation);
        self.open_conversation = Some(conversation);
    }

    fn open_latest_unread(&mut self, private_only: bool) -> Vec<AppAction> {
        let latest = if private_only {
            self.unread.open_latest_unread_private()
        } else {
            self.unread.open_latest_unread()
        };

        let Some(conversation) = latest else {
            self.status_message = Some("No unread messages".to_owned());
            return vec![AppAction::Render];
        };

        self.open_conversation = Some(conversation.clone());
        vec![AppAction::OpenConversation { conversation }, AppAction::Render]
    }

    /// Session configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Our own peer id.
    pub fn local_peer(&self) -> &PeerId {
        &self.config.local_peer
    }

    /// Registry of discovered groups.
    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    /// Presence aggregator for the selected channel.
    pub fn presence(&self) -> &ChannelPresenceAggregator {
        &self.presence
    }

    /// Unread tracker.
    pub fn unread(&self) -> &UnreadTracker {
        &self.unread
    }

    /// Conversation currently on screen. `None` if none is open.
    pub fn open_conversation(&self) -> Option<&ConversationKey> {
        self.open_conversation.as_ref()
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}
