//! Status view derived from App state.

use std::fmt;

use bitmesh_app::App;
use bitmesh_core::{ChannelId, ConversationKey, NetworkStatus, Urgency};

/// One-line summary of what a chat header and menu would show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    /// Selected channel badge.
    pub channel: ChannelId,
    /// Participants in the selected channel.
    pub count: usize,
    /// Urgency of `count`.
    pub urgency: Urgency,
    /// Mesh network status.
    pub network: NetworkStatus,
    /// Joined named channels.
    pub joined_channels: usize,
    /// Discovered groups.
    pub groups: usize,
    /// Total unread messages.
    pub unread: u64,
    /// Whether any private conversation has unread messages.
    pub unread_private: bool,
    /// Conversation on screen.
    pub open_conversation: Option<ConversationKey>,
    /// Transient status message.
    pub status: Option<String>,
}

impl StatusView {
    /// Capture the view for `app`.
    pub fn from_app(app: &App) -> Self {
        let presence = app.presence().snapshot();
        let unread = app.unread().snapshot();

        Self {
            channel: presence.channel.clone(),
            count: presence.count,
            urgency: presence.urgency,
            network: presence.network,
            joined_channels: presence.joined_channels,
            groups: app.registry().len(),
            unread: unread.total(),
            unread_private: unread.has_any_unread_private(),
            open_conversation: app.open_conversation().cloned(),
            status: app.status_message().map(str::to_owned),
        }
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.urgency.is_active() { "*" } else { "" };
        write!(f, "{} {}{marker}", self.channel, self.count)?;

        match self.network {
            NetworkStatus::Connected { peers } => write!(f, " | Connected: {peers} Peers")?,
            NetworkStatus::Disconnected => f.write_str(" | Disconnected")?,
        }

        write!(
            f,
            " | joined {} | groups {} | unread {}",
            self.joined_channels, self.groups, self.unread
        )?;
        if self.unread_private {
            f.write_str(" (private)")?;
        }
        if let Some(open) = &self.open_conversation {
            write!(f, " | open {open}")?;
        }
        if let Some(status) = &self.status {
            write!(f, " | {status}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bitmesh_app::{AppConfig, AppEvent};
    use bitmesh_core::PeerId;

    use super::*;

    #[test]
    fn fresh_view() {
        let app = App::new(AppConfig::new("self"));
        let view = StatusView::from_app(&app);

        assert_eq!(view.to_string(), "#mesh 0 | Disconnected | joined 0 | groups 0 | unread 0");
    }

    #[test]
    fn connected_view_with_unread() {
        let mut app = App::new(AppConfig::new("self"));
        let _ = app.handle(AppEvent::TransportStatus { connected: true });
        let _ = app.handle(AppEvent::PeersChanged {
            peers: vec![PeerId::from("A"), PeerId::from("B"), PeerId::from("self")],
        });
        let _ = app.handle(AppEvent::MessageArrived(ConversationKey::private("A")));
        let _ = app.handle(AppEvent::ConversationOpened(ConversationKey::private("B")));

        assert_eq!(
            StatusView::from_app(&app).to_string(),
            "#mesh 2* | Connected: 2 Peers | joined 0 | groups 0 | unread 1 (private) | open @B"
        );
    }
}
