//! Session configuration.

use bitmesh_core::{ChannelId, PeerId};

/// Configuration for one [`crate::App`] session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Our own peer id. Excluded from mesh participant counts.
    pub local_peer: PeerId,
    /// Channel selected at startup. `None` selects mesh.
    pub initial_channel: Option<ChannelId>,
}

impl AppConfig {
    /// Configuration for `local_peer` with mesh selected.
    pub fn new(local_peer: impl Into<PeerId>) -> Self {
        Self { local_peer: local_peer.into(), initial_channel: None }
    }

    /// Select `channel` at startup.
    #[must_use]
    pub fn with_initial_channel(mut self, channel: ChannelId) -> Self {
        self.initial_channel = Some(channel);
        self
    }
}
