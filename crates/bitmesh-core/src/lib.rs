//! Presence and registry aggregation for the bitmesh client.
//!
//! Tracks which groups have been discovered, who is present on the selected
//! channel, and which conversations carry unread messages. Each component
//! owns its state, accepts updates from any thread, and publishes immutable
//! snapshots that any number of readers can subscribe to.
//!
//! # Components
//!
//! - [`GroupRegistry`]: first-seen-wins registry of discovered groups
//! - [`ChannelPresenceAggregator`]: participant counter for the selected channel
//! - [`UnreadTracker`]: per-conversation unread counters
//! - [`Subscription`]: receiving end of any component's snapshot stream
//!
//! Transport, cryptography and rendering are out of scope. Their outputs
//! (peer lists, session states, geohash participants) arrive here as plain
//! values.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod channel;
pub mod error;
pub mod group;
pub mod ids;
pub mod presence;
pub mod registry;
pub mod session;
pub mod subscription;
pub mod unread;

pub use channel::{ChannelId, ChannelName, Geohash};
pub use error::ChannelError;
pub use group::GroupInfo;
pub use ids::{GroupId, PeerId};
pub use presence::{
    ChannelPresenceAggregator, NetworkStatus, PresenceInputs, PresenceSnapshot, Urgency,
    compute_presence,
};
pub use registry::{GroupRegistry, GroupSnapshot};
pub use session::SessionState;
pub use subscription::Subscription;
pub use unread::{ConversationKey, UnreadSnapshot, UnreadTracker};
