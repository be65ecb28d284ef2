//! Proptest strategies for bitmesh domain values and App events.
//!
//! Identifier spaces are kept small on purpose so that random sequences hit
//! duplicates, re-arrivals and re-selections often.

use bitmesh_app::AppEvent;
use bitmesh_core::{
    ChannelId, ChannelName, ConversationKey, Geohash, GroupInfo, PeerId, SessionState,
};
use proptest::{collection, prelude::*, sample};

/// Peer id used as the local peer by [`event`]-driven tests.
pub const LOCAL_PEER: &str = "self";

const GEOHASHES: [&str; 4] = ["9q8yy", "u4pru", "dr5re", "gcpvj"];
const CHANNELS: [&str; 3] = ["general", "#random", "hiking"];
const REGIONS: [&str; 3] = ["eu", "us", "apac"];

/// A peer id, occasionally the local peer.
pub fn peer_id() -> impl Strategy<Value = PeerId> {
    prop_oneof![
        1 => Just(PeerId::from(LOCAL_PEER)),
        5 => (0u8..8).prop_map(|n| PeerId::new(format!("peer{n}"))),
    ]
}

/// One of a few valid geohashes.
pub fn geohash() -> impl Strategy<Value = Geohash> {
    sample::select(GEOHASHES.to_vec()).prop_filter_map("valid geohash", |g| Geohash::parse(g).ok())
}

/// One of a few channel names, in both `#`-prefixed and bare spellings.
pub fn channel_name() -> impl Strategy<Value = ChannelName> {
    sample::select(CHANNELS.to_vec())
        .prop_filter_map("valid channel name", |c| ChannelName::parse(c).ok())
}

/// A channel selection, including the absent selection.
pub fn selection() -> impl Strategy<Value = Option<ChannelId>> {
    prop_oneof![
        Just(None),
        Just(Some(ChannelId::Mesh)),
        geohash().prop_map(|g| Some(ChannelId::Location(g))),
    ]
}

/// A private or channel conversation.
pub fn conversation_key() -> impl Strategy<Value = ConversationKey> {
    prop_oneof![
        3 => (0u8..5).prop_map(|n| ConversationKey::private(format!("peer{n}"))),
        1 => channel_name().prop_map(ConversationKey::Channel),
        1 => prop_oneof![Just(ChannelId::Mesh), geohash().prop_map(ChannelId::Location)]
            .prop_map(ConversationKey::Public),
    ]
}

/// A group advertisement. Ids repeat often with differing metadata.
pub fn group_info() -> impl Strategy<Value = GroupInfo> {
    (0u8..10, "[a-z]{3,8}", sample::select(REGIONS.to_vec()), peer_id(), any::<u32>()).prop_map(
        |(id, name, region, creator, created)| {
            GroupInfo::new(format!("group{id}"), name, region, creator, u64::from(created))
        },
    )
}

/// A handshake state.
pub fn session_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Uninitialized),
        Just(SessionState::Handshaking),
        Just(SessionState::Established),
        Just(SessionState::Failed),
    ]
}

/// Any App event except [`AppEvent::Quit`].
pub fn event() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        1 => Just(AppEvent::Tick),
        2 => any::<bool>().prop_map(|connected| AppEvent::TransportStatus { connected }),
        3 => collection::vec(peer_id(), 0..8).prop_map(|peers| AppEvent::PeersChanged { peers }),
        1 => (peer_id(), session_state())
            .prop_map(|(peer, state)| AppEvent::SessionChanged { peer, state }),
        3 => group_info().prop_map(AppEvent::GroupAdvertised),
        1 => channel_name().prop_map(AppEvent::ChannelJoined),
        1 => channel_name().prop_map(AppEvent::ChannelLeft),
        2 => selection().prop_map(AppEvent::ChannelSelected),
        2 => (geohash(), collection::vec(peer_id(), 0..6))
            .prop_map(|(geohash, peers)| AppEvent::GeohashParticipants { geohash, peers }),
        6 => conversation_key().prop_map(AppEvent::MessageArrived),
        2 => conversation_key().prop_map(AppEvent::ConversationOpened),
        1 => Just(AppEvent::ConversationClosed),
        2 => any::<bool>().prop_map(|private_only| AppEvent::OpenLatestUnread { private_only }),
    ]
}

/// A sequence of up to `max` events.
pub fn events(max: usize) -> impl Strategy<Value = Vec<AppEvent>> {
    collection::vec(event(), 0..max)
}
