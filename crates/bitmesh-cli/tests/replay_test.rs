//! End-to-end replay of scripts from disk.
//!
//! Scripts are written to a temporary directory, loaded through
//! `ScriptDriver::open` and run through the real Runtime. The final App
//! state is checked against the standard invariant registry.

use std::io::Write;

use bitmesh_app::{AppConfig, Runtime};
use bitmesh_cli::{ScriptDriver, ScriptError};
use bitmesh_core::{ChannelId, ConversationKey, Geohash, NetworkStatus, Urgency};
use bitmesh_harness::{InvariantRegistry, SystemSnapshot};

const SESSION: &str = "\
// mesh comes up
transport on
peers alice bob self
session alice established

// the same group advertised twice with different names
group g1 eu alice Weekend hikers
group g1 us bob Renamed
group g2 us bob Climbers

join general
join #general
join random

message @alice
message @bob
message #general
open-latest private
";

fn write_script(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn replays_session_from_disk() {
    let file = write_script(SESSION);
    let driver = ScriptDriver::open(file.path()).await.unwrap();

    let mut runtime = Runtime::new(driver, AppConfig::new("self"));
    runtime.run().await.unwrap();

    let app = runtime.app();
    InvariantRegistry::standard().assert_all(&SystemSnapshot::from_app(app), "after replay");

    let groups = app.registry().all_groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name(), "Weekend hikers");
    assert_eq!(groups[0].region(), "eu");

    let presence = app.presence().snapshot();
    assert_eq!(presence.count, 2);
    assert_eq!(presence.urgency, Urgency::Active);
    assert_eq!(presence.joined_channels, 2);
    assert_eq!(presence.network, NetworkStatus::Connected { peers: 2 });
    assert!(app.presence().session_state(&"alice".into()).is_established());

    assert_eq!(app.open_conversation(), Some(&ConversationKey::private("bob")));
    assert_eq!(app.unread().unread_count(&ConversationKey::private("alice")), 1);
    assert_eq!(app.unread().snapshot().total(), 2);

    let view = runtime.driver().last_view().unwrap();
    assert_eq!(view.open_conversation, Some(ConversationKey::private("bob")));
}

#[tokio::test]
async fn initial_channel_from_config() {
    let file = write_script("participants 9q8yy carol dave\n");
    let driver = ScriptDriver::open(file.path()).await.unwrap();
    let geohash = Geohash::parse("9q8yy").unwrap();
    let config = AppConfig::new("self").with_initial_channel(ChannelId::Location(geohash));

    let mut runtime = Runtime::new(driver, config);
    runtime.run().await.unwrap();

    let view = runtime.driver().last_view().unwrap();
    assert_eq!(view.to_string(), "#9q8yy 2* | Disconnected | joined 0 | groups 0 | unread 0");
}

#[tokio::test]
async fn bad_line_aborts_run() {
    let file = write_script("transport on\nselect atlantis\nquit\n");
    let driver = ScriptDriver::open(file.path()).await.unwrap();

    let mut runtime = Runtime::new(driver, AppConfig::new("self"));
    let err = runtime.run().await.unwrap_err();

    assert!(matches!(err, ScriptError::InvalidChannel { line: 2, .. }));
}

#[tokio::test]
async fn missing_script_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ScriptDriver::open(&dir.path().join("absent.txt")).await.unwrap_err();

    assert!(matches!(err, ScriptError::Io { .. }));
    assert!(err.to_string().starts_with("failed to read"));
}
