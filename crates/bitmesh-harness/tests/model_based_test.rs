//! Model-based tests: the App against the reference model.
//!
//! Random event sequences are applied to both the real App and the
//! [`ReferenceModel`]. After every event the produced actions and the
//! observable states must agree.

use bitmesh_app::{App, AppConfig, AppEvent};
use bitmesh_core::{ConversationKey, GroupInfo, PeerId};
use bitmesh_harness::{
    InvariantRegistry, ObservableState, ReferenceModel, SystemSnapshot,
    strategies::{self, LOCAL_PEER},
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn app_matches_reference_model(events in strategies::events(80)) {
        let mut app = App::new(AppConfig::new(LOCAL_PEER));
        let mut model = ReferenceModel::new(LOCAL_PEER);
        let invariants = InvariantRegistry::standard();

        for (step, event) in events.into_iter().enumerate() {
            let expected = model.apply(&event);
            let actual = app.handle(event.clone());
            prop_assert_eq!(&actual, &expected, "step {}: actions for {:?}", step, event);
            prop_assert_eq!(
                ObservableState::from_app(&app),
                model.observable(),
                "step {}: state after {:?}",
                step,
                event
            );
            prop_assert!(invariants.check_all(&SystemSnapshot::from_app(&app)).is_ok());
        }
    }
}

/// The walkthrough from the presence and unread requirements, end to end.
#[test]
fn scripted_session_matches_model() {
    let events = vec![
        AppEvent::TransportStatus { connected: true },
        AppEvent::PeersChanged {
            peers: vec![PeerId::from("A"), PeerId::from("B"), PeerId::from(LOCAL_PEER)],
        },
        AppEvent::GroupAdvertised(GroupInfo::new("g1", "first", "eu", "A", 1)),
        AppEvent::GroupAdvertised(GroupInfo::new("g1", "second", "us", "B", 2)),
        AppEvent::MessageArrived(ConversationKey::private("peerA")),
        AppEvent::MessageArrived(ConversationKey::private("peerB")),
        AppEvent::OpenLatestUnread { private_only: false },
        AppEvent::OpenLatestUnread { private_only: false },
        AppEvent::OpenLatestUnread { private_only: false },
    ];

    let mut app = App::new(AppConfig::new(LOCAL_PEER));
    let mut model = ReferenceModel::new(LOCAL_PEER);
    for event in events {
        assert_eq!(app.handle(event.clone()), model.apply(&event));
    }

    let state = ObservableState::from_app(&app);
    assert_eq!(state, model.observable());
    assert_eq!(state.count, 2);
    assert_eq!(state.group_names, ["first"]);
    assert!(state.unread.is_empty());
    assert_eq!(state.open_conversation, Some(ConversationKey::private("peerA")));
}
