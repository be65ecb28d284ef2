//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use std::collections::BTreeMap;

use bitmesh_app::App;
use bitmesh_core::{ConversationKey, GroupInfo, PresenceInputs, PresenceSnapshot, UnreadSnapshot};

/// Snapshot of one App's observable state.
#[derive(Debug, Clone)]
pub struct SystemSnapshot {
    /// Registry contents in discovery order.
    pub groups: Vec<GroupInfo>,
    /// Registry contents bucketed by region, taken from the same snapshot.
    pub groups_by_region: BTreeMap<String, Vec<GroupInfo>>,
    /// Inputs the presence aggregator currently holds.
    pub presence_inputs: PresenceInputs,
    /// Last published presence snapshot.
    pub presence: PresenceSnapshot,
    /// Last published unread snapshot.
    pub unread: UnreadSnapshot,
    /// Conversation on screen. `None` if none is open.
    pub open_conversation: Option<ConversationKey>,
}

impl SystemSnapshot {
    /// Capture the observable state of `app`.
    pub fn from_app(app: &App) -> Self {
        let registry = app.registry().snapshot();
        Self {
            groups: registry.iter().cloned().collect(),
            groups_by_region: registry.by_region(),
            presence_inputs: app.presence().inputs(),
            presence: (*app.presence().snapshot()).clone(),
            unread: (*app.unread().snapshot()).clone(),
            open_conversation: app.open_conversation().cloned(),
        }
    }
}
