//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use bitmesh_core::compute_presence;

use super::{Invariant, InvariantKind, InvariantResult, SystemSnapshot, Violation};

/// Group ids in the registry are unique.
///
/// Repeated advertisements for one group must never produce a second entry.
pub struct UniqueGroupIds;

impl Invariant for UniqueGroupIds {
    fn kind(&self) -> InvariantKind {
        InvariantKind::UniqueGroupIds
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let mut seen = HashSet::new();
        for group in &state.groups {
            if !seen.insert(group.id()) {
                return Err(Violation {
                    invariant: self.kind(),
                    message: format!("group {} appears more than once", group.id()),
                });
            }
        }
        Ok(())
    }
}

/// Region buckets partition the registry.
///
/// Every group sits in exactly one bucket, the bucket named by its region,
/// and no bucket is empty.
pub struct RegionPartition;

impl Invariant for RegionPartition {
    fn kind(&self) -> InvariantKind {
        InvariantKind::RegionPartition
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let violation = |message: String| Err(Violation { invariant: self.kind(), message });

        let mut bucketed = 0;
        for (region, groups) in &state.groups_by_region {
            if groups.is_empty() {
                return violation(format!("region {region:?} has an empty bucket"));
            }
            if let Some(stray) = groups.iter().find(|g| g.region() != region) {
                return violation(format!(
                    "group {} with region {:?} filed under {region:?}",
                    stray.id(),
                    stray.region()
                ));
            }
            bucketed += groups.len();
        }

        if bucketed != state.groups.len() {
            return violation(format!(
                "{bucketed} bucketed groups, {} in registry",
                state.groups.len()
            ));
        }
        Ok(())
    }
}

/// Published presence equals presence recomputed from current inputs.
///
/// A mismatch means an input change was applied without republishing.
pub struct PresenceMatchesInputs;

impl Invariant for PresenceMatchesInputs {
    fn kind(&self) -> InvariantKind {
        InvariantKind::PresenceMatchesInputs
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let expected = compute_presence(&state.presence_inputs);
        if expected != state.presence {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("published {:?}, inputs give {:?}", state.presence, expected),
            });
        }
        Ok(())
    }
}

/// Zero unread is represented by absence.
pub struct NoZeroUnreadEntries;

impl Invariant for NoZeroUnreadEntries {
    fn kind(&self) -> InvariantKind {
        InvariantKind::NoZeroUnreadEntries
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if let Some((key, _)) = state.unread.iter().find(|&(_, count)| count == 0) {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("{key} stored with zero unread"),
            });
        }
        Ok(())
    }
}

/// The conversation on screen has nothing unread.
///
/// Opening clears it and later arrivals are read immediately.
pub struct OpenConversationHasNoUnread;

impl Invariant for OpenConversationHasNoUnread {
    fn kind(&self) -> InvariantKind {
        InvariantKind::OpenConversationHasNoUnread
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(open) = &state.open_conversation else {
            return Ok(());
        };

        let unread = state.unread.count(open);
        if unread > 0 {
            return Err(Violation {
                invariant: self.kind(),
                message: format!("open conversation {open} has {unread} unread"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bitmesh_app::{App, AppConfig, AppEvent};
    use bitmesh_core::{ConversationKey, GroupInfo};

    use super::*;

    fn snapshot_with_groups() -> SystemSnapshot {
        let mut app = App::new(AppConfig::new("self"));
        for (id, region) in [("g1", "eu"), ("g2", "us"), ("g3", "eu")] {
            let _ = app.handle(AppEvent::GroupAdvertised(GroupInfo::new(id, id, region, "p", 0)));
        }
        SystemSnapshot::from_app(&app)
    }

    #[test]
    fn unique_ids_detects_duplicate() {
        let mut state = snapshot_with_groups();
        assert!(UniqueGroupIds.check(&state).is_ok());

        let duplicate = state.groups[0].clone();
        state.groups.push(duplicate);
        let violation = UniqueGroupIds.check(&state).unwrap_err();
        assert_eq!(violation.invariant, InvariantKind::UniqueGroupIds);
    }

    #[test]
    fn region_partition_detects_missing_group() {
        let mut state = snapshot_with_groups();
        assert!(RegionPartition.check(&state).is_ok());

        state.groups_by_region.get_mut("eu").unwrap().pop();
        assert!(RegionPartition.check(&state).is_err());
    }

    #[test]
    fn region_partition_detects_misfiled_group() {
        let mut state = snapshot_with_groups();
        let us = state.groups_by_region.remove("us").unwrap();
        state.groups_by_region.get_mut("eu").unwrap().extend(us);

        assert!(RegionPartition.check(&state).is_err());
    }

    #[test]
    fn presence_mismatch_detected() {
        let mut state = snapshot_with_groups();
        assert!(PresenceMatchesInputs.check(&state).is_ok());

        state.presence_inputs.transport_connected = true;
        assert!(PresenceMatchesInputs.check(&state).is_err());
    }

    #[test]
    fn open_conversation_with_unread_detected() {
        let mut app = App::new(AppConfig::new("self"));
        let peer = ConversationKey::private("peerA");
        let _ = app.handle(AppEvent::MessageArrived(peer.clone()));

        let mut state = SystemSnapshot::from_app(&app);
        assert!(OpenConversationHasNoUnread.check(&state).is_ok());
        assert!(NoZeroUnreadEntries.check(&state).is_ok());

        state.open_conversation = Some(peer);
        assert!(OpenConversationHasNoUnread.check(&state).is_err());
    }
}
