//! Discovered group metadata.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::ids::{GroupId, PeerId};

/// A group as first advertised on the mesh.
///
/// Immutable once constructed: groups are never updated after discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    id: GroupId,
    name: String,
    region: String,
    creator: PeerId,
    created_at_ms: u64,
}

impl GroupInfo {
    /// Create group metadata with an explicit creation time (Unix ms).
    pub fn new(
        id: impl Into<GroupId>,
        name: impl Into<String>,
        region: impl Into<String>,
        creator: impl Into<PeerId>,
        created_at_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            region: region.into(),
            creator: creator.into(),
            created_at_ms,
        }
    }

    /// Create group metadata stamped with the current wall-clock time.
    #[allow(clippy::disallowed_methods)]
    pub fn observed_now(
        id: impl Into<GroupId>,
        name: impl Into<String>,
        region: impl Into<String>,
        creator: impl Into<PeerId>,
    ) -> Self {
        // A clock before 1970 is a host problem, not a reason to drop the group.
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64);
        Self::new(id, name, region, creator, now_ms)
    }

    /// Group identity.
    pub fn id(&self) -> &GroupId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-text region key used for grouping.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Peer that created the group.
    pub fn creator(&self) -> &PeerId {
        &self.creator
    }

    /// Creation instant, Unix milliseconds.
    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }
}
