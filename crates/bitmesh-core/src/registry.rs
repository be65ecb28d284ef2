//! Registry of groups discovered on the mesh.
//!
//! Advertisements for the same group arrive repeatedly and from several
//! transport callbacks at once. The registry keeps exactly one entry per
//! [`GroupId`]: the first one seen. Later advertisements for a known id are
//! dropped, never merged, so metadata can't flap between conflicting
//! advertisements.
//!
//! State lives inside a [`watch::Sender`]. Insert-if-absent runs under the
//! channel's lock and publishes in the same step, which makes the check and
//! the insert atomic and keeps snapshots in causal order. Readers get
//! copy-on-write [`GroupSnapshot`]s that are never mutated after publication.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use tokio::sync::watch;

use crate::{group::GroupInfo, ids::GroupId, subscription::Subscription};

/// Immutable view of the registry contents, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSnapshot {
    groups: Vec<GroupInfo>,
    index: HashMap<GroupId, usize>,
}

impl GroupSnapshot {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no group has been discovered.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Whether a group with this id is present.
    pub fn contains(&self, id: &GroupId) -> bool {
        self.index.contains_key(id)
    }

    /// Group by id. `None` if unknown.
    pub fn get(&self, id: &GroupId) -> Option<&GroupInfo> {
        self.index.get(id).and_then(|&i| self.groups.get(i))
    }

    /// Groups in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupInfo> + '_ {
        self.groups.iter()
    }

    /// Groups partitioned by region. Each bucket keeps discovery order.
    pub fn by_region(&self) -> BTreeMap<String, Vec<GroupInfo>> {
        let mut buckets: BTreeMap<String, Vec<GroupInfo>> = BTreeMap::new();
        for group in &self.groups {
            buckets.entry(group.region().to_owned()).or_default().push(group.clone());
        }
        buckets
    }

    /// Id-keyed map of all groups.
    pub fn to_map(&self) -> HashMap<GroupId, GroupInfo> {
        self.groups.iter().map(|g| (g.id().clone(), g.clone())).collect()
    }

    /// Insert if the id is new. Returns `false` for a known id.
    fn insert(&mut self, group: GroupInfo) -> bool {
        if self.index.contains_key(group.id()) {
            return false;
        }
        self.index.insert(group.id().clone(), self.groups.len());
        self.groups.push(group);
        debug_assert_eq!(self.index.len(), self.groups.len());
        true
    }
}

/// Thread-safe registry of discovered groups.
///
/// Clone shares the same underlying registry. One instance is created per
/// session and handed to every consumer.
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    tx: Arc<watch::Sender<Arc<GroupSnapshot>>>,
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { tx: Arc::new(watch::Sender::new(Arc::new(GroupSnapshot::default()))) }
    }

    /// Record a group advertisement.
    ///
    /// Inserts iff no group with the same id exists and publishes the new
    /// snapshot. Returns `false` (and publishes nothing) for a known id.
    pub fn add_group(&self, group: GroupInfo) -> bool {
        let id = group.id().clone();
        let inserted = self.tx.send_if_modified(|snapshot| {
            if snapshot.contains(group.id()) {
                return false;
            }
            Arc::make_mut(snapshot).insert(group)
        });

        if inserted {
            tracing::debug!(group_id = %id, "group discovered");
        } else {
            tracing::trace!(group_id = %id, "ignoring advertisement for known group");
        }
        inserted
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<GroupSnapshot> {
        self.tx.borrow().clone()
    }

    /// All groups in discovery order.
    pub fn all_groups(&self) -> Vec<GroupInfo> {
        self.snapshot().iter().cloned().collect()
    }

    /// Groups partitioned by region, discovery order within each region.
    pub fn groups_by_region(&self) -> BTreeMap<String, Vec<GroupInfo>> {
        self.snapshot().by_region()
    }

    /// Group by id. `None` if unknown.
    pub fn get(&self, id: &GroupId) -> Option<GroupInfo> {
        self.snapshot().get(id).cloned()
    }

    /// Whether a group with this id has been discovered.
    pub fn contains(&self, id: &GroupId) -> bool {
        self.tx.borrow().contains(id)
    }

    /// Number of discovered groups.
    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    /// Whether no group has been discovered.
    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Subscribe to registry snapshots. The current snapshot is delivered
    /// first.
    pub fn subscribe(&self) -> Subscription<GroupSnapshot> {
        Subscription::new(self.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, name: &str, region: &str) -> GroupInfo {
        GroupInfo::new(id, name, region, "creator", 1_700_000_000_000)
    }

    #[test]
    fn first_seen_wins() {
        let registry = GroupRegistry::new();

        assert!(registry.add_group(group("g1", "first", "eu")));
        assert!(!registry.add_group(group("g1", "second", "us")));

        assert_eq!(registry.len(), 1);
        let stored = registry.get(&GroupId::from("g1")).unwrap();
        assert_eq!(stored.name(), "first");
        assert_eq!(stored.region(), "eu");
    }

    #[test]
    fn discovery_order_is_preserved() {
        let registry = GroupRegistry::new();
        for id in ["c", "a", "b"] {
            registry.add_group(group(id, id, "eu"));
        }

        let ids: Vec<_> = registry.all_groups().iter().map(|g| g.id().to_string()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
        assert_eq!(registry.all_groups(), registry.all_groups());
    }

    #[test]
    fn by_region_buckets() {
        let registry = GroupRegistry::new();
        registry.add_group(group("1", "one", "eu"));
        registry.add_group(group("2", "two", "us"));
        registry.add_group(group("3", "three", "eu"));

        let buckets = registry.groups_by_region();
        assert_eq!(buckets.len(), 2);

        let eu: Vec<_> = buckets["eu"].iter().map(GroupInfo::name).collect();
        assert_eq!(eu, ["one", "three"]);
        assert_eq!(buckets["us"].len(), 1);
    }

    #[test]
    fn snapshots_are_copy_on_write() {
        let registry = GroupRegistry::new();
        registry.add_group(group("1", "one", "eu"));

        let before = registry.snapshot();
        registry.add_group(group("2", "two", "eu"));

        assert_eq!(before.len(), 1);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn duplicate_does_not_publish() {
        let registry = GroupRegistry::new();
        let mut sub = registry.subscribe();
        assert!(sub.try_next().is_some_and(|s| s.is_empty()));

        registry.add_group(group("1", "one", "eu"));
        assert_eq!(sub.try_next().map(|s| s.len()), Some(1));

        registry.add_group(group("1", "again", "eu"));
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn clone_shares_state() {
        let registry = GroupRegistry::new();
        let handle = registry.clone();

        handle.add_group(group("1", "one", "eu"));
        assert!(registry.contains(&GroupId::from("1")));
        assert_eq!(registry.snapshot().to_map().len(), 1);
    }
}
