//! Tests for the group registry under concurrent discovery.
//!
//! These tests verify:
//! - Concurrent advertisements for one id leave exactly one entry
//! - The entry is one of the submitted advertisements, never a merge
//! - Arbitrary advertisement sequences keep ids unique and regions partitioned

use std::{collections::HashSet, thread};

use bitmesh_core::{GroupId, GroupInfo, GroupRegistry};
use proptest::prelude::*;

const RACERS: usize = 128;

/// INVARIANT: N concurrent `add_group` calls for one id insert exactly once.
#[test]
fn concurrent_same_id_inserts_once() {
    let registry = GroupRegistry::new();

    let inserted: Vec<bool> = thread::scope(|scope| {
        let handles: Vec<_> = (0..RACERS)
            .map(|i| {
                let registry = registry.clone();
                scope.spawn(move || {
                    registry.add_group(GroupInfo::new(
                        "contested",
                        format!("name-{i}"),
                        format!("region-{}", i % 4),
                        format!("peer-{i}"),
                        i as u64,
                    ))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(inserted.iter().filter(|&&won| won).count(), 1, "exactly one racer wins");
    assert_eq!(registry.len(), 1);

    // The stored entry is exactly one racer's advertisement.
    let stored = registry.get(&GroupId::from("contested")).unwrap();
    let winner = stored.created_at_ms();
    assert_eq!(stored.name(), format!("name-{winner}"));
    assert_eq!(stored.region(), format!("region-{}", winner % 4));
    assert_eq!(stored.creator().as_str(), format!("peer-{winner}"));
}

/// INVARIANT: concurrent distinct ids are all kept.
#[test]
fn concurrent_distinct_ids_all_kept() {
    let registry = GroupRegistry::new();

    thread::scope(|scope| {
        for i in 0..RACERS {
            let registry = registry.clone();
            scope.spawn(move || {
                assert!(registry.add_group(GroupInfo::new(format!("g{i}"), "n", "eu", "p", 0)));
            });
        }
    });

    assert_eq!(registry.len(), RACERS);
    let ids: HashSet<_> = registry.all_groups().iter().map(|g| g.id().clone()).collect();
    assert_eq!(ids.len(), RACERS);
}

/// Published snapshots only ever grow while writers race.
#[test]
fn snapshots_grow_monotonically_under_contention() {
    let registry = GroupRegistry::new();
    let mut sub = registry.subscribe();

    thread::scope(|scope| {
        for t in 0..8 {
            let registry = registry.clone();
            scope.spawn(move || {
                for i in 0..32 {
                    let id = format!("g{}", (t * 7 + i) % 64);
                    registry.add_group(GroupInfo::new(id, "n", "eu", "p", 0));
                }
            });
        }

        let mut last = 0;
        while last < 64 {
            if let Some(snapshot) = sub.try_next() {
                assert!(snapshot.len() >= last, "snapshot shrank");
                last = snapshot.len();
            } else {
                thread::yield_now();
            }
        }
    });

    assert_eq!(registry.len(), 64);
}

fn advert_strategy() -> impl Strategy<Value = (u8, String, String)> {
    (0u8..16, "[a-z]{1,6}", prop_oneof!["eu", "us", "apac", ""].prop_map(String::from))
}

proptest! {
    #[test]
    fn ids_unique_and_first_seen_kept(adverts in prop::collection::vec(advert_strategy(), 0..64)) {
        let registry = GroupRegistry::new();
        let mut first_seen = std::collections::HashMap::new();

        for (id, name, region) in &adverts {
            let id = format!("g{id}");
            let group = GroupInfo::new(id.as_str(), name.as_str(), region.as_str(), "p", 0);
            let inserted = registry.add_group(group);
            prop_assert_eq!(inserted, !first_seen.contains_key(&id));
            first_seen.entry(id).or_insert((name.clone(), region.clone()));
        }

        let groups = registry.all_groups();
        prop_assert_eq!(groups.len(), first_seen.len());
        for group in &groups {
            let (name, region) = &first_seen[group.id().as_str()];
            prop_assert_eq!(group.name(), name.as_str());
            prop_assert_eq!(group.region(), region.as_str());
        }
    }

    #[test]
    fn regions_partition_all_groups(adverts in prop::collection::vec(advert_strategy(), 0..64)) {
        let registry = GroupRegistry::new();
        for (id, name, region) in &adverts {
            let group = GroupInfo::new(format!("g{id}"), name.as_str(), region.as_str(), "p", 0);
            registry.add_group(group);
        }

        let buckets = registry.groups_by_region();
        let total: usize = buckets.values().map(Vec::len).sum();
        prop_assert_eq!(total, registry.len());
        for (region, groups) in &buckets {
            prop_assert!(!groups.is_empty());
            prop_assert!(groups.iter().all(|g| g.region() == region));
        }
    }
}
