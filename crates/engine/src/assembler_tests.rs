// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pt_core::test_support::{strategies, tree_with_edges};
use pt_core::{NodeInfo, Tombstone};
use proptest::prelude::*;

#[test]
fn no_input_yields_empty_tree() {
    assert_eq!(assemble(std::iter::empty()), ItemTree::default());
}

#[test]
fn single_tree_passes_through() {
    let tree = tree_with_edges(&[("a", "b"), ("b", "c")]);
    assert_eq!(assemble([tree.clone()]), tree);
}

#[test]
fn merge_deduplicates_shared_entries() {
    let left = tree_with_edges(&[("a", "b"), ("b", "c")]);
    let right = tree_with_edges(&[("b", "c"), ("c", "d")]);

    let merged = assemble([left, right]);

    assert_eq!(merged.relationships.len(), 3);
    assert_eq!(merged.items.len(), 4);
}

#[test]
fn merge_keeps_first_occurrence_order() {
    let left = tree_with_edges(&[("a", "b")]);
    let right = tree_with_edges(&[("c", "d"), ("a", "b")]);

    let merged = assemble([left, right]);

    let order: Vec<_> = merged.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(order, ["a", "b", "c", "d"]);
}

#[test]
fn distinct_name_variants_are_both_kept() {
    // Same node id reported with and without a name is two distinct entries
    let named = ItemTree {
        items: vec![NodeInfo { id: "a".into(), name: Some("gearbox".into()) }],
        ..ItemTree::default()
    };
    let unnamed = ItemTree { items: vec![NodeInfo::new("a")], ..ItemTree::default() };

    let merged = assemble([named, unnamed]);
    assert_eq!(merged.items.len(), 2);
}

#[test]
fn tombstones_are_carried_and_deduplicated() {
    let stone = Tombstone::new("b", "https://provider-b", "timeout", "no answer in 30s", 1_000);
    let left = ItemTree { tombstones: vec![stone.clone()], ..ItemTree::default() };
    let right = ItemTree { tombstones: vec![stone.clone()], ..ItemTree::default() };

    let merged = assemble([left, right]);
    assert_eq!(merged.tombstones, vec![stone]);
}

#[test]
fn empty_tree_is_merge_identity() {
    let tree = tree_with_edges(&[("a", "b")]);
    assert_eq!(assemble([ItemTree::default(), tree.clone()]), tree);
    assert_eq!(assemble([tree.clone(), ItemTree::default()]), tree);
}

proptest! {
    #[test]
    fn assembling_twice_changes_nothing(trees in proptest::collection::vec(strategies::arb_item_tree(), 0..5)) {
        let once = assemble(trees);
        let twice = assemble([once.clone()]);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merging_a_tree_with_itself_changes_nothing(tree in strategies::arb_item_tree()) {
        let merged = assemble([tree.clone(), tree.clone()]);
        prop_assert_eq!(merged, assemble([tree]));
    }
}
