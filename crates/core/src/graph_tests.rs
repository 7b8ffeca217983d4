// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn node_id_display() {
    let id = NodeId::new("bosch#brake-1");
    assert_eq!(id.to_string(), "bosch#brake-1");
}

#[test]
fn relationship_equality_covers_metadata() {
    let plain = Relationship::new("a", "b");
    let mut tagged = Relationship::new("a", "b");
    tagged.lifecycle_context = Some("asBuilt".to_string());

    assert_eq!(plain, Relationship::new("a", "b"));
    assert_ne!(plain, tagged);
}

#[test]
fn empty_tree_is_identity_shaped() {
    let tree = ItemTree::default();
    assert!(tree.is_empty());
    assert_eq!(tree.child_ids().count(), 0);
}

#[test]
fn child_ids_follow_relationship_order() {
    let tree = ItemTree {
        relationships: vec![Relationship::new("r", "x"), Relationship::new("x", "y")],
        ..ItemTree::default()
    };
    let children: Vec<&str> = tree.child_ids().map(NodeId::as_str).collect();
    assert_eq!(children, ["x", "y"]);
}

#[test]
fn tree_serde_round_trip() {
    let tree = ItemTree {
        items: vec![NodeInfo::new("a")],
        relationships: vec![Relationship::new("a", "b")],
        tombstones: vec![Tombstone::new("b", "https://prov", "BlobStoreError", "gone", 7)],
    };

    let json = serde_json::to_string(&tree).unwrap();
    let parsed: ItemTree = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, tree);
}

#[test]
fn tombstones_omitted_when_empty() {
    let tree = ItemTree {
        items: vec![NodeInfo::new("a")],
        ..ItemTree::default()
    };
    let json = serde_json::to_string(&tree).unwrap();
    assert!(!json.contains("tombstones"));
}
