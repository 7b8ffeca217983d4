// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Merge of partial item trees into one assembled tree.

use indexmap::IndexSet;
use pt_core::ItemTree;

/// Merge partial trees, deduplicating entries by full equality while
/// keeping first-occurrence order. No input yields `ItemTree::default()`.
pub fn assemble<I>(partials: I) -> ItemTree
where
    I: IntoIterator<Item = ItemTree>,
{
    let mut items = IndexSet::new();
    let mut relationships = IndexSet::new();
    let mut tombstones = IndexSet::new();

    for partial in partials {
        items.extend(partial.items);
        relationships.extend(partial.relationships);
        tombstones.extend(partial.tombstones);
    }

    ItemTree {
        items: items.into_iter().collect(),
        relationships: relationships.into_iter().collect(),
        tombstones: tombstones.into_iter().collect(),
    }
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
