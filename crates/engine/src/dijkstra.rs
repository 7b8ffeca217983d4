// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shortest-path over the item graph's directed unit-weight edges.

use pt_core::{NodeId, Relationship};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Length of the shortest directed path from `source` to `target`, or
/// `None` if `target` is unreachable. `source == target` is distance 0.
pub fn shortest_path_length(
    edges: &[Relationship],
    source: &NodeId,
    target: &NodeId,
) -> Option<u32> {
    if source == target {
        return Some(0);
    }

    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for edge in edges {
        adjacency.entry(&edge.parent).or_default().push(&edge.child);
    }

    let mut distance: HashMap<&NodeId, u32> = HashMap::new();
    let mut frontier = BinaryHeap::new();
    distance.insert(source, 0);
    frontier.push(Reverse((0u32, source)));

    while let Some(Reverse((dist, node))) = frontier.pop() {
        if node == target {
            return Some(dist);
        }
        // Stale heap entry superseded by a shorter path
        if dist > distance.get(node).copied().unwrap_or(u32::MAX) {
            continue;
        }
        for &next in adjacency.get(node).into_iter().flatten() {
            let candidate = dist + 1;
            if candidate < distance.get(next).copied().unwrap_or(u32::MAX) {
                distance.insert(next, candidate);
                frontier.push(Reverse((candidate, next)));
            }
        }
    }

    None
}

#[cfg(test)]
#[path = "dijkstra_tests.rs"]
mod tests;
