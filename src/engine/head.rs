//! Lexical-head resolution.
//!
//! A non-terminal is represented by one of its terminals, found by walking
//! down the primary edges and always taking the edge whose tag ranks highest
//! in [`EDGE_PRIORITY`].
//!
//! ```text
//!          H
//!        ┌─┴──┐
//!        A    P        P ranks above A  ──▶ descend into P
//!        │    │
//!      "John" "ran"    head("H") = "ran"
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::graph::edge_tags::*;
use crate::graph::{Graph, NodeId};

/// Edge tags in descending priority (rank 0 first).
const PRIORITY_ORDER: [&str; 17] = [
    CENTER,
    CONNECTOR,
    PARALLEL_SCENE,
    PROCESS,
    STATE,
    PARTICIPANT,
    ADVERBIAL,
    TIME,
    ELABORATOR,
    RELATOR,
    FUNCTION,
    LINKER,
    LINK_RELATION,
    LINK_ARGUMENT,
    GROUND,
    TERMINAL,
    PUNCTUATION,
];

static EDGE_PRIORITY: Lazy<HashMap<&'static str, usize>> =
    Lazy::new(|| PRIORITY_ORDER.iter().enumerate().map(|(rank, tag)| (*tag, rank)).collect());

/// Rank of `tag` in the head-selection order; lower wins.
///
/// Unlisted tags get rank 0 and therefore tie with `Center`.
pub fn edge_priority(tag: &str) -> usize {
    EDGE_PRIORITY.get(tag).copied().unwrap_or(0)
}

/// Head terminal of `node`, or `None` when the descent reaches a non-terminal
/// whose only children are remote or implicit.
///
/// Ties keep the earliest outgoing edge.
pub(crate) fn head_terminal(graph: &Graph, mut node: NodeId) -> Option<NodeId> {
    while !graph.node(node).is_terminal() {
        let edge = graph
            .node(node)
            .outgoing()
            .iter()
            .map(|&id| graph.edge(id))
            .filter(|edge| !edge.remote && !graph.node(edge.child).implicit())
            .min_by_key(|edge| edge_priority(&edge.tag))?;
        node = edge.child;
    }
    Some(node)
}
