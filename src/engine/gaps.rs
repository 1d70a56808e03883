//! Discontinuity ("gap") statistics over terminal yields.
//!
//! ```text
//! terminals:  0   1   2   3
//! node A:     ●       ●        yield [0, 2] -> gap lengths [1] -> type p, sum 1
//! ```

use super::snapshot::Snapshot;
use crate::graph::NodeId;

/// Gap classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapType {
    /// Terminal, or no discontinuity at or directly below the node.
    None,
    /// The node's own yield is discontiguous.
    Pass,
    /// The node is contiguous but a non-terminal child is not.
    Source,
}

impl GapType {
    pub fn code(self) -> &'static str {
        match self {
            GapType::None => "n",
            GapType::Pass => "p",
            GapType::Source => "s",
        }
    }
}

fn gap_lengths(indices: &[usize]) -> impl Iterator<Item = usize> + '_ {
    indices.windows(2).map(|w| w[1] - w[0] - 1)
}

pub(crate) fn has_gaps(snapshot: &Snapshot<'_, '_>, node: NodeId) -> bool {
    gap_lengths(&snapshot.yield_indices(node)).any(|len| len > 0)
}

pub(crate) fn gap_length_sum(snapshot: &Snapshot<'_, '_>, node: NodeId) -> usize {
    gap_lengths(&snapshot.yield_indices(node)).sum()
}

pub(crate) fn gap_type(snapshot: &Snapshot<'_, '_>, node: NodeId) -> GapType {
    let graph = snapshot.graph();
    if graph.node(node).is_terminal() {
        return GapType::None;
    }
    if has_gaps(snapshot, node) {
        return GapType::Pass;
    }
    if graph.children(node).any(|child| !graph.node(child).is_terminal() && has_gaps(snapshot, child)) {
        return GapType::Source;
    }
    GapType::None
}
