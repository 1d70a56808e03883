//! Punctuation between the two topmost stack entries.
//!
//! ```text
//! stack: [.., s1, s0]        head(s1) = t2, head(s0) = t5
//! terminals: t2  t3  t4  t5  ──▶ scan t3, t4 for punctuation
//! ```

use super::snapshot::Snapshot;
use crate::graph::NodeId;

/// Punctuation terminals strictly between the heads of the two topmost stack
/// entries, in sentence order.
///
/// `None` when the stack holds fewer than two entries or either head is
/// unresolvable.
pub(crate) fn separator_punctuation(snapshot: &Snapshot<'_, '_>) -> Option<Vec<NodeId>> {
    let stack = &snapshot.state.stack;
    if stack.len() < 2 {
        return None;
    }
    let graph = snapshot.graph();
    let first = graph.node(snapshot.head(stack[stack.len() - 1])?).index()?;
    let second = graph.node(snapshot.head(stack[stack.len() - 2])?).index()?;
    let (start, end) = if first <= second { (first, second) } else { (second, first) };

    let between = snapshot.state.terminals().get(start + 1..end).unwrap_or(&[]);
    Some(between.iter().copied().filter(|&t| graph.node(t).is_punctuation()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edge_tags::*;
    use crate::graph::{Graph, State};

    fn sentence(punct: &[bool]) -> Graph {
        let mut g = Graph::new();
        for (i, &is_punct) in punct.iter().enumerate() {
            if is_punct {
                g.add_punctuation(",", ",");
            } else {
                g.add_terminal(&format!("w{i}"), "NN");
            }
        }
        g
    }

    #[test]
    fn needs_two_stack_entries() {
        let g = sentence(&[false, true, false]);
        let mut state = State::new(&g);
        state.stack.push(g.terminals()[0]);
        assert_eq!(separator_punctuation(&Snapshot::new(&state, false)), None);
    }

    #[test]
    fn scans_strictly_between_heads_regardless_of_stack_order() {
        let g = sentence(&[false, false, false, true, false, false]);
        let t = g.terminals();
        let mut state = State::new(&g);
        state.stack = vec![t[5], t[2]];
        let snap = Snapshot::new(&state, false);
        assert_eq!(separator_punctuation(&snap), Some(vec![t[3]]));

        state.stack = vec![t[2], t[5]];
        let snap = Snapshot::new(&state, false);
        assert_eq!(separator_punctuation(&snap), Some(vec![t[3]]));
    }

    #[test]
    fn adjacent_or_identical_heads_have_nothing_between() {
        let g = sentence(&[false, false]);
        let t = g.terminals();
        let mut state = State::new(&g);
        state.stack = vec![t[0], t[1]];
        assert_eq!(separator_punctuation(&Snapshot::new(&state, false)), Some(vec![]));
        state.stack = vec![t[1], t[1]];
        assert_eq!(separator_punctuation(&Snapshot::new(&state, false)), Some(vec![]));
    }

    #[test]
    fn unresolvable_head_is_undefined() {
        let mut g = sentence(&[false, true, false]);
        let empty = g.add_node();
        let unit = g.add_node();
        let t2 = g.terminals()[2];
        g.add_edge(unit, t2, CENTER);
        let mut state = State::new(&g);
        state.stack = vec![unit, empty];
        assert_eq!(separator_punctuation(&Snapshot::new(&state, true)), None);
    }
}
