//! Template evaluation against a state snapshot.
//!
//! Elements are processed left to right. Each element re-seeds the focus from
//! its source, walks its navigation steps, then either reads properties or,
//! when it has none, emits an edge indicator relative to the previous focus.
//!
//! ```text
//! "s0s1"   s0 ──▶ focus A (no props, nothing emitted, prev = A)
//!          s1 ──▶ focus B (no props) ──▶ "1" if A is a parent of B
//! "s0wb0t" s0 ──▶ head(s0).text, prev reset
//!          b0 ──▶ head(b0).pos_tag
//! ```
//!
//! Any failed step skips the whole feature ([`Evaluation::Skipped`]); only
//! requests that make no sense for the source are errors ([`EvalError`]).

use thiserror::Error;

use super::compiler::{FeatureTemplate, FeatureTemplateElement, Navigation, Property, Source};
use super::gaps::{gap_length_sum, gap_type};
use super::separator::separator_punctuation;
use super::snapshot::Snapshot;
use crate::graph::{Action, NodeId};

/// Template defect detected during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Unknown {origin:?} property: {code}")]
    UnknownProperty { origin: Source, code: char },
    #[error("Navigation '{op}' is not defined for actions")]
    ActionNavigation { op: char },
}

/// Why a feature has no value for a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The element index is past the end of its source.
    OutOfRange { source: Source, index: usize },
    /// `p` on a node without incoming edges.
    NoParent,
    /// `l`, `r` or `u` on a node without outgoing edges.
    NoChildren,
    /// `u` on a node with several children.
    AmbiguousOnlyChild,
    /// A property could not be resolved.
    Undefined(Property),
}

/// Result of evaluating one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Present(Vec<String>),
    Skipped(SkipReason),
}

impl Evaluation {
    pub fn into_values(self) -> Option<Vec<String>> {
        match self {
            Evaluation::Present(values) => Some(values),
            Evaluation::Skipped(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Focus<'s> {
    Node(NodeId),
    Action(&'s Action),
}

pub(crate) fn calc_feature(template: &FeatureTemplate, snapshot: &Snapshot<'_, '_>) -> Result<Evaluation, EvalError> {
    let mut values = Vec::new();
    let mut prev: Option<Focus<'_>> = None;

    for element in template.elements() {
        let Some(focus) = select(element, snapshot) else {
            return Ok(Evaluation::Skipped(SkipReason::OutOfRange {
                source: element.source(),
                index: element.index(),
            }));
        };
        let focus = match navigate(element, snapshot, focus)? {
            Ok(focus) => focus,
            Err(reason) => return Ok(Evaluation::Skipped(reason)),
        };

        if element.properties().is_empty() {
            if let Some(prev) = prev {
                values.push(if is_parent_of(snapshot, prev, focus) { "1" } else { "0" }.to_string());
            }
            prev = Some(focus);
            continue;
        }

        prev = None;
        for &prop in element.properties() {
            let value = match focus {
                Focus::Action(action) => action_prop(action, prop)?,
                Focus::Node(node) => node_prop(snapshot, node, prop, None),
            };
            let Some(value) = value else {
                return Ok(Evaluation::Skipped(SkipReason::Undefined(prop)));
            };
            values.push(value);
        }
    }

    Ok(Evaluation::Present(values))
}

fn select<'s>(element: &FeatureTemplateElement, snapshot: &Snapshot<'s, '_>) -> Option<Focus<'s>> {
    let state = snapshot.state;
    let index = element.index();
    match element.source() {
        Source::Stack => state.stack.iter().rev().nth(index).copied().map(Focus::Node),
        Source::Buffer => state.buffer.get(index).copied().map(Focus::Node),
        Source::Actions => state.actions.iter().rev().nth(index).map(Focus::Action),
    }
}

fn navigate<'s>(
    element: &FeatureTemplateElement,
    snapshot: &Snapshot<'_, '_>,
    focus: Focus<'s>,
) -> Result<Result<Focus<'s>, SkipReason>, EvalError> {
    let graph = snapshot.graph();
    let mut node = match focus {
        Focus::Node(node) => node,
        Focus::Action(_) => {
            return match element.navigation().first() {
                Some(op) => Err(EvalError::ActionNavigation { op: op.code() }),
                None => Ok(Ok(focus)),
            };
        }
    };

    for &op in element.navigation() {
        if op == Navigation::Parent {
            match graph.parents(node).next() {
                Some(parent) => node = parent,
                None => return Ok(Err(SkipReason::NoParent)),
            }
            continue;
        }
        let outgoing = graph.node(node).outgoing();
        match (outgoing, op) {
            ([], _) => return Ok(Err(SkipReason::NoChildren)),
            // A single child is only entered through `u`; `l` and `r` leave the focus in place.
            ([only], Navigation::OnlyChild) => node = graph.edge(*only).child,
            ([_], _) => {}
            ([first, ..], Navigation::LeftmostChild) => node = graph.edge(*first).child,
            ([.., last], Navigation::RightmostChild) => node = graph.edge(*last).child,
            _ => return Ok(Err(SkipReason::AmbiguousOnlyChild)),
        }
    }
    Ok(Ok(Focus::Node(node)))
}

/// Whether `prev` is one of `focus`'s parents. Actions are never related to
/// anything.
fn is_parent_of(snapshot: &Snapshot<'_, '_>, prev: Focus<'_>, focus: Focus<'_>) -> bool {
    match (prev, focus) {
        (Focus::Node(prev), Focus::Node(node)) => snapshot.graph().parents(node).any(|p| p == prev),
        _ => false,
    }
}

fn action_prop(action: &Action, prop: Property) -> Result<Option<String>, EvalError> {
    match prop {
        Property::Text => Ok(Some(action.action_type.clone())),
        Property::EdgeTag => Ok(action.tag.clone()),
        _ => Err(EvalError::UnknownProperty { origin: Source::Actions, code: prop.code() }),
    }
}

fn separator_prop(snapshot: &Snapshot<'_, '_>, prop: Property) -> Option<String> {
    let punctuation = separator_punctuation(snapshot)?;
    match (prop, punctuation.as_slice()) {
        (Property::SeparatorCount, all) => Some(all.len().to_string()),
        (Property::Separator, [only]) => snapshot.graph().node(*only).text().map(str::to_string),
        _ => None,
    }
}

/// Resolve a node property. `prev`, when given, selects the incoming edge
/// from that node for `e`.
///
/// Template evaluation always passes `None`: the previous focus is cleared
/// before an element's properties are read.
pub(crate) fn node_prop(
    snapshot: &Snapshot<'_, '_>,
    node: NodeId,
    prop: Property,
    prev: Option<NodeId>,
) -> Option<String> {
    let graph = snapshot.graph();
    let data = graph.node(node);
    match prop {
        Property::Text => graph.node(snapshot.head(node)?).text().map(str::to_string),
        Property::PosTag => graph.node(snapshot.head(node)?).pos_tag().map(str::to_string),
        Property::EdgeTag => data
            .incoming()
            .iter()
            .map(|&id| graph.edge(id))
            .find(|edge| prev.is_none_or(|p| edge.parent == p))
            .map(|edge| edge.tag.clone()),
        Property::GapType => Some(gap_type(snapshot, node).code().to_string()),
        Property::GapLengthSum => Some(gap_length_sum(snapshot, node).to_string()),
        Property::ParentCount => Some(data.incoming().len().to_string()),
        Property::ChildCount => Some(data.outgoing().len().to_string()),
        Property::ImplicitCount => {
            Some(graph.children(node).filter(|&c| graph.node(c).implicit()).count().to_string())
        }
        Property::RemoteCount => {
            Some(data.outgoing().iter().filter(|&&id| graph.edge(id).remote).count().to_string())
        }
        Property::Separator | Property::SeparatorCount => separator_prop(snapshot, prop),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edge_tags::*;
    use crate::graph::{Graph, State};

    fn eval(descriptor: &str, state: &State<'_>) -> Result<Evaluation, EvalError> {
        let template = FeatureTemplate::parse(descriptor).unwrap();
        calc_feature(&template, &Snapshot::new(state, true))
    }

    fn values(descriptor: &str, state: &State<'_>) -> Option<Vec<String>> {
        eval(descriptor, state).unwrap().into_values()
    }

    /// "John and Mary" with a unit U over all three (C, N, C) and P over U.
    fn coordination() -> (Graph, [NodeId; 5]) {
        let mut g = Graph::new();
        let john = g.add_terminal("John", "NNP");
        let and = g.add_terminal("and", "CC");
        let mary = g.add_terminal("Mary", "NNP");
        let unit = g.add_node();
        g.add_edge(unit, john, CENTER);
        g.add_edge(unit, and, CONNECTOR);
        g.add_edge(unit, mary, CENTER);
        let top = g.add_node();
        g.add_edge(top, unit, PARTICIPANT);
        (g, [john, and, mary, unit, top])
    }

    #[test]
    fn stack_index_boundary() {
        let (g, [john, and, ..]) = coordination();
        let mut state = State::new(&g);
        state.stack = vec![john, and];
        assert_eq!(values("s1w", &state), Some(vec!["John".to_string()]));
        assert_eq!(values("s0w", &state), Some(vec!["and".to_string()]));
        assert_eq!(
            eval("s2w", &state).unwrap(),
            Evaluation::Skipped(SkipReason::OutOfRange { source: Source::Stack, index: 2 })
        );
    }

    #[test]
    fn largest_index_is_out_of_range() {
        let (g, [john, and, mary, ..]) = coordination();
        let mut state = State::new(&g);
        state.stack = vec![john, and];
        state.buffer = vec![mary];
        state.actions = vec![Action::new("SHIFT", None)];
        for (source, code) in [(Source::Stack, 's'), (Source::Buffer, 'b'), (Source::Actions, 'a')] {
            assert_eq!(
                eval(&format!("{code}{}w", usize::MAX), &state).unwrap(),
                Evaluation::Skipped(SkipReason::OutOfRange { source, index: usize::MAX })
            );
        }
    }

    #[test]
    fn buffer_reads_from_front() {
        let (g, _) = coordination();
        let state = State::initial(&g);
        assert_eq!(values("b0wt", &state), Some(vec!["John".into(), "NNP".into()]));
        assert_eq!(values("b2w", &state), Some(vec!["Mary".into()]));
        assert_eq!(values("b3w", &state), None);
    }

    #[test]
    fn navigation_children() {
        let (g, [john, _, _, unit, top]) = coordination();
        let mut state = State::new(&g);
        state.stack = vec![top, unit];
        assert_eq!(values("s0lw", &state), Some(vec!["John".into()]));
        assert_eq!(values("s0rw", &state), Some(vec!["Mary".into()]));
        assert_eq!(eval("s0uw", &state).unwrap(), Evaluation::Skipped(SkipReason::AmbiguousOnlyChild));
        // top has exactly one child: `u` enters it, `l`/`r` stay on top.
        assert_eq!(values("s1ue", &state), Some(vec![PARTICIPANT.into()]));
        assert_eq!(values("s1lP", &state), Some(vec!["0".into()]));
        assert_eq!(values("s1rC", &state), Some(vec!["1".into()]));
        state.stack = vec![john];
        assert_eq!(eval("s0lw", &state).unwrap(), Evaluation::Skipped(SkipReason::NoChildren));
    }

    #[test]
    fn parent_follows_first_incoming_edge() {
        let (mut g, [john, ..]) = coordination();
        let other = g.add_node();
        g.add_remote(other, john, PARTICIPANT);
        let mut state = State::new(&g);
        state.stack = vec![john];
        // First incoming edge is the primary C edge from the coordination unit.
        assert_eq!(values("s0pC", &state), Some(vec!["3".into()]));
        assert_eq!(values("s0pP", &state), Some(vec!["1".into()]));
        assert_eq!(values("s0ppw", &state), Some(vec!["John".into()]));
        assert_eq!(eval("s0pppw", &state).unwrap(), Evaluation::Skipped(SkipReason::NoParent));
    }

    #[test]
    fn indicator_between_consecutive_bare_elements() {
        let (g, [john, _, _, unit, top]) = coordination();
        let mut state = State::new(&g);
        state.stack = vec![john, unit, top];
        // s0 = top, s1 = unit: top is a parent of unit.
        assert_eq!(values("s0s1", &state), Some(vec!["1".into()]));
        assert_eq!(values("s1s0", &state), Some(vec!["0".into()]));
        assert_eq!(values("s1s2", &state), Some(vec!["1".into()]));
        assert_eq!(values("s0s1s2", &state), Some(vec!["1".into(), "1".into()]));
        // A single bare element emits nothing.
        assert_eq!(values("s0", &state), Some(vec![]));
    }

    #[test]
    fn properties_reset_indicator_chain() {
        let (g, [john, _, _, unit, top]) = coordination();
        let mut state = State::new(&g);
        state.stack = vec![john, unit, top];
        assert_eq!(values("s0s1ws2", &state), Some(vec!["John".into()]));
        assert_eq!(values("s0ws1s2", &state), Some(vec!["John".into(), "1".into()]));
    }

    #[test]
    fn counts_and_edge_tag() {
        let mut g = Graph::new();
        let t = g.add_terminal("it", "PRP");
        let implicit = g.add_implicit();
        let unit = g.add_node();
        g.add_edge(unit, t, CENTER);
        g.add_edge(unit, implicit, PARTICIPANT);
        let elsewhere = g.add_node();
        g.add_remote(unit, elsewhere, ADVERBIAL);
        let mut state = State::new(&g);
        state.stack = vec![unit, t];

        assert_eq!(values("s1CIRP", &state), Some(vec!["3".into(), "1".into(), "1".into(), "0".into()]));
        assert_eq!(values("s0eP", &state), Some(vec![CENTER.into(), "1".into()]));
        assert_eq!(eval("s1e", &state).unwrap(), Evaluation::Skipped(SkipReason::Undefined(Property::EdgeTag)));
    }

    #[test]
    fn edge_tag_from_given_parent() {
        let mut g = Graph::new();
        let t = g.add_terminal("x", "X");
        let a = g.add_node();
        let b = g.add_node();
        g.add_edge(a, t, CENTER);
        g.add_remote(b, t, PARTICIPANT);
        let state = State::new(&g);
        let snap = Snapshot::new(&state, false);
        assert_eq!(node_prop(&snap, t, Property::EdgeTag, None), Some(CENTER.to_string()));
        assert_eq!(node_prop(&snap, t, Property::EdgeTag, Some(b)), Some(PARTICIPANT.to_string()));
        assert_eq!(node_prop(&snap, t, Property::EdgeTag, Some(t)), None);
    }

    #[test]
    fn action_properties() {
        let (g, _) = coordination();
        let mut state = State::new(&g);
        state.actions = vec![Action::new("SHIFT", None), Action::new("NODE", Some(CENTER))];
        assert_eq!(values("a0we", &state), Some(vec!["NODE".into(), CENTER.into()]));
        assert_eq!(values("a1w", &state), Some(vec!["SHIFT".into()]));
        assert_eq!(eval("a1e", &state).unwrap(), Evaluation::Skipped(SkipReason::Undefined(Property::EdgeTag)));
        assert_eq!(values("a2w", &state), None);
    }

    #[test]
    fn unsupported_action_requests_are_errors() {
        let (g, _) = coordination();
        let mut state = State::new(&g);
        state.actions = vec![Action::new("SHIFT", None)];
        assert_eq!(eval("a0t", &state), Err(EvalError::UnknownProperty { origin: Source::Actions, code: 't' }));
        assert_eq!(eval("a0wq", &state), Err(EvalError::UnknownProperty { origin: Source::Actions, code: 'q' }));
        assert_eq!(eval("a0lw", &state), Err(EvalError::ActionNavigation { op: 'l' }));
        // Out of range is still a skip, even for a template that would error.
        assert_eq!(values("a1t", &state), None);
    }

    #[test]
    fn action_indicators_are_zero() {
        let (g, [john, ..]) = coordination();
        let mut state = State::new(&g);
        state.stack = vec![john];
        state.actions = vec![Action::new("SHIFT", None)];
        assert_eq!(values("a0s0", &state), Some(vec!["0".into()]));
        assert_eq!(values("s0a0", &state), Some(vec!["0".into()]));
    }

    #[test]
    fn head_properties_skip_when_unresolvable() {
        let mut g = Graph::new();
        let implicit = g.add_implicit();
        let unit = g.add_node();
        g.add_edge(unit, implicit, PARTICIPANT);
        let mut state = State::new(&g);
        state.stack = vec![unit];
        assert_eq!(eval("s0w", &state).unwrap(), Evaluation::Skipped(SkipReason::Undefined(Property::Text)));
        // Partial values are not emitted.
        assert_eq!(values("s0Cw", &state), None);
        assert_eq!(values("s0C", &state), Some(vec!["1".into()]));
    }

    #[test]
    fn gap_properties() {
        let mut g = Graph::new();
        let t: Vec<NodeId> = ["a", "b", "c", "d"].iter().map(|w| g.add_terminal(w, "X")).collect();
        let a = g.add_node();
        g.add_edge(a, t[0], CENTER);
        g.add_edge(a, t[2], ELABORATOR);
        let mut state = State::new(&g);
        state.stack = vec![t[1], a];
        assert_eq!(values("s0xy", &state), Some(vec!["p".into(), "1".into()]));
        assert_eq!(values("s1xy", &state), Some(vec!["n".into(), "0".into()]));
    }
}
