//! Per-state view with optional memoization of derived node properties.
//!
//! Head resolution and terminal yields are the expensive part of evaluation
//! and the same nodes are inspected by many templates in one classifier
//! decision. A `Snapshot` is created for one state, optionally caches those
//! results, and is dropped with it: caches never outlive the state they were
//! computed from.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::head::head_terminal;
use crate::graph::{Graph, NodeId, State};

#[derive(Debug, Default)]
struct DerivedCache {
    heads: RefCell<HashMap<NodeId, Option<NodeId>>>,
    yields: RefCell<HashMap<NodeId, Rc<[usize]>>>,
}

#[derive(Debug)]
pub(crate) struct Snapshot<'s, 'g> {
    pub state: &'s State<'g>,
    cache: Option<DerivedCache>,
}

impl<'s, 'g> Snapshot<'s, 'g> {
    pub fn new(state: &'s State<'g>, memoize: bool) -> Self {
        Snapshot { state, cache: memoize.then(DerivedCache::default) }
    }

    pub fn is_memoized(&self) -> bool {
        self.cache.is_some()
    }

    pub fn graph(&self) -> &'g Graph {
        self.state.graph()
    }

    pub fn head(&self, node: NodeId) -> Option<NodeId> {
        let Some(cache) = &self.cache else {
            return head_terminal(self.graph(), node);
        };
        let cached = cache.heads.borrow().get(&node).copied();
        if let Some(head) = cached {
            return head;
        }
        let head = head_terminal(self.graph(), node);
        cache.heads.borrow_mut().insert(node, head);
        head
    }

    /// Indices of the terminals under `node` through primary edges, sorted
    /// and deduplicated. A terminal yields itself; an implicit node nothing.
    pub fn yield_indices(&self, node: NodeId) -> Rc<[usize]> {
        if let Some(cache) = &self.cache {
            let cached = cache.yields.borrow().get(&node).cloned();
            if let Some(indices) = cached {
                return indices;
            }
        }

        let graph = self.graph();
        let indices: Rc<[usize]> = match graph.node(node).index() {
            Some(index) if graph.node(node).is_terminal() => Rc::from([index]),
            _ => {
                let mut all: Vec<usize> = Vec::new();
                for &edge_id in graph.node(node).outgoing() {
                    let edge = graph.edge(edge_id);
                    if !edge.remote {
                        all.extend(self.yield_indices(edge.child).iter());
                    }
                }
                all.sort_unstable();
                all.dedup();
                Rc::from(all)
            }
        };

        if let Some(cache) = &self.cache {
            cache.yields.borrow_mut().insert(node, Rc::clone(&indices));
        }
        indices
    }
}
