//! Read-only parser state snapshot.
//!
//! The annotation graph is stored as an arena: nodes and edges live in two
//! vectors and refer to each other through [`NodeId`] / [`EdgeId`]. The
//! transition system owns the graph and the [`State`] sequences; the feature
//! engine only ever borrows them.
//!
//! ```text
//!            Edge { tag: "A", parent, child, remote }
//!   Node ─────────────────────────────────────────────▶ Node
//!    │ outgoing: [EdgeId, ..]              incoming: [EdgeId, ..]
//!    └ text / pos_tag / index only for terminals
//! ```

/// Edge labels of the foundational annotation layer.
pub mod edge_tags {
    pub const CENTER: &str = "C";
    pub const CONNECTOR: &str = "N";
    pub const PARALLEL_SCENE: &str = "H";
    pub const PROCESS: &str = "P";
    pub const STATE: &str = "S";
    pub const PARTICIPANT: &str = "A";
    pub const ADVERBIAL: &str = "D";
    pub const TIME: &str = "T";
    pub const ELABORATOR: &str = "E";
    pub const RELATOR: &str = "R";
    pub const FUNCTION: &str = "F";
    pub const LINKER: &str = "L";
    pub const LINK_RELATION: &str = "LR";
    pub const LINK_ARGUMENT: &str = "LA";
    pub const GROUND: &str = "G";
    pub const TERMINAL: &str = "Terminal";
    pub const PUNCTUATION: &str = "U";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

/// Node category. Only terminals are `Word` or `Punctuation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTag {
    Word,
    Punctuation,
    Foundational,
}

#[derive(Debug, Clone)]
pub struct Node {
    text: Option<String>,
    pos_tag: Option<String>,
    tag: NodeTag,
    outgoing: Vec<EdgeId>,
    incoming: Vec<EdgeId>,
    implicit: bool,
    index: Option<usize>,
}

impl Node {
    /// Surface text; present only for terminals.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn pos_tag(&self) -> Option<&str> {
        self.pos_tag.as_deref()
    }

    pub fn tag(&self) -> NodeTag {
        self.tag
    }

    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    pub fn implicit(&self) -> bool {
        self.implicit
    }

    /// Sentence position; present only for terminals.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_terminal(&self) -> bool {
        self.text.is_some()
    }

    pub fn is_punctuation(&self) -> bool {
        self.tag == NodeTag::Punctuation
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub tag: String,
    pub parent: NodeId,
    pub child: NodeId,
    /// Secondary relation; ignored by structural navigation.
    pub remote: bool,
}

/// Annotation graph arena.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    terminals: Vec<NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a word terminal at the next sentence position.
    pub fn add_terminal(&mut self, text: &str, pos_tag: &str) -> NodeId {
        self.push_terminal(text, pos_tag, NodeTag::Word)
    }

    /// Append a punctuation terminal at the next sentence position.
    pub fn add_punctuation(&mut self, text: &str, pos_tag: &str) -> NodeId {
        self.push_terminal(text, pos_tag, NodeTag::Punctuation)
    }

    /// Add a non-terminal node.
    pub fn add_node(&mut self) -> NodeId {
        self.push_node(false)
    }

    /// Add a non-terminal with no surface realisation.
    pub fn add_implicit(&mut self) -> NodeId {
        self.push_node(true)
    }

    /// Add a primary edge.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId, tag: &str) -> EdgeId {
        self.push_edge(parent, child, tag, false)
    }

    /// Add a remote (secondary) edge.
    pub fn add_remote(&mut self, parent: NodeId, child: NodeId, tag: &str) -> EdgeId {
        self.push_edge(parent, child, tag, true)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// All terminals ordered by sentence position.
    pub fn terminals(&self) -> &[NodeId] {
        &self.terminals
    }

    /// Children in outgoing-edge order, remote edges included.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).outgoing.iter().map(|&e| self.edge(e).child)
    }

    /// Parents in incoming-edge order, remote edges included.
    pub fn parents(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).incoming.iter().map(|&e| self.edge(e).parent)
    }

    fn push_terminal(&mut self, text: &str, pos_tag: &str, tag: NodeTag) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            text: Some(text.to_string()),
            pos_tag: Some(pos_tag.to_string()),
            tag,
            outgoing: Vec::new(),
            incoming: Vec::new(),
            implicit: false,
            index: Some(self.terminals.len()),
        });
        self.terminals.push(id);
        id
    }

    fn push_node(&mut self, implicit: bool) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            text: None,
            pos_tag: None,
            tag: NodeTag::Foundational,
            outgoing: Vec::new(),
            incoming: Vec::new(),
            implicit,
            index: None,
        });
        id
    }

    fn push_edge(&mut self, parent: NodeId, child: NodeId, tag: &str, remote: bool) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge { tag: tag.to_string(), parent, child, remote });
        self.nodes[parent.0].outgoing.push(id);
        self.nodes[child.0].incoming.push(id);
        id
    }
}

/// A past transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub action_type: String,
    pub tag: Option<String>,
}

impl Action {
    pub fn new(action_type: &str, tag: Option<&str>) -> Self {
        Self { action_type: action_type.to_string(), tag: tag.map(str::to_string) }
    }
}

/// Parser state snapshot over a borrowed graph.
///
/// `stack` is read from the end (last = top), `buffer` from the front,
/// `actions` from the end (last = most recent).
#[derive(Debug, Clone)]
pub struct State<'g> {
    graph: &'g Graph,
    pub stack: Vec<NodeId>,
    pub buffer: Vec<NodeId>,
    pub actions: Vec<Action>,
}

impl<'g> State<'g> {
    /// Empty stack, buffer and history.
    pub fn new(graph: &'g Graph) -> Self {
        State { graph, stack: Vec::new(), buffer: Vec::new(), actions: Vec::new() }
    }

    /// Initial configuration: every terminal in the buffer.
    pub fn initial(graph: &'g Graph) -> Self {
        State { graph, stack: Vec::new(), buffer: graph.terminals().to_vec(), actions: Vec::new() }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn terminals(&self) -> &'g [NodeId] {
        self.graph.terminals()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminals_are_indexed_in_insertion_order() {
        let mut g = Graph::new();
        let a = g.add_terminal("Hello", "UH");
        let comma = g.add_punctuation(",", ",");
        let b = g.add_terminal("world", "NN");

        assert_eq!(g.terminals(), &[a, comma, b]);
        assert_eq!(g.node(a).index(), Some(0));
        assert_eq!(g.node(b).index(), Some(2));
        assert!(g.node(comma).is_punctuation());
        assert!(!g.node(a).is_punctuation());
    }

    #[test]
    fn edges_are_registered_on_both_ends() {
        let mut g = Graph::new();
        let t = g.add_terminal("run", "VB");
        let p = g.add_node();
        let r = g.add_node();
        g.add_edge(p, t, edge_tags::TERMINAL);
        g.add_remote(r, t, edge_tags::PARTICIPANT);

        assert_eq!(g.children(p).collect::<Vec<_>>(), vec![t]);
        assert_eq!(g.parents(t).collect::<Vec<_>>(), vec![p, r]);
        assert!(g.edge(g.node(t).incoming()[1]).remote);
        assert!(!g.node(p).is_terminal());
        assert_eq!(g.node(p).index(), None);
    }

    #[test]
    fn initial_state_fills_buffer_with_terminals() {
        let mut g = Graph::new();
        g.add_terminal("a", "DT");
        g.add_terminal("b", "NN");
        let state = State::initial(&g);

        assert!(state.stack.is_empty());
        assert_eq!(state.buffer, g.terminals().to_vec());
        assert_eq!(state.terminals().len(), 2);
    }
}
