//! Thompson NFA graphs and the combinators that build them.
//!
//! A graph is an arena of [`NfaNode`]s with a designated start and accept
//! node. Every node carries the label of its outgoing edges and either one
//! consuming edge or up to two epsilon edges, so a node is the label plus a
//! short target list. The accept node has no label and no edges.
//!
//! Combinators mutate the receiving graph in place and absorb the graphs they
//! are given. Absorbing remaps the other graph's node ids into the receiver's
//! arena, so graphs never share nodes and [`NfaGraph::copy`] is a plain clone.
//!
//! ```text
//!   concat(a, b):   a.start ··· a.accept=b.start ··· b.accept
//!
//!   union(a, b):         ε─> a ─ε
//!                 start ─┤       ├─> accept
//!                        ε─> b ─ε
//!
//!   closure(a):   start ─ε─> a.start ··· a.accept ─ε─> accept
//!                   │            ^──────ε─────┘         ^
//!                   └────────────────ε──────────────────┘
//! ```

use smallvec::SmallVec;

use super::label::Label;
use super::NodeId;
use crate::error::BuildError;

/// A vertex of an NFA graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfaNode {
    /// Label shared by all outgoing edges; `None` until the first edge is routed.
    label: Option<Label>,
    targets: SmallVec<[NodeId; 2]>,
}

impl NfaNode {
    fn new() -> Self {
        Self {
            label: None,
            targets: SmallVec::new(),
        }
    }

    pub fn label(&self) -> Option<Label> {
        self.label
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// A node with no outgoing edge is the accepting node of its graph.
    pub fn is_accepting(&self) -> bool {
        self.label.is_none()
    }
}

/// An edge of an NFA graph, as seen by read-only traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NfaEdge {
    pub from: NodeId,
    pub label: Label,
    pub to: NodeId,
}

/// A Thompson NFA: an arena of nodes with one start and one accept node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfaGraph {
    nodes: Vec<NfaNode>,
    start: NodeId,
    accept: NodeId,
}

impl Default for NfaGraph {
    fn default() -> Self {
        Self::empty()
    }
}

impl NfaGraph {
    /// The graph accepting only the empty string: a single node that is both
    /// start and accept.
    pub fn empty() -> Self {
        Self {
            nodes: vec![NfaNode::new()],
            start: 0,
            accept: 0,
        }
    }

    /// `start -label-> accept`.
    pub fn from_label(label: Label) -> Result<Self, BuildError> {
        let mut graph = Self::empty();
        graph.append(label)?;
        Ok(graph)
    }

    /// Union of one single-edge graph per label.
    pub fn union_all(labels: &[Label]) -> Result<Self, BuildError> {
        let mut labels = labels.iter();
        let Some(&first) = labels.next() else {
            return Ok(Self::empty());
        };
        let mut graph = Self::from_label(first)?;
        for &label in labels {
            graph.union(Self::from_label(label)?)?;
        }
        Ok(graph)
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn accept(&self) -> NodeId {
        self.accept
    }

    /// Whether this graph is the single-node empty graph.
    pub fn is_empty(&self) -> bool {
        self.start == self.accept
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &NfaNode {
        &self.nodes[id as usize]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NfaNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(id, node)| (id as NodeId, node))
    }

    pub fn edges(&self) -> impl Iterator<Item = NfaEdge> + '_ {
        self.nodes().flat_map(|(from, node)| {
            node.label.into_iter().flat_map(move |label| {
                node.targets
                    .iter()
                    .map(move |&to| NfaEdge { from, label, to })
            })
        })
    }

    /// Deep copy. Ids are arena-local, so the copy shares nothing with `self`.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    // ===== Structural primitives =====

    fn add_node(&mut self) -> NodeId {
        self.nodes.push(NfaNode::new());
        (self.nodes.len() - 1) as NodeId
    }

    /// Add the edge `from -label-> to`, enforcing the node shape.
    fn route(&mut self, from: NodeId, label: Label, to: NodeId) -> Result<(), BuildError> {
        let node = &mut self.nodes[from as usize];
        match node.label {
            None => node.label = Some(label),
            Some(existing) if existing != label => {
                return Err(BuildError::ConflictingLabel {
                    node: from,
                    existing,
                    label,
                });
            }
            Some(_) => {}
        }
        if label.is_epsilon() && node.targets.len() >= 2 {
            return Err(BuildError::EpsilonEdgesFull { node: from });
        }
        if !label.is_epsilon() && !node.targets.is_empty() {
            return Err(BuildError::SymbolEdgeTaken { node: from });
        }
        node.targets.push(to);
        Ok(())
    }

    /// Move `other`'s nodes into this arena and return the new ids of its
    /// start and accept. With `fuse_into`, `other`'s start node is dropped
    /// and its edges are routed from `fuse_into` instead.
    fn absorb(
        &mut self,
        other: Self,
        fuse_into: Option<NodeId>,
    ) -> Result<(NodeId, NodeId), BuildError> {
        let mut remap = Vec::with_capacity(other.nodes.len());
        let mut next = self.nodes.len() as NodeId;
        for id in 0..other.nodes.len() as NodeId {
            match fuse_into {
                Some(host) if id == other.start => remap.push(host),
                _ => {
                    remap.push(next);
                    next += 1;
                }
            }
        }

        self.nodes.reserve(other.nodes.len());
        for (id, node) in other.nodes.into_iter().enumerate() {
            let targets = node.targets.iter().map(|&t| remap[t as usize]);
            if fuse_into.is_some() && id as NodeId == other.start {
                if let Some(label) = node.label {
                    for target in targets {
                        self.route(remap[id], label, target)?;
                    }
                }
            } else {
                self.nodes.push(NfaNode {
                    label: node.label,
                    targets: targets.collect(),
                });
            }
        }

        Ok((remap[other.start as usize], remap[other.accept as usize]))
    }

    // ===== Combinators =====

    /// Append one consuming edge after the accept node.
    pub fn append(&mut self, label: Label) -> Result<(), BuildError> {
        let accept = self.add_node();
        self.route(self.accept, label, accept)?;
        self.accept = accept;
        Ok(())
    }

    /// Sequence `other` after `self`.
    pub fn concat(&mut self, other: Self) -> Result<(), BuildError> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = other;
            return Ok(());
        }
        let (_, accept) = self.absorb(other, Some(self.accept))?;
        self.accept = accept;
        Ok(())
    }

    /// Accept what either `self` or `other` accepts.
    pub fn union(&mut self, other: Self) -> Result<(), BuildError> {
        let (other_start, other_accept) = self.absorb(other, None)?;
        let start = self.add_node();
        let accept = self.add_node();
        self.route(start, Label::Epsilon, self.start)?;
        self.route(start, Label::Epsilon, other_start)?;
        self.route(self.accept, Label::Epsilon, accept)?;
        self.route(other_accept, Label::Epsilon, accept)?;
        self.start = start;
        self.accept = accept;
        Ok(())
    }

    /// Zero or more repetitions (Kleene star).
    pub fn closure(&mut self) -> Result<(), BuildError> {
        let start = self.add_node();
        let accept = self.add_node();
        self.route(start, Label::Epsilon, self.start)?;
        self.route(start, Label::Epsilon, accept)?;
        self.route(self.accept, Label::Epsilon, accept)?;
        self.route(self.accept, Label::Epsilon, self.start)?;
        self.start = start;
        self.accept = accept;
        Ok(())
    }

    /// Zero or one occurrence.
    pub fn exists(&mut self) -> Result<(), BuildError> {
        let start = self.add_node();
        let accept = self.add_node();
        self.route(start, Label::Epsilon, self.start)?;
        self.route(start, Label::Epsilon, accept)?;
        self.route(self.accept, Label::Epsilon, accept)?;
        self.start = start;
        self.accept = accept;
        Ok(())
    }

    /// One or more repetitions: `self` followed by the closure of a copy.
    pub fn one_or_more(&mut self) -> Result<(), BuildError> {
        let mut tail = self.copy();
        tail.closure()?;
        self.concat(tail)
    }

    /// Between `min` and `max` repetitions. Callers guarantee `min <= max`.
    pub fn repeat(&mut self, min: u32, max: u32) -> Result<(), BuildError> {
        let mut tail = Vec::new();
        for _ in 1..min {
            tail.push(self.copy());
        }
        for _ in min..max {
            let mut optional = self.copy();
            optional.exists()?;
            tail.push(optional);
        }

        if min == 0 {
            *self = Self::empty();
        }
        for graph in tail {
            self.concat(graph)?;
        }
        Ok(())
    }

    // ===== Traversal =====

    /// All nodes reachable from `seeds` over epsilon edges, seeds included,
    /// sorted and deduplicated.
    pub fn epsilon_closure<I>(&self, seeds: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut visited = vec![false; self.nodes.len()];
        let mut closure = Vec::new();
        let mut stack = Vec::new();

        for seed in seeds {
            if !visited[seed as usize] {
                visited[seed as usize] = true;
                closure.push(seed);
                stack.push(seed);
            }
        }

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            if node.label != Some(Label::Epsilon) {
                continue;
            }
            for &target in &node.targets {
                if !visited[target as usize] {
                    visited[target as usize] = true;
                    closure.push(target);
                    stack.push(target);
                }
            }
        }

        closure.sort_unstable();
        closure
    }

    /// Successors of the nodes in `states` whose consuming label matches `c`.
    /// The result is not epsilon-closed.
    pub fn advance(&self, states: &[NodeId], c: u8) -> Vec<NodeId> {
        let mut next: Vec<NodeId> = states
            .iter()
            .map(|&id| &self.nodes[id as usize])
            .filter(|node| node.label.is_some_and(|label| label.matches(c)))
            .flat_map(|node| node.targets.iter().copied())
            .collect();
        next.sort_unstable();
        next.dedup();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Whole-string acceptance by closure-and-advance, without anchors.
    fn accepts(graph: &NfaGraph, input: &str) -> bool {
        let mut live = graph.epsilon_closure([graph.start()]);
        for &c in input.as_bytes() {
            live = graph.epsilon_closure(graph.advance(&live, c));
        }
        live.contains(&graph.accept())
    }

    fn lit(c: u8) -> NfaGraph {
        NfaGraph::from_label(Label::Single(c)).unwrap()
    }

    fn word(s: &str) -> NfaGraph {
        let mut graph = NfaGraph::empty();
        for &c in s.as_bytes() {
            graph.concat(lit(c)).unwrap();
        }
        graph
    }

    // ══════════════════════════════════════════════════════════════════════
    // Node shape
    // ══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_empty_graph_accepts_only_empty_string() {
        let graph = NfaGraph::empty();
        assert!(graph.is_empty());
        assert!(accepts(&graph, ""));
        assert!(!accepts(&graph, "a"));
        assert_eq!(graph.edges().count(), 0);
    }

    #[test]
    fn test_route_rejects_second_symbol_edge() {
        let mut graph = lit(b'a');
        let extra = graph.add_node();
        let err = graph
            .route(graph.start(), Label::Single(b'a'), extra)
            .unwrap_err();
        assert_eq!(err, BuildError::SymbolEdgeTaken { node: 0 });
    }

    #[test]
    fn test_route_rejects_third_epsilon_edge() {
        let mut graph = NfaGraph::empty();
        let a = graph.add_node();
        let b = graph.add_node();
        let c = graph.add_node();
        graph.route(0, Label::Epsilon, a).unwrap();
        graph.route(0, Label::Epsilon, b).unwrap();
        let err = graph.route(0, Label::Epsilon, c).unwrap_err();
        assert_eq!(err, BuildError::EpsilonEdgesFull { node: 0 });
    }

    #[test]
    fn test_route_rejects_conflicting_label() {
        let mut graph = NfaGraph::empty();
        let a = graph.add_node();
        graph.route(0, Label::Epsilon, a).unwrap();
        let err = graph.route(0, Label::Single(b'x'), a).unwrap_err();
        assert!(matches!(err, BuildError::ConflictingLabel { node: 0, .. }));
    }

    // ══════════════════════════════════════════════════════════════════════
    // Combinators
    // ══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_concat() {
        let graph = word("abc");
        assert!(accepts(&graph, "abc"));
        assert!(!accepts(&graph, "ab"));
        assert!(!accepts(&graph, "abcd"));
        // start, three fused interior nodes, no leftover start nodes
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edges().count(), 3);
    }

    #[test]
    fn test_concat_with_empty_is_identity() {
        let mut graph = word("ab");
        let before = graph.clone();
        graph.concat(NfaGraph::empty()).unwrap();
        assert_eq!(graph, before);

        let mut empty = NfaGraph::empty();
        empty.concat(before.clone()).unwrap();
        assert_eq!(empty, before);
    }

    #[test]
    fn test_union() {
        let mut graph = word("ab");
        graph.union(word("cd")).unwrap();
        assert!(accepts(&graph, "ab"));
        assert!(accepts(&graph, "cd"));
        assert!(!accepts(&graph, "ad"));
        assert!(!accepts(&graph, ""));
    }

    #[test]
    fn test_union_with_empty_makes_optional() {
        let mut graph = lit(b'a');
        graph.union(NfaGraph::empty()).unwrap();
        assert!(accepts(&graph, ""));
        assert!(accepts(&graph, "a"));
        assert!(!accepts(&graph, "aa"));
    }

    #[test]
    fn test_closure() {
        let mut graph = word("ab");
        graph.closure().unwrap();
        for input in ["", "ab", "abab", "ababab"] {
            assert!(accepts(&graph, input), "{input:?}");
        }
        for input in ["a", "aba", "ba"] {
            assert!(!accepts(&graph, input), "{input:?}");
        }
    }

    #[test]
    fn test_closure_of_empty_graph() {
        let mut graph = NfaGraph::empty();
        graph.closure().unwrap();
        assert!(accepts(&graph, ""));
        assert!(!accepts(&graph, "a"));
    }

    #[test]
    fn test_exists() {
        let mut graph = lit(b'a');
        graph.exists().unwrap();
        assert!(accepts(&graph, ""));
        assert!(accepts(&graph, "a"));
        assert!(!accepts(&graph, "aa"));
    }

    #[test]
    fn test_one_or_more() {
        let mut graph = lit(b'a');
        graph.one_or_more().unwrap();
        assert!(!accepts(&graph, ""));
        assert!(accepts(&graph, "a"));
        assert!(accepts(&graph, "aaaa"));
    }

    #[test]
    fn test_repeat_bounded() {
        let mut graph = lit(b'a');
        graph.repeat(2, 4).unwrap();
        for n in 0..7 {
            let input = "a".repeat(n);
            assert_eq!(accepts(&graph, &input), (2..=4).contains(&n), "{n}");
        }
    }

    #[test]
    fn test_repeat_exact_and_zero() {
        let mut exact = lit(b'a');
        exact.repeat(3, 3).unwrap();
        let mut optional = lit(b'a');
        optional.repeat(0, 2).unwrap();
        let mut zero = lit(b'a');
        zero.repeat(0, 0).unwrap();
        assert!(zero.is_empty());
        for n in 0..6 {
            let input = "a".repeat(n);
            assert_eq!(accepts(&exact, &input), n == 3);
            assert_eq!(accepts(&optional, &input), n <= 2);
            assert_eq!(accepts(&zero, &input), n == 0);
        }
    }

    #[test]
    fn test_union_all() {
        let graph =
            NfaGraph::union_all(&[Label::Single(b'x'), Label::range(b'0', b'9' + 1)]).unwrap();
        assert!(accepts(&graph, "x"));
        assert!(accepts(&graph, "7"));
        assert!(!accepts(&graph, "y"));
    }

    #[test]
    fn test_copy_is_independent() {
        let original = word("ab");
        let mut copy = original.copy();
        copy.closure().unwrap();
        assert!(!accepts(&original, ""));
        assert!(accepts(&copy, ""));
    }

    // ══════════════════════════════════════════════════════════════════════
    // Traversal
    // ══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_epsilon_closure_handles_cycles() {
        let mut graph = NfaGraph::empty();
        graph.closure().unwrap();
        graph.closure().unwrap();
        let closure = graph.epsilon_closure([graph.start()]);
        assert_eq!(closure.len(), graph.node_count());
        let mut sorted = closure.clone();
        sorted.dedup();
        assert_eq!(closure, sorted);
    }

    #[test]
    fn test_epsilon_closure_stops_at_symbol_edges() {
        let mut graph = lit(b'a');
        graph.exists().unwrap();
        let closure = graph.epsilon_closure([graph.start()]);
        // new start, old start, new accept; not the node after `a`
        assert_eq!(closure.len(), 3);
        assert!(closure.contains(&graph.accept()));
    }

    #[test]
    fn test_edges_lists_every_target() {
        let mut graph = lit(b'a');
        graph.closure().unwrap();
        let epsilon = graph.edges().filter(|e| e.label.is_epsilon()).count();
        let symbol = graph.edges().filter(|e| !e.label.is_epsilon()).count();
        assert_eq!((epsilon, symbol), (4, 1));
    }
}
