//! DFA graph produced by subset construction.
//!
//! Each state remembers the sorted set of NFA nodes it stands for and keeps
//! its outgoing edges in an [`IntervalIndex`] keyed by the edge's character
//! range. Edge ranges of one state never overlap, so a transition lookup is
//! a single overlap query.

use super::interval::IntervalIndex;
use super::label::{CharRange, Label};
use super::{ascii_input, EdgeId, NodeId, StateId, ASCII_END};
use crate::error::{ConvertError, MatchError};

/// A DFA state.
#[derive(Debug, Clone)]
pub struct DfaState {
    nfa_nodes: Vec<NodeId>,
    terminal: bool,
    edges: IntervalIndex<EdgeId>,
}

impl DfaState {
    /// The epsilon-closed NFA node set this state represents.
    pub fn nfa_nodes(&self) -> &[NodeId] {
        &self.nfa_nodes
    }

    /// Whether reaching this state at the end of input accepts.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Ids of the outgoing edges, in ascending character order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().map(|(_, _, &edge)| edge)
    }
}

/// A DFA edge. The label is always [`Label::Single`] or [`Label::Range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfaEdge {
    pub from: StateId,
    pub to: StateId,
    pub label: Label,
}

/// Deterministic automaton over the ASCII alphabet.
#[derive(Debug, Clone, Default)]
pub struct Dfa {
    states: Vec<DfaState>,
    edges: Vec<DfaEdge>,
    start: StateId,
}

impl Dfa {
    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> &DfaState {
        &self.states[id as usize]
    }

    pub fn edges(&self) -> &[DfaEdge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> &DfaEdge {
        &self.edges[id as usize]
    }

    /// Outgoing edges of `state`, in ascending character order.
    pub fn outgoing(&self, state: StateId) -> impl Iterator<Item = &DfaEdge> + '_ {
        self.state(state).edge_ids().map(|id| self.edge(id))
    }

    /// The state reached from `state` on `c`, if any.
    pub fn step(&self, state: StateId, c: u8) -> Option<StateId> {
        if c >= ASCII_END {
            return None;
        }
        let edges = &self.state(state).edges;
        let hit = edges
            .find_intersecting(CharRange::single(c))
            .into_iter()
            .next()?;
        edges.get(hit).map(|&edge| self.edge(edge).to)
    }

    /// Whole-string acceptance of `input`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::CharacterOutOfRange`] if `input` holds a
    /// character outside the ASCII alphabet.
    pub fn accepts(&self, input: &str) -> Result<bool, MatchError> {
        let mut state = self.start;
        for &c in ascii_input(input)? {
            match self.step(state, c) {
                Some(next) => state = next,
                None => return Ok(false),
            }
        }
        Ok(self.state(state).terminal)
    }

    pub(crate) fn add_state(&mut self, nfa_nodes: Vec<NodeId>, terminal: bool) -> StateId {
        self.states.push(DfaState {
            nfa_nodes,
            terminal,
            edges: IntervalIndex::new(),
        });
        (self.states.len() - 1) as StateId
    }

    pub(crate) fn set_start(&mut self, start: StateId) {
        self.start = start;
    }

    /// Add `from -label-> to`, refusing labels that overlap an existing edge
    /// of `from`.
    pub(crate) fn add_edge(
        &mut self,
        from: StateId,
        to: StateId,
        label: Label,
    ) -> Result<EdgeId, ConvertError> {
        let Some(range) = label.interval() else {
            return Err(ConvertError::NonConsumingEdge { state: from, label });
        };
        let id = self.edges.len() as EdgeId;
        let table = &mut self.states[from as usize].edges;
        if let Some(&clash) = table.find_intersecting(range).first() {
            let existing = table
                .get(clash)
                .map_or(label, |&edge| self.edges[edge as usize].label);
            return Err(ConvertError::OverlappingEdge {
                state: from,
                label,
                existing,
            });
        }
        table.insert(range, id);
        self.edges.push(DfaEdge { from, to, label });
        Ok(id)
    }
}
