//! Direct NFA simulation (no backtracking).
//!
//! The simulation tracks the epsilon-closed set of live nodes. Matching is
//! anchored at both ends of the input: the [`BEGIN_SENTINEL`] is offered once
//! before the first character and the [`END_SENTINEL`] once after the last,
//! which is how `^` and `$` edges get crossed.

use super::nfa::NfaGraph;
use super::{ascii_input, NodeId, BEGIN_SENTINEL, END_SENTINEL};
use crate::error::MatchError;

/// A run of an [`NfaGraph`] over one input.
#[derive(Debug, Clone)]
pub struct Simulation<'g> {
    graph: &'g NfaGraph,
    /// Epsilon-closed, sorted.
    live: Vec<NodeId>,
}

impl<'g> Simulation<'g> {
    /// Start a run: the start node's closure, plus whatever the begin
    /// sentinel reaches from it.
    pub fn new(graph: &'g NfaGraph) -> Self {
        let initial = graph.epsilon_closure([graph.start()]);
        let begun = graph.advance(&initial, BEGIN_SENTINEL);
        let live = graph.epsilon_closure(initial.into_iter().chain(begun));
        Self { graph, live }
    }

    /// The nodes the run may currently be in.
    pub fn live_states(&self) -> &[NodeId] {
        &self.live
    }

    /// Consume `c`. Returns `false` once no node is live; the run can then
    /// never accept.
    pub fn step(&mut self, c: u8) -> bool {
        let next = self.graph.advance(&self.live, c);
        self.live = self.graph.epsilon_closure(next);
        !self.live.is_empty()
    }

    /// Whether the input consumed so far is accepted, allowing one final
    /// crossing of an end anchor.
    pub fn is_accepting(&self) -> bool {
        let accept = self.graph.accept();
        if self.live.binary_search(&accept).is_ok() {
            return true;
        }
        let ended = self.graph.advance(&self.live, END_SENTINEL);
        !ended.is_empty()
            && self
                .graph
                .epsilon_closure(ended)
                .binary_search(&accept)
                .is_ok()
    }

    /// Run the whole of `input` and report whether the graph accepts it.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::CharacterOutOfRange`] if `input` holds a
    /// character outside the ASCII alphabet.
    pub fn test(mut self, input: &str) -> Result<bool, MatchError> {
        for &c in ascii_input(input)? {
            if !self.step(c) {
                return Ok(false);
            }
        }
        Ok(self.is_accepting())
    }
}
