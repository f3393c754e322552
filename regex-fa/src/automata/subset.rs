//! Subset construction: NFA → DFA conversion.
//!
//! Implements the powerset construction with a per-state alphabet partition:
//! 1. The epsilon-closure of the NFA start node is the DFA start state.
//! 2. For each DFA state, the consuming labels of its members are cut into
//!    disjoint pieces ([`alphabet_partition`]).
//! 3. Each piece leads to the epsilon-closure of the successors of every
//!    member whose label matches the piece.
//! 4. Destination sets are looked up by their sorted node ids; unseen sets
//!    become new states and go on the work-list.
//!
//! This eliminates all epsilon transitions. Begin/end anchors have no
//! character to consume and are dropped, so a pattern whose matches depend on
//! crossing an anchor has no DFA counterpart.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::dfa::Dfa;
use super::label::Label;
use super::nfa::NfaGraph;
use super::partition::alphabet_partition;
use super::{NodeId, StateId};
use crate::error::ConvertError;

/// Convert an NFA to a DFA using subset construction.
///
/// # Errors
///
/// Returns [`ConvertError`] if an edge would overlap another edge of the same
/// state, which a correct partition never produces.
pub fn subset_construction(nfa: &NfaGraph) -> Result<Dfa, ConvertError> {
    let mut dfa = Dfa::default();
    let mut state_map: FxHashMap<Vec<NodeId>, StateId> = FxHashMap::default();
    let mut worklist: Vec<(StateId, Vec<NodeId>)> = Vec::new();

    let start_set = nfa.epsilon_closure([nfa.start()]);
    let start = dfa.add_state(start_set.clone(), is_terminal(nfa, &start_set));
    dfa.set_start(start);
    state_map.insert(start_set.clone(), start);
    worklist.push((start, start_set));

    while let Some((current, members)) = worklist.pop() {
        for piece in alphabet_partition(nfa, &members) {
            let label = Label::from_range(piece);
            let Some(c) = label.representative() else {
                continue;
            };
            let target_set = nfa.epsilon_closure(nfa.advance(&members, c));

            let target = match state_map.get(&target_set) {
                Some(&existing) => existing,
                None => {
                    let terminal = is_terminal(nfa, &target_set);
                    let id = dfa.add_state(target_set.clone(), terminal);
                    trace!(state = id, nodes = ?target_set, terminal, "discovered DFA state");
                    state_map.insert(target_set.clone(), id);
                    worklist.push((id, target_set));
                    id
                }
            };

            dfa.add_edge(current, target, label)?;
        }
    }

    debug!(
        nodes = nfa.node_count(),
        states = dfa.states().len(),
        edges = dfa.edges().len(),
        "subset construction complete"
    );
    Ok(dfa)
}

/// A DFA state accepts iff one of its NFA members is the accepting node.
fn is_terminal(nfa: &NfaGraph, members: &[NodeId]) -> bool {
    members.iter().any(|&id| nfa.node(id).is_accepting())
}
