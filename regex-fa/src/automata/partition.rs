//! Alphabet partitioning for one DFA state.
//!
//! The consuming labels of a state's NFA members may overlap (`[a-k]` next
//! to `c`). Subset construction needs disjoint edges, so the labels' ranges
//! are cut into the coarsest set of pieces such that every label is exactly
//! a union of pieces. All characters of a piece then lead to the same
//! destination set, and the piece's lowest character stands for all of it.

use super::interval::IntervalIndex;
use super::label::CharRange;
use super::nfa::NfaGraph;
use super::NodeId;

/// Disjoint pieces, in ascending order, covering the consuming labels of
/// `members`. Epsilon and anchor labels do not take part.
pub fn alphabet_partition(nfa: &NfaGraph, members: &[NodeId]) -> Vec<CharRange> {
    let mut candidates: Vec<CharRange> = members
        .iter()
        .filter_map(|&id| nfa.node(id).label())
        .filter_map(|label| label.interval())
        .collect();
    candidates.sort_unstable();
    candidates.dedup();
    IntervalIndex::partition(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::regex::compile_pattern;

    fn start_partition(pattern: &str) -> Vec<CharRange> {
        let nfa = compile_pattern(pattern).unwrap();
        let start = nfa.epsilon_closure([nfa.start()]);
        alphabet_partition(&nfa, &start)
    }

    #[test]
    fn test_overlapping_labels_are_split() {
        assert_eq!(
            start_partition("abc|[a-k]*c"),
            vec![
                CharRange::new(b'a', b'b'),
                CharRange::new(b'b', b'c'),
                CharRange::new(b'c', b'd'),
                CharRange::new(b'd', b'k'),
            ]
        );
    }

    #[test]
    fn test_duplicate_labels_collapse() {
        assert_eq!(start_partition("ab|ac|ad"), vec![CharRange::single(b'a')]);
    }

    #[test]
    fn test_anchors_and_epsilon_are_ignored() {
        assert!(start_partition("^").is_empty());
        assert!(start_partition("").is_empty());
        assert_eq!(start_partition("$|x"), vec![CharRange::single(b'x')]);
    }
}
