//! Automata infrastructure for pattern matching over the ASCII alphabet.
//!
//! Provides the label model, the interval index used for character sets and
//! DFA edge tables, Thompson NFA graphs, and the two ways of running them:
//! `Pattern -> NFA -> { Simulation | Subset construction -> DFA }`

pub mod dfa;
pub mod interval;
pub mod label;
pub mod nfa;
pub mod partition;
pub mod regex;
pub mod simulate;
pub mod subset;

use crate::error::MatchError;

/// Identifier for a node inside one NFA graph's arena.
pub type NodeId = u32;

/// Identifier for a DFA state.
pub type StateId = u32;

/// Identifier for a DFA edge.
pub type EdgeId = u32;

/// One past the largest code point of the pattern alphabet.
pub const ASCII_END: u8 = 0x80;

/// Pseudo-character fed once to the simulator before the first real character.
pub const BEGIN_SENTINEL: u8 = 0x81;

/// Pseudo-character fed once to the simulator after the last real character.
pub const END_SENTINEL: u8 = 0x82;

/// Check that every character of `input` lies inside the pattern alphabet and
/// return the input as bytes.
pub(crate) fn ascii_input(input: &str) -> Result<&[u8], MatchError> {
    match input.char_indices().find(|(_, ch)| !ch.is_ascii()) {
        Some((position, ch)) => Err(MatchError::CharacterOutOfRange { ch, position }),
        None => Ok(input.as_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_lie_outside_alphabet() {
        assert!(BEGIN_SENTINEL >= ASCII_END);
        assert!(END_SENTINEL >= ASCII_END);
        assert_ne!(BEGIN_SENTINEL, END_SENTINEL);
    }

    #[test]
    fn test_ascii_input_reports_first_offender() {
        assert_eq!(ascii_input("abc").unwrap(), b"abc");
        let err = ascii_input("ab\u{e9}c\u{fc}").unwrap_err();
        assert_eq!(
            err,
            MatchError::CharacterOutOfRange {
                ch: '\u{e9}',
                position: 2
            }
        );
    }
}
