//! # regex-fa: ASCII patterns compiled to finite automata
//!
//! A pattern is compiled once into a Thompson NFA. The NFA can then be run
//! directly, tracking every live node at once without backtracking, or
//! turned into a DFA by subset construction.
//!
//! ## Architecture
//!
//! ```text
//!   pattern text
//!        │
//!        ▼
//!  ┌────────────────────┐
//!  │  Pattern compiler  │  recursive descent over Thompson
//!  │  automata::regex   │  combinators (automata::nfa)
//!  └────────────────────┘
//!        │ NfaGraph
//!        ├──────────────────────────┐
//!        ▼                          ▼
//!  ┌────────────────────┐   ┌────────────────────┐
//!  │   NFA simulation   │   │ Subset construction│  per-state alphabet
//!  │ automata::simulate │   │  automata::subset  │  partition over an
//!  └────────────────────┘   └────────────────────┘  interval tree
//!        │                          │ Dfa
//!        ▼                          ▼
//!      bool                   Dfa::accepts
//! ```
//!
//! Matching is always whole-string. The alphabet is ASCII (code points
//! 0-127); `^` and `$` are honored by the simulator but have no DFA
//! counterpart.
//!
//! ```
//! let pattern = regex_fa::compile("zz[d-gx]{2,5}").unwrap();
//! assert!(pattern.is_match("zzdgx"));
//! assert!(!pattern.is_match("zzd"));
//!
//! let dfa = pattern.to_dfa().unwrap();
//! assert!(dfa.accepts("zzxxxxx").unwrap());
//! ```

pub mod automata;
pub mod error;

#[cfg(test)]
mod tests;

use tracing::debug;

pub use automata::dfa::{Dfa, DfaEdge, DfaState};
pub use automata::label::{CharRange, Label};
pub use automata::nfa::{NfaEdge, NfaGraph, NfaNode};
pub use automata::simulate::Simulation;
pub use error::{BuildError, CompileError, ConvertError, MatchError, SyntaxError, SyntaxErrorKind};

/// A compiled pattern: the source text and its NFA.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: String,
    nfa: NfaGraph,
}

/// Compile `pattern` into an NFA.
///
/// # Errors
///
/// Returns [`CompileError::Syntax`] if the pattern is malformed.
pub fn compile(pattern: &str) -> Result<CompiledPattern, CompileError> {
    let nfa = automata::regex::compile_pattern(pattern)?;
    debug!(
        pattern,
        nodes = nfa.node_count(),
        edges = nfa.edges().count(),
        "compiled pattern"
    );
    Ok(CompiledPattern {
        pattern: pattern.to_owned(),
        nfa,
    })
}

impl CompiledPattern {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn nfa(&self) -> &NfaGraph {
        &self.nfa
    }

    /// Whole-string match of `input` by NFA simulation.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::CharacterOutOfRange`] if `input` holds a
    /// non-ASCII character.
    pub fn simulate(&self, input: &str) -> Result<bool, MatchError> {
        Simulation::new(&self.nfa).test(input)
    }

    /// Like [`Self::simulate`], treating non-ASCII input as a non-match.
    pub fn is_match(&self, input: &str) -> bool {
        self.simulate(input).unwrap_or_else(|err| {
            debug!(pattern = %self.pattern, %err, "input outside pattern alphabet");
            false
        })
    }

    /// Build the equivalent DFA. Anchors are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if subset construction produces overlapping
    /// edges for a state.
    pub fn to_dfa(&self) -> Result<Dfa, ConvertError> {
        automata::subset::subset_construction(&self.nfa)
    }
}

impl std::str::FromStr for CompiledPattern {
    type Err = CompileError;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        compile(pattern)
    }
}
