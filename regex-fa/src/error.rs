//! Error types for compiling, converting and running patterns.

use thiserror::Error;

use crate::automata::label::Label;
use crate::automata::{NodeId, StateId};

/// A malformed pattern, with the character offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at offset {position}: {kind}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// Offset into the pattern, counted in characters.
    pub position: usize,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, position: usize) -> Self {
        Self { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("unmatched ')'")]
    UnmatchedCloseParen,
    #[error("group opened here is never closed")]
    UnclosedGroup,
    #[error("character class opened here is never closed")]
    UnclosedClass,
    #[error("repetition opened here is never closed")]
    UnclosedRepeat,
    #[error("quantifier '{0}' does not follow an atom")]
    DetachedQuantifier(char),
    #[error("'-' in a character class must follow a member or precede ']'")]
    DanglingHyphen,
    #[error("character class range {from:?}-{to:?} is out of order")]
    InvalidClassRange { from: char, to: char },
    #[error("repetition upper bound {max} is below lower bound {min}")]
    InvalidRepeatRange { min: u32, max: u32 },
    #[error("repetition has more than one ','")]
    DoubleComma,
    #[error("malformed repetition")]
    MalformedRepeat,
    #[error("unsupported escape sequence '\\{0}'")]
    UnsupportedEscape(char),
    #[error("pattern ends inside an escape sequence")]
    IncompleteEscape,
    #[error("'\\x' must be followed by two hex digits")]
    InvalidHexEscape,
    #[error("character {0:?} is outside the ASCII range")]
    NonAscii(char),
    #[error("character class matches no character")]
    EmptyClass,
}

/// A graph operation that would break the shape of an NFA node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("node {node} is labelled {existing}, cannot add an edge labelled {label}")]
    ConflictingLabel {
        node: NodeId,
        existing: Label,
        label: Label,
    },
    #[error("node {node} already has its consuming edge")]
    SymbolEdgeTaken { node: NodeId },
    #[error("node {node} already has two epsilon edges")]
    EpsilonEdgesFull { node: NodeId },
}

/// Failure to compile a pattern into an NFA.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Failure to convert an NFA into a DFA.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("edge {label} of DFA state {state} overlaps existing edge {existing}")]
    OverlappingEdge {
        state: StateId,
        label: Label,
        existing: Label,
    },
    #[error("edge {label} of DFA state {state} consumes no character")]
    NonConsumingEdge { state: StateId, label: Label },
}

/// Input that cannot be run against a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("character {ch:?} at offset {position} is outside the ASCII range")]
    CharacterOutOfRange { ch: char, position: usize },
}
