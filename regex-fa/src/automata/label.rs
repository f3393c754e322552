//! Edge labels and the character ranges they are built from.
//!
//! A label is what an NFA or DFA edge consumes: nothing (epsilon), one of the
//! two anchor sentinels, a single ASCII character, or a half-open range of
//! ASCII characters. A range of width one is always represented as
//! [`Label::Single`], so structural equality of labels is equality of the
//! character sets they match.

use std::fmt;

use smallvec::SmallVec;

use super::{ASCII_END, BEGIN_SENTINEL, END_SENTINEL};

/// Half-open range `[lo, hi)` of ASCII code points, `lo < hi <= 128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharRange {
    pub lo: u8,
    pub hi: u8,
}

impl CharRange {
    pub const fn new(lo: u8, hi: u8) -> Self {
        Self { lo, hi }
    }

    /// The range holding exactly `c`.
    pub const fn single(c: u8) -> Self {
        Self { lo: c, hi: c + 1 }
    }

    /// The whole ASCII alphabet.
    pub const fn ascii() -> Self {
        Self { lo: 0, hi: ASCII_END }
    }

    pub fn width(self) -> u8 {
        self.hi - self.lo
    }

    pub fn contains(self, c: u8) -> bool {
        self.lo <= c && c < self.hi
    }

    pub fn overlaps(self, other: Self) -> bool {
        self.lo < other.hi && other.lo < self.hi
    }

    /// Whether the two ranges touch end to end.
    pub fn adjacent(self, other: Self) -> bool {
        self.hi == other.lo || other.hi == self.lo
    }

    /// The common part of two ranges, or `None` when they are disjoint.
    pub fn intersect(self, other: Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self::new(self.lo.max(other.lo), self.hi.min(other.hi)))
    }

    /// Join two ranges that touch end to end into one.
    pub fn concat(self, other: Self) -> Option<Self> {
        if !self.adjacent(other) {
            return None;
        }
        Some(Self::new(self.lo.min(other.lo), self.hi.max(other.hi)))
    }

    /// Split at an interior point into `[lo, at)` and `[at, hi)`.
    pub fn split(self, at: u8) -> Option<(Self, Self)> {
        if self.lo < at && at < self.hi {
            Some((Self::new(self.lo, at), Self::new(at, self.hi)))
        } else {
            None
        }
    }

    /// The parts of `self` not covered by `other`: zero, one or two ranges in
    /// ascending order.
    pub fn remove(self, other: Self) -> SmallVec<[Self; 2]> {
        let mut rest = SmallVec::new();
        if !self.overlaps(other) {
            rest.push(self);
            return rest;
        }
        if self.lo < other.lo {
            rest.push(Self::new(self.lo, other.lo));
        }
        if other.hi < self.hi {
            rest.push(Self::new(other.hi, self.hi));
        }
        rest
    }
}

/// What an edge consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Consumes nothing.
    Epsilon,
    /// Matches only [`BEGIN_SENTINEL`], the virtual character before the input.
    Begin,
    /// Matches only [`END_SENTINEL`], the virtual character after the input.
    End,
    /// One ASCII character.
    Single(u8),
    /// Half-open ASCII range of width at least two.
    Range(CharRange),
}

impl Label {
    /// Label for a range, normalizing width-one ranges to [`Label::Single`].
    pub fn from_range(range: CharRange) -> Self {
        if range.width() == 1 {
            Self::Single(range.lo)
        } else {
            Self::Range(range)
        }
    }

    pub fn range(lo: u8, hi: u8) -> Self {
        Self::from_range(CharRange::new(lo, hi))
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Self::Epsilon)
    }

    /// Whether consuming `c` along an edge with this label is allowed.
    ///
    /// `c` is either an ASCII character or one of the two sentinels.
    pub fn matches(&self, c: u8) -> bool {
        match *self {
            Self::Epsilon => false,
            Self::Begin => c == BEGIN_SENTINEL,
            Self::End => c == END_SENTINEL,
            Self::Single(s) => s == c,
            Self::Range(range) => range.contains(c),
        }
    }

    /// The characters this label consumes, if it consumes real characters.
    pub fn interval(&self) -> Option<CharRange> {
        match *self {
            Self::Single(c) => Some(CharRange::single(c)),
            Self::Range(range) => Some(range),
            Self::Epsilon | Self::Begin | Self::End => None,
        }
    }

    /// Any character consumed by this label.
    pub fn representative(&self) -> Option<u8> {
        self.interval().map(|range| range.lo)
    }
}

fn is_word(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Epsilon => write!(f, "\u{3b5}"),
            Self::Begin => write!(f, "begin"),
            Self::End => write!(f, "end"),
            Self::Single(c) if is_word(c) => write!(f, "{}", c as char),
            Self::Single(c) => write!(f, "{c:#04x}"),
            Self::Range(CharRange { lo, hi }) if is_word(lo) && is_word(hi - 1) => {
                write!(f, "[{}, {}]", lo as char, (hi - 1) as char)
            }
            Self::Range(CharRange { lo, hi }) => write!(f, "[{lo:#04x}, {:#04x}]", hi - 1),
        }
    }
}

// Meta-class tables for `\d \D \s \S \w \W`. Every entry is normalized.

pub const DIGIT: &[Label] = &[Label::Range(CharRange::new(b'0', b'9' + 1))];

pub const NON_DIGIT: &[Label] = &[
    Label::Range(CharRange::new(0, b'0')),
    Label::Range(CharRange::new(b'9' + 1, ASCII_END)),
];

pub const SPACE: &[Label] = &[
    Label::Range(CharRange::new(b'\t', 0x0e)),
    Label::Single(b' '),
];

pub const NON_SPACE: &[Label] = &[
    Label::Range(CharRange::new(0, b'\t')),
    Label::Range(CharRange::new(0x0e, b' ')),
    Label::Range(CharRange::new(b' ' + 1, ASCII_END)),
];

pub const WORD: &[Label] = &[
    Label::Range(CharRange::new(b'0', b'9' + 1)),
    Label::Range(CharRange::new(b'A', b'Z' + 1)),
    Label::Single(b'_'),
    Label::Range(CharRange::new(b'a', b'z' + 1)),
];

pub const NON_WORD: &[Label] = &[
    Label::Range(CharRange::new(0, b'0')),
    Label::Range(CharRange::new(b'9' + 1, b'A')),
    Label::Range(CharRange::new(b'Z' + 1, b'_')),
    Label::Single(b'`'),
    Label::Range(CharRange::new(b'z' + 1, ASCII_END)),
];

/// `.` matches every ASCII character.
pub const DOT: Label = Label::Range(CharRange::ascii());
