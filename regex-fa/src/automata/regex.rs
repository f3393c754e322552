//! Pattern compiler: pattern text → Thompson NFA (recursive descent).
//!
//! The compiler reads the pattern one character at a time with a single
//! character of lookahead and builds the NFA directly through the graph
//! combinators. No syntax tree is allocated.
//!
//! ## Grammar
//!
//! ```text
//! expr       := term ('|' expr)?
//! term       := factor*
//! factor     := atom quantifier?
//! atom       := literal | '.' | '(' expr ')' | '[' class ']' | escape | '^' | '$'
//! quantifier := '*' | '+' | '?' | '{' m? (',' n?)? '}'
//! ```
//!
//! ## Supported syntax
//!
//! | Feature | Syntax | Notes |
//! |---------|--------|-------|
//! | Literal | `a`, `}`, `]` | ASCII only |
//! | Any character | `.` | All 128 code points |
//! | Anchors | `^` `$` | A run collapses to one anchor |
//! | Octal escape | `\0` .. `\177` | Digits are taken while the value stays below 128 |
//! | Hex escape | `\xHH` | Exactly two digits |
//! | Control escapes | `\r \n \t \a \b \e \f` | |
//! | Meta classes | `\d \D \s \S \w \W` | Not inside `[...]` |
//! | Escaped punctuation | `\.` `\(` `\{` ... | Any non-alphanumeric |
//! | Class | `[a-z0-9_]`, `[^"]`, `[]-]` | `]` or `-` first is literal |
//! | Quantifiers | `*` `+` `?` `{m}` `{m,n}` | `{,n}` means `{0,n}`; a missing `n` is 0 |
//! | Alternation, grouping | `a\|b`, `(...)` | Groups do not capture |

use super::interval::IntervalIndex;
use super::label::{CharRange, Label, DIGIT, DOT, NON_DIGIT, NON_SPACE, NON_WORD, SPACE, WORD};
use super::nfa::NfaGraph;
use super::ASCII_END;
use crate::error::{CompileError, SyntaxError, SyntaxErrorKind};

/// Compile `pattern` into an NFA graph.
///
/// # Errors
///
/// Returns [`CompileError::Syntax`] for malformed patterns and
/// [`CompileError::Build`] if graph construction breaks a node invariant.
pub fn compile_pattern(pattern: &str) -> Result<NfaGraph, CompileError> {
    let mut parser = Parser::new(pattern);
    let graph = parser.expression()?;
    // `expression` only stops early at a `)` it does not own.
    if parser.peek().is_some() {
        return Err(SyntaxError::new(SyntaxErrorKind::UnmatchedCloseParen, parser.pos).into());
    }
    Ok(graph)
}

/// Class member waiting to see whether a `-` follows it.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Empty,
    Single(u8),
    Range(u8),
}

struct Parser {
    chars: Vec<char>,
    /// Offset of the next character, counted in characters.
    pos: usize,
}

impl Parser {
    fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ascii(c: char, position: usize) -> Result<u8, SyntaxError> {
        u8::try_from(c)
            .ok()
            .filter(|&b| b < ASCII_END)
            .ok_or(SyntaxError::new(SyntaxErrorKind::NonAscii(c), position))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    /// Compile up to the end of input or an unconsumed `)`.
    fn expression(&mut self) -> Result<NfaGraph, CompileError> {
        let mut graph = NfaGraph::empty();

        while let Some(c) = self.peek() {
            let position = self.pos;
            match c {
                ')' => break,
                '*' | '+' | '?' | '{' => {
                    return Err(
                        SyntaxError::new(SyntaxErrorKind::DetachedQuantifier(c), position).into(),
                    );
                }
                '^' | '$' => {
                    self.bump();
                    // Only the last anchor of a run is emitted.
                    if self.peek() != Some(c) {
                        let anchor = if c == '^' { Label::Begin } else { Label::End };
                        self.attach(&mut graph, NfaGraph::from_label(anchor)?)?;
                    }
                }
                '.' => {
                    self.bump();
                    self.attach(&mut graph, NfaGraph::from_label(DOT)?)?;
                }
                '(' => {
                    self.bump();
                    let group = self.expression()?;
                    if !self.eat(')') {
                        return Err(SyntaxError::new(SyntaxErrorKind::UnclosedGroup, position).into());
                    }
                    self.attach(&mut graph, group)?;
                }
                '[' => {
                    self.bump();
                    let labels = self.class(position)?;
                    self.attach(&mut graph, NfaGraph::union_all(&labels)?)?;
                }
                '|' => {
                    self.bump();
                    let rest = self.expression()?;
                    graph.union(rest)?;
                }
                '\\' => {
                    self.bump();
                    let atom = match self.meta_class() {
                        Some(labels) => NfaGraph::union_all(labels)?,
                        None => NfaGraph::from_label(Label::Single(self.escape(position)?))?,
                    };
                    self.attach(&mut graph, atom)?;
                }
                _ => {
                    self.bump();
                    let literal = Self::ascii(c, position)?;
                    self.attach(&mut graph, NfaGraph::from_label(Label::Single(literal))?)?;
                }
            }
        }

        Ok(graph)
    }

    /// Apply a trailing quantifier, if any, to `atom` and append it to `graph`.
    fn attach(&mut self, graph: &mut NfaGraph, mut atom: NfaGraph) -> Result<(), CompileError> {
        let position = self.pos;
        match self.peek() {
            Some('*') => {
                self.bump();
                atom.closure()?;
            }
            Some('+') => {
                self.bump();
                atom.one_or_more()?;
            }
            Some('?') => {
                self.bump();
                atom.exists()?;
            }
            Some('{') => {
                self.bump();
                let (min, max) = self.repeat_bounds(position)?;
                atom.repeat(min, max)?;
            }
            _ => {}
        }
        graph.concat(atom)?;
        Ok(())
    }

    /// Parse the inside of `{...}` up to and including the closing brace.
    /// Without a comma the bound is exact; after a comma the upper bound is
    /// whatever digits follow, so an empty `n` reads as zero.
    fn repeat_bounds(&mut self, open: usize) -> Result<(u32, u32), SyntaxError> {
        let mut min: u32 = 0;
        let mut max: u32 = 0;
        let mut comma = false;
        let mut max_digits = false;

        loop {
            let position = self.pos;
            match self.bump() {
                None => return Err(SyntaxError::new(SyntaxErrorKind::UnclosedRepeat, open)),
                Some('}') => break,
                Some(',') if comma => {
                    return Err(SyntaxError::new(SyntaxErrorKind::DoubleComma, position));
                }
                Some(',') => comma = true,
                Some(c @ '0'..='9') => {
                    let digit = u32::from(c) - u32::from('0');
                    let bound = if comma {
                        if !max_digits && digit == 0 {
                            return Err(SyntaxError::new(SyntaxErrorKind::MalformedRepeat, position));
                        }
                        max_digits = true;
                        &mut max
                    } else {
                        &mut min
                    };
                    *bound = bound
                        .checked_mul(10)
                        .and_then(|value| value.checked_add(digit))
                        .ok_or(SyntaxError::new(SyntaxErrorKind::MalformedRepeat, position))?;
                }
                Some(_) => {
                    return Err(SyntaxError::new(SyntaxErrorKind::MalformedRepeat, position));
                }
            }
        }

        if !comma {
            return Ok((min, min));
        }
        if max < min {
            return Err(SyntaxError::new(
                SyntaxErrorKind::InvalidRepeatRange { min, max },
                open,
            ));
        }
        Ok((min, max))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Escapes
    // ══════════════════════════════════════════════════════════════════════

    /// Consume a meta-class letter after `\`, if one is next.
    fn meta_class(&mut self) -> Option<&'static [Label]> {
        let labels = match self.peek()? {
            'd' => DIGIT,
            'D' => NON_DIGIT,
            's' => SPACE,
            'S' => NON_SPACE,
            'w' => WORD,
            'W' => NON_WORD,
            _ => return None,
        };
        self.bump();
        Some(labels)
    }

    /// Decode a single-character escape; the backslash at `start` has
    /// already been consumed.
    fn escape(&mut self, start: usize) -> Result<u8, SyntaxError> {
        let position = self.pos;
        let Some(c) = self.peek() else {
            return Err(SyntaxError::new(SyntaxErrorKind::IncompleteEscape, start));
        };
        let decoded = match c {
            '0'..='7' => return Ok(self.octal()),
            'x' => {
                self.bump();
                return self.hex(start);
            }
            'r' => b'\r',
            'n' => b'\n',
            't' => b'\t',
            'a' => 0x07,
            'b' => 0x08,
            'e' => 0x1b,
            'f' => 0x0c,
            c if !c.is_ascii_alphanumeric() => Self::ascii(c, position)?,
            c => return Err(SyntaxError::new(SyntaxErrorKind::UnsupportedEscape(c), start)),
        };
        self.bump();
        Ok(decoded)
    }

    /// Octal digits are taken while the value shifted by one more digit can
    /// still stay below 128, so `\1777` is `\177` followed by `7`.
    fn octal(&mut self) -> u8 {
        let mut value: u32 = 0;
        while value << 3 < u32::from(ASCII_END) {
            let Some(digit) = self.peek().and_then(|c| c.to_digit(8)) else {
                break;
            };
            self.bump();
            value = value * 8 + digit;
        }
        value as u8
    }

    fn hex(&mut self, start: usize) -> Result<u8, SyntaxError> {
        let mut value: u8 = 0;
        for _ in 0..2 {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or(SyntaxError::new(SyntaxErrorKind::InvalidHexEscape, start))?;
            self.bump();
            value = value * 16 + digit as u8;
        }
        if value >= ASCII_END {
            return Err(SyntaxError::new(
                SyntaxErrorKind::NonAscii(char::from(value)),
                start,
            ));
        }
        Ok(value)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Character classes
    // ══════════════════════════════════════════════════════════════════════

    /// Parse class members through the closing `]` and return the
    /// normalized labels of the class.
    fn class(&mut self, open: usize) -> Result<Vec<Label>, SyntaxError> {
        let negated = self.eat('^');
        let mut members = IntervalIndex::new();

        if let Some(c @ (']' | '-')) = self.peek() {
            self.bump();
            members.insert_coalescing(CharRange::single(c as u8));
        }

        let mut pending = Pending::Empty;
        loop {
            let position = self.pos;
            let c = match self.peek() {
                None | Some(']') => break,
                Some(c) => c,
            };
            self.bump();

            if c == '-' {
                pending = match pending {
                    Pending::Empty => {
                        if self.peek() != Some(']') {
                            return Err(SyntaxError::new(SyntaxErrorKind::DanglingHyphen, position));
                        }
                        Pending::Single(b'-')
                    }
                    Pending::Single(last) if self.peek() == Some(']') => {
                        members.insert_coalescing(CharRange::single(last));
                        Pending::Single(b'-')
                    }
                    Pending::Single(last) => Pending::Range(last),
                    Pending::Range(from) => {
                        Self::check_range(from, b'-', position)?;
                        members.insert_coalescing(CharRange::new(from, b'-' + 1));
                        Pending::Empty
                    }
                };
                continue;
            }

            let member = if c == '\\' {
                self.escape(position)?
            } else {
                Self::ascii(c, position)?
            };
            pending = match pending {
                Pending::Empty => Pending::Single(member),
                Pending::Single(last) => {
                    members.insert_coalescing(CharRange::single(last));
                    Pending::Single(member)
                }
                Pending::Range(from) => {
                    Self::check_range(from, member, position)?;
                    members.insert_coalescing(CharRange::new(from, member + 1));
                    Pending::Empty
                }
            };
        }
        if !self.eat(']') {
            return Err(SyntaxError::new(SyntaxErrorKind::UnclosedClass, open));
        }
        if let Pending::Single(last) = pending {
            members.insert_coalescing(CharRange::single(last));
        }

        let mut ranges = merge_adjacent(members.ranges());
        if negated {
            ranges = complement(&ranges);
        }
        if ranges.is_empty() {
            return Err(SyntaxError::new(SyntaxErrorKind::EmptyClass, open));
        }
        Ok(ranges.into_iter().map(Label::from_range).collect())
    }

    fn check_range(from: u8, to: u8, position: usize) -> Result<(), SyntaxError> {
        if from > to {
            return Err(SyntaxError::new(
                SyntaxErrorKind::InvalidClassRange {
                    from: char::from(from),
                    to: char::from(to),
                },
                position,
            ));
        }
        Ok(())
    }
}

/// Join sorted, disjoint ranges that touch end to end.
fn merge_adjacent(ranges: Vec<CharRange>) -> Vec<CharRange> {
    let mut merged: Vec<CharRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut() {
            if let Some(joined) = last.concat(range) {
                *last = joined;
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

/// Complement of sorted, disjoint ranges over `[0, 128)`.
fn complement(ranges: &[CharRange]) -> Vec<CharRange> {
    let mut gaps = Vec::with_capacity(ranges.len() + 1);
    let mut lo = 0;
    for range in ranges {
        if lo < range.lo {
            gaps.push(CharRange::new(lo, range.lo));
        }
        lo = range.hi;
    }
    if lo < ASCII_END {
        gaps.push(CharRange::new(lo, ASCII_END));
    }
    gaps
}
