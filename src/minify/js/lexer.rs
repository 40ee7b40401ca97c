//! Script lexer.
//!
//! A single-pass state machine that cuts a script into code, literal and
//! comment segments. Literals (strings, templates, regexes) are returned as
//! ranges over the source so later stages can copy them verbatim.
//!
//! Regex detection is a heuristic: a `/` starts a regex candidate only after
//! an operator, an opening bracket, a statement boundary or one of the
//! keywords that precede an expression. The candidate is confirmed when a
//! closing `/` appears on the same line, otherwise the `/` is code.

use crate::scan::{quoted_end, template_end};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Template,
    Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block {
        /// `/*! ... */` license-style comment.
        preserve: bool,
        terminated: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Code { range: Range<usize> },
    Literal { range: Range<usize>, kind: LiteralKind },
    Comment { range: Range<usize>, kind: CommentKind },
}

impl Segment {
    pub fn range(&self) -> Range<usize> {
        match self {
            Self::Code { range } | Self::Literal { range, .. } | Self::Comment { range, .. } => {
                range.clone()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    InCode,
    InString,
    InTemplate,
    InRegexCandidate,
    InLineComment,
    InBlockComment,
}

/// What the last significant code token was, for regex/division decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    Word { start: usize, end: usize },
    Punct(u8),
    Literal,
    /// `++` or `--` after an operand: the expression is complete.
    Postfix,
}

/// Lex `source` into segments that cover it completely.
pub fn lex(source: &str) -> Vec<Segment> {
    let b = source.as_bytes();
    let mut segments = Vec::new();
    let mut state = State::InCode;
    let mut code_start = 0;
    let mut prev = Prev::Start;
    let mut i = 0;

    let flush_code = |segments: &mut Vec<Segment>, start: usize, end: usize| {
        if start < end {
            segments.push(Segment::Code { range: start..end });
        }
    };

    while i < b.len() {
        match state {
            State::InCode => {
                let c = b[i];
                match c {
                    b'"' | b'\'' => state = State::InString,
                    b'`' => state = State::InTemplate,
                    b'/' if b.get(i + 1) == Some(&b'/') => state = State::InLineComment,
                    b'/' if b.get(i + 1) == Some(&b'*') => state = State::InBlockComment,
                    b'/' if regex_allowed(b, prev) => state = State::InRegexCandidate,
                    b'+' | b'-' if b.get(i + 1) == Some(&c) && ends_operand(b, prev) => {
                        prev = Prev::Postfix;
                        i += 2;
                        continue;
                    }
                    _ if is_word_byte(c) => {
                        let start = i;
                        while i < b.len() && is_word_byte(b[i]) {
                            i += 1;
                        }
                        prev = Prev::Word { start, end: i };
                        continue;
                    }
                    _ if c.is_ascii_whitespace() => {
                        i += 1;
                        continue;
                    }
                    _ => {
                        prev = Prev::Punct(c);
                        i += 1;
                        continue;
                    }
                }
                if state != State::InCode {
                    flush_code(&mut segments, code_start, i);
                }
            }
            State::InString => {
                let end = quoted_end(b, i);
                segments.push(Segment::Literal {
                    range: i..end,
                    kind: LiteralKind::String,
                });
                (i, code_start, prev, state) = (end, end, Prev::Literal, State::InCode);
            }
            State::InTemplate => {
                let end = template_end(b, i);
                segments.push(Segment::Literal {
                    range: i..end,
                    kind: LiteralKind::Template,
                });
                (i, code_start, prev, state) = (end, end, Prev::Literal, State::InCode);
            }
            State::InRegexCandidate => {
                if let Some(end) = regex_end(b, i) {
                    segments.push(Segment::Literal {
                        range: i..end,
                        kind: LiteralKind::Regex,
                    });
                    (i, code_start, prev) = (end, end, Prev::Literal);
                } else {
                    // division after all; the code segment resumes at the slash
                    code_start = i;
                    prev = Prev::Punct(b'/');
                    i += 1;
                }
                state = State::InCode;
            }
            State::InLineComment => {
                let end = b[i..]
                    .iter()
                    .position(|c| *c == b'\n' || *c == b'\r')
                    .map_or(b.len(), |p| p + i);
                segments.push(Segment::Comment {
                    range: i..end,
                    kind: CommentKind::Line,
                });
                (i, code_start, state) = (end, end, State::InCode);
            }
            State::InBlockComment => {
                let close = crate::scan::find(b, b"*/", i + 2);
                let end = close.map_or(b.len(), |p| p + 2);
                segments.push(Segment::Comment {
                    range: i..end,
                    kind: CommentKind::Block {
                        preserve: b.get(i + 2) == Some(&b'!'),
                        terminated: close.is_some(),
                    },
                });
                (i, code_start, state) = (end, end, State::InCode);
            }
        }
    }

    flush_code(&mut segments, code_start, b.len());
    segments
}

/// Identifier, keyword or number byte. Non-ASCII bytes count as identifier bytes.
#[inline]
pub fn is_word_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$' || c >= 0x80
}

/// Keywords after which an expression (and therefore a regex) may start.
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

fn is_expression_keyword(b: &[u8], start: usize, end: usize) -> bool {
    let word = &b[start..end];
    EXPRESSION_KEYWORDS.iter().any(|k| k.as_bytes() == word)
}

fn regex_allowed(b: &[u8], prev: Prev) -> bool {
    match prev {
        Prev::Start => true,
        Prev::Literal | Prev::Postfix => false,
        Prev::Word { start, end } => is_expression_keyword(b, start, end),
        Prev::Punct(c) => !matches!(c, b')' | b']' | b'.'),
    }
}

/// Whether a `++`/`--` at this point is postfix.
fn ends_operand(b: &[u8], prev: Prev) -> bool {
    match prev {
        Prev::Literal => true,
        Prev::Word { start, end } => !is_expression_keyword(b, start, end),
        Prev::Punct(c) => matches!(c, b')' | b']'),
        Prev::Start | Prev::Postfix => false,
    }
}

/// End (exclusive) of a regex literal starting at `start`, including flags.
///
/// Returns `None` when the line ends before the closing slash.
fn regex_end(b: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let mut in_class = false;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            b'\n' | b'\r' => return None,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => {
                i += 1;
                while i < b.len() && b[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return Some(i);
            }
            _ => i += 1,
        }
    }
    None
}
