//! Script minification.
//!
//! Pipeline:
//! 1. [`lexer::lex`] cuts the script into code, literal and comment segments.
//! 2. Comments are dropped (`/*! ... */` survives at `Basic`) and whitespace
//!    in code segments is collapsed.
//! 3. At `Aggressive` and above line breaks are removed too, and
//!    [`asi::AsiContext`] decides where a `;` has to stand in for them.
//! 4. Literals are copied from the source verbatim.
//!
//! [`minify`] never fails: any error or panic inside the pipeline is logged
//! and the original script is returned unchanged.

pub mod asi;
pub mod lexer;

use crate::debug;
use crate::level::CompressionLevel;
use crate::minify::{self, ContentKind, MinifyError};
use asi::{AsiContext, Token};
use lexer::{CommentKind, LiteralKind, Segment, is_word_byte};
use std::ops::Range;

/// Minify a script, falling back to the original on any internal failure.
pub fn minify(js: &str, level: CompressionLevel) -> String {
    minify::or_original(ContentKind::Js, js, try_minify(js, level))
}

/// Minify a script, reporting internal failures to the caller.
pub fn try_minify(js: &str, level: CompressionLevel) -> Result<String, MinifyError> {
    let level = level.resolve(js);
    if level == CompressionLevel::None || js.trim().is_empty() {
        return Ok(js.to_string());
    }

    minify::contain(|| run(js, level))
}

fn run(js: &str, level: CompressionLevel) -> Result<String, MinifyError> {
    let segments = lexer::lex(js);
    let mut emitter = Emitter::new(js, level);

    for segment in segments {
        match segment {
            Segment::Code { range } => emitter.code(range),
            Segment::Literal { range, kind } => emitter.literal(range, kind),
            Segment::Comment { range, kind } => match kind {
                CommentKind::Block {
                    terminated: false, ..
                } => return Err(MinifyError::UnterminatedComment { offset: range.start }),
                CommentKind::Block { preserve: true, .. } if !level.is_aggressive() => {
                    emitter.raw(&js[range]);
                }
                CommentKind::Block { .. } if js[range.clone()].contains('\n') => emitter.newline(),
                CommentKind::Block { .. } => emitter.space(),
                // the line break that ends it belongs to the next code segment
                CommentKind::Line => {}
            },
        }
    }

    emitter.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Nothing,
    Space,
    Newline,
}

/// Writes tokens and decides what replaces the whitespace between them.
struct Emitter<'a> {
    source: &'a str,
    out: String,
    level: CompressionLevel,
    pending: Pending,
    ctx: AsiContext<'a>,
    /// Last emitted token was a number (`1 .toString()` keeps its space).
    last_numeric: bool,
    last_regex: bool,
}

impl<'a> Emitter<'a> {
    fn new(source: &'a str, level: CompressionLevel) -> Self {
        Self {
            source,
            out: String::with_capacity(source.len()),
            level,
            pending: Pending::Nothing,
            ctx: AsiContext::new(),
            last_numeric: false,
            last_regex: false,
        }
    }

    fn space(&mut self) {
        if self.pending == Pending::Nothing {
            self.pending = Pending::Space;
        }
    }

    fn newline(&mut self) {
        self.pending = Pending::Newline;
    }

    /// Walk a code segment token by token.
    fn code(&mut self, range: Range<usize>) {
        let source = self.source;
        let text = &source[range.clone()];
        let b = text.as_bytes();
        let mut i = 0;
        while i < b.len() {
            self.ctx.pos = range.start + i;
            let c = b[i];
            if c == b'\n' || c == b'\r' {
                self.newline();
                i += 1;
            } else if c.is_ascii_whitespace() {
                self.space();
                i += 1;
            } else if is_word_byte(c) {
                let start = i;
                while i < b.len() && is_word_byte(b[i]) {
                    i += 1;
                }
                let word = &text[start..i];
                self.token(Token::Word(word), word);
                self.last_numeric = c.is_ascii_digit();
            } else if (c == b'+' || c == b'-') && b.get(i + 1) == Some(&c) {
                self.token(Token::Increment, &text[i..i + 2]);
                i += 2;
            } else if c == b'(' && opens_iife(&text[i + 1..]) {
                self.token(Token::IifeOpen, "(");
                i += 1;
            } else {
                // multi-byte punctuation is copied one byte at a time; only
                // ASCII reaches this branch because non-ASCII is a word byte
                self.token(Token::Punct(c), &text[i..i + 1]);
                i += 1;
            }
        }
    }

    fn literal(&mut self, range: Range<usize>, kind: LiteralKind) {
        let source = self.source;
        let text = &source[range.clone()];
        self.ctx.pos = range.start;
        self.token(Token::Literal(kind), text);
        self.ctx.literals.push((range, self.out.len() - text.len()));
        self.last_regex = kind == LiteralKind::Regex;
    }

    /// Kept comments are emitted as-is and are invisible to ASI.
    fn raw(&mut self, text: &str) {
        self.flush_whitespace(None);
        self.out.push_str(text);
        self.pending = Pending::Newline;
    }

    fn token(&mut self, token: Token<'a>, text: &str) {
        self.flush_whitespace(Some((token, text)));
        self.out.push_str(text);
        self.ctx.observe(token);
        self.last_numeric = false;
        self.last_regex = false;
    }

    /// Replace pending whitespace with what the level and the neighbours need.
    fn flush_whitespace(&mut self, next: Option<(Token<'_>, &str)>) {
        let pending = std::mem::replace(&mut self.pending, Pending::Nothing);
        if self.out.is_empty() || pending == Pending::Nothing {
            return;
        }
        let Some((token, text)) = next else {
            if pending == Pending::Newline {
                self.out.push('\n');
            }
            return;
        };

        if pending == Pending::Newline && !self.level.is_aggressive() {
            self.out.push('\n');
            return;
        }

        if pending == Pending::Newline && self.ctx.needs_semicolon(token) {
            debug!("minify"; "inserted `;` before byte {}", self.ctx.pos);
            self.out.push(';');
            self.ctx.observe_semicolon();
            return;
        }

        if self.needs_space(token, text) {
            self.out.push(' ');
        }
    }

    fn needs_space(&self, next: Token<'_>, text: &str) -> bool {
        let (Some(last), Some(first)) = (self.out.bytes().last(), text.bytes().next()) else {
            return false;
        };
        if is_word_byte(last) && is_word_byte(first) {
            return true;
        }
        // `a - -b`, `a + ++b`
        if matches!(first, b'+' | b'-') && last == first {
            return true;
        }
        // `a / /re/` and `/re/ / 2` would open a comment
        if last == b'/' && matches!(first, b'/' | b'*') {
            return true;
        }
        match next {
            Token::Punct(b'.') => self.last_numeric,
            // flags would swallow the word: `/a/ in x`
            Token::Word(_) => self.last_regex,
            _ => false,
        }
    }

    /// Output, provided every literal reached it unchanged.
    fn finish(self) -> Result<String, MinifyError> {
        for (range, at) in &self.ctx.literals {
            let literal = &self.source[range.clone()];
            if self.out.get(*at..*at + literal.len()) != Some(literal) {
                return Err(MinifyError::LiteralMismatch {
                    offset: range.start,
                });
            }
        }
        Ok(self.out)
    }
}

/// `(function` or `(async function` at the start of `rest`.
fn opens_iife(rest: &str) -> bool {
    let rest = rest.trim_start();
    let rest = rest
        .strip_prefix("async")
        .filter(|r| r.starts_with(char::is_whitespace))
        .map_or(rest, str::trim_start);
    rest.strip_prefix("function")
        .is_some_and(|r| !r.bytes().next().is_some_and(is_word_byte))
}

#[cfg(test)]
mod tests;
