//! Literal scanner.
//!
//! Splits a buffer into an ordered list of [`Span`]s that partition it
//! completely. `Opaque` spans must reach the output byte-for-byte; everything
//! else is `Transformable`. Spans are plain offsets into the original buffer,
//! so consumers slice instead of copying.
//!
//! Three modes are supported:
//! - [`ScanMode::Markup`]: `<pre>`, `<textarea>`, `<code>` elements and
//!   conditional comments are opaque. Script and style bodies are skipped so
//!   that a `"<pre>"` inside a script string is not mistaken for an element.
//! - [`ScanMode::Script`]: string, template and regex literals are opaque
//!   (delegates to the script lexer).
//! - [`ScanMode::Style`]: quoted strings and `url(...)` bodies are opaque.
//!
//! The scanner never fails. An unterminated literal or element runs to the
//! end of the input.

use crate::minify::html::tag::tag_end;
use crate::minify::js::lexer::{self, Segment};
use crate::utils::html::{is_preserved_element, is_raw_text_element};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Copied to the output unchanged.
    Opaque,
    /// May be minified.
    Transformable,
}

/// Half-open byte range `[start, end)` over the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

impl Span {
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.kind == SpanKind::Opaque
    }

    /// Borrow the covered text from the buffer this span was produced for.
    #[inline]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.range()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Markup,
    Script,
    Style,
}

/// Scan `text` and return spans covering it completely, in order.
pub fn scan(text: &str, mode: ScanMode) -> Vec<Span> {
    match mode {
        ScanMode::Markup => scan_markup(text),
        ScanMode::Script => scan_script(text),
        ScanMode::Style => scan_style(text),
    }
}

// ============================================================================
// Span assembly
// ============================================================================

/// Collects opaque ranges and fills the gaps with transformable spans.
struct SpanBuilder {
    spans: Vec<Span>,
    cursor: usize,
    len: usize,
}

impl SpanBuilder {
    fn new(len: usize) -> Self {
        Self {
            spans: Vec::new(),
            cursor: 0,
            len,
        }
    }

    fn opaque(&mut self, start: usize, end: usize) {
        let end = end.min(self.len);
        if start >= end {
            return;
        }
        self.fill_to(start);
        self.push(start, end, SpanKind::Opaque);
        self.cursor = end;
    }

    fn fill_to(&mut self, start: usize) {
        if self.cursor < start {
            self.push(self.cursor, start, SpanKind::Transformable);
        }
    }

    fn push(&mut self, start: usize, end: usize, kind: SpanKind) {
        // adjacent spans of the same kind merge
        if let Some(last) = self.spans.last_mut()
            && last.kind == kind
            && last.end == start
        {
            last.end = end;
            return;
        }
        self.spans.push(Span { start, end, kind });
    }

    fn finish(mut self) -> Vec<Span> {
        let len = self.len;
        self.fill_to(len);
        self.spans
    }
}

// ============================================================================
// Markup
// ============================================================================

fn scan_markup(text: &str) -> Vec<Span> {
    let b = text.as_bytes();
    let mut spans = SpanBuilder::new(b.len());
    let mut i = 0;

    while let Some(lt) = find_byte(b, b'<', i) {
        if b[lt..].starts_with(b"<!--") {
            if starts_with_ci(b, lt + 4, b"[if") {
                let end = conditional_comment_end(b, lt);
                spans.opaque(lt, end);
                i = end;
            } else {
                i = find(b, b"-->", lt + 4).map_or(b.len(), |p| p + 3);
            }
            continue;
        }

        // downlevel-revealed conditional markers: <![if !IE]> / <![endif]>
        if b[lt..].starts_with(b"<![") {
            let end = find_byte(b, b'>', lt).map_or(b.len(), |p| p + 1);
            spans.opaque(lt, end);
            i = end;
            continue;
        }

        match opening_tag_name(b, lt) {
            Some(name) if is_preserved_element(&name) => {
                let end = element_end(b, lt + 1 + name.len(), &name);
                spans.opaque(lt, end);
                i = end;
            }
            Some(name) if is_raw_text_element(&name) => {
                i = element_end(b, lt + 1 + name.len(), &name);
            }
            // attribute values may contain `<pre>` and friends
            Some(_) => i = tag_end(b, lt).map_or(b.len(), |gt| gt + 1),
            None => i = lt + 1,
        }
    }

    spans.finish()
}

/// Lowercased name of the opening tag starting at `lt`, if any.
pub(crate) fn opening_tag_name(b: &[u8], lt: usize) -> Option<String> {
    let start = lt + 1;
    let mut end = start;
    while end < b.len() && (b[end].is_ascii_alphanumeric() || b[end] == b'-') {
        end += 1;
    }
    if end == start || !b[start].is_ascii_alphabetic() {
        return None;
    }
    match b.get(end) {
        None | Some(b'>' | b'/') => {}
        Some(c) if c.is_ascii_whitespace() => {}
        _ => return None,
    }
    Some(String::from_utf8_lossy(&b[start..end]).to_ascii_lowercase())
}

/// End offset (exclusive) of the element whose close tag `</name>` is searched from `from`.
pub(crate) fn element_end(b: &[u8], from: usize, name: &str) -> usize {
    close_tag_start(b, from, name)
        .and_then(|close| find_byte(b, b'>', close))
        .map_or(b.len(), |gt| gt + 1)
}

/// Offset of the first `</name` at or after `from` (ASCII case-insensitive).
pub(crate) fn close_tag_start(b: &[u8], from: usize, name: &str) -> Option<usize> {
    let mut i = from;
    while let Some(pos) = find(b, b"</", i) {
        let name_start = pos + 2;
        let name_end = name_start + name.len();
        if name_end <= b.len()
            && b[name_start..name_end].eq_ignore_ascii_case(name.as_bytes())
            && b.get(name_end)
                .is_none_or(|c| *c == b'>' || c.is_ascii_whitespace())
        {
            return Some(pos);
        }
        i = pos + 2;
    }
    None
}

fn conditional_comment_end(b: &[u8], lt: usize) -> usize {
    if let Some(endif) = find_ci(b, b"<![endif]", lt) {
        return find(b, b"-->", endif).map_or(b.len(), |p| p + 3);
    }
    find(b, b"-->", lt + 4).map_or(b.len(), |p| p + 3)
}

// ============================================================================
// Script and style
// ============================================================================

fn scan_script(text: &str) -> Vec<Span> {
    let mut spans = SpanBuilder::new(text.len());
    for segment in lexer::lex(text) {
        if let Segment::Literal { range, .. } = segment {
            spans.opaque(range.start, range.end);
        }
    }
    spans.finish()
}

fn scan_style(text: &str) -> Vec<Span> {
    let b = text.as_bytes();
    let mut spans = SpanBuilder::new(b.len());
    let mut i = 0;

    while i < b.len() {
        match b[i] {
            b'"' | b'\'' => {
                let end = quoted_end(b, i);
                spans.opaque(i, end);
                i = end;
            }
            b'/' if b.get(i + 1) == Some(&b'*') => {
                i = find(b, b"*/", i + 2).map_or(b.len(), |p| p + 2);
            }
            b'u' | b'U' if starts_with_ci(b, i, b"url(") && !is_ident_byte_before(b, i) => {
                let end = url_end(b, i + 4);
                spans.opaque(i, end);
                i = end;
            }
            _ => i += 1,
        }
    }

    spans.finish()
}

fn url_end(b: &[u8], mut i: usize) -> usize {
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            b'"' | b'\'' => i = quoted_end(b, i),
            b')' => return i + 1,
            _ => i += 1,
        }
    }
    b.len()
}

fn is_ident_byte_before(b: &[u8], i: usize) -> bool {
    i > 0 && (b[i - 1].is_ascii_alphanumeric() || b[i - 1] == b'-' || b[i - 1] == b'_')
}

// ============================================================================
// Literal primitives
// ============================================================================

/// End (exclusive) of the quoted string opening at `start`.
///
/// Escapes are honored. Unterminated strings run to the end of the input.
pub fn quoted_end(b: &[u8], start: usize) -> usize {
    let quote = b[start];
    let mut i = start + 1;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    b.len()
}

/// End (exclusive) of the template literal opening at `start`.
///
/// `${...}` interpolations are skipped as a whole, including nested braces,
/// strings and templates.
pub fn template_end(b: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            b'`' => return i + 1,
            b'$' if b.get(i + 1) == Some(&b'{') => i = interpolation_end(b, i + 2),
            _ => i += 1,
        }
    }
    b.len()
}

fn interpolation_end(b: &[u8], mut i: usize) -> usize {
    let mut depth = 1usize;
    while i < b.len() {
        match b[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            b'"' | b'\'' => {
                i = quoted_end(b, i);
                continue;
            }
            b'`' => {
                i = template_end(b, i);
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    b.len()
}

// ============================================================================
// Byte search helpers
// ============================================================================

#[inline]
pub(crate) fn find_byte(b: &[u8], needle: u8, from: usize) -> Option<usize> {
    b.get(from..)?.iter().position(|c| *c == needle).map(|p| p + from)
}

pub(crate) fn find(b: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    let hay = b.get(from..)?;
    if needle.len() > hay.len() {
        return None;
    }
    hay.windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

pub(crate) fn find_ci(b: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    let hay = b.get(from..)?;
    if needle.len() > hay.len() {
        return None;
    }
    hay.windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
        .map(|p| p + from)
}

#[inline]
pub(crate) fn starts_with_ci(b: &[u8], at: usize, prefix: &[u8]) -> bool {
    b.get(at..at + prefix.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(prefix))
}
