//! Style minification.
//!
//! Quoted strings and `url(...)` bodies are opaque (see [`ScanMode::Style`])
//! and are copied verbatim; every rewrite below only touches the text
//! between them.
//!
//! | Level        | Steps                                                         |
//! |--------------|---------------------------------------------------------------|
//! | `Basic`      | strip comments, trim lines, collapse blank space              |
//! | `Aggressive` | one line; no space around `{ } ; : ,`; no `;` before `}`;     |
//! |              | `0px`→`0`, `0.5`→`.5`, `rgb(…)`→`#hex`; unquote `[a="b"]`      |
//! | `Extreme`    | also no space around selector combinators `> + ~` and just    |
//! |              | inside parentheses                                            |

use crate::level::CompressionLevel;
use crate::minify::{self, ContentKind, MinifyError};
use crate::scan::{self, ScanMode, Span};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

/// Minify a stylesheet or an inline `<style>` body.
///
/// Never fails: any error or panic is logged and the original is returned.
pub fn minify(css: &str, level: CompressionLevel) -> String {
    minify::or_original(ContentKind::Css, css, try_minify(css, level))
}

/// Minify a stylesheet, reporting internal failures to the caller.
pub fn try_minify(css: &str, level: CompressionLevel) -> Result<String, MinifyError> {
    let level = level.resolve(css);
    if level == CompressionLevel::None || css.trim().is_empty() {
        return Ok(css.to_string());
    }
    minify::contain(|| run(css, level))
}

fn run(css: &str, level: CompressionLevel) -> Result<String, MinifyError> {
    let spans = scan::scan(css, ScanMode::Style);
    let mut emitter = Emitter::new(css.len(), level);

    for (index, span) in spans.iter().enumerate() {
        let text = span.slice(css);
        if span.is_opaque() {
            let next = next_significant_char(css, &spans[index + 1..]);
            emitter.opaque(text, next);
            continue;
        }
        if let Some(offset) = open_comment(text) {
            return Err(MinifyError::UnterminatedComment {
                offset: span.start + offset,
            });
        }
        let stripped = strip_comments(text);
        if level.is_aggressive() {
            emitter.chunk(&compact_values(&stripped));
        } else {
            emitter.chunk(&stripped);
        }
    }

    Ok(emitter.finish())
}

// ============================================================================
// Value rewrites
// ============================================================================

/// Remove `/* ... */` comments, leaving a space so tokens stay apart.
///
/// An unterminated comment swallows the rest of the chunk.
pub fn strip_comments(text: &str) -> Cow<'_, str> {
    if !text.contains("/*") {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        out.push(' ');
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Offset of a `/*` that is never closed.
fn open_comment(text: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(start) = text[from..].find("/*").map(|p| p + from) {
        match text[start + 2..].find("*/") {
            Some(end) => from = start + 2 + end + 2,
            None => return Some(start),
        }
    }
    None
}

static ZERO_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|[^0-9A-Za-z_.#-])0+(?:\.0+)?(?:px|em|rem|pt|pc|in|cm|mm|ex|ch|vw|vh|vmin|vmax)\b")
        .unwrap()
});

static LEADING_ZERO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^0-9A-Za-z_.#-])0+(\.[0-9]+)").unwrap());

static RGB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\brgb\(\s*([0-9]{1,3})\s*,\s*([0-9]{1,3})\s*,\s*([0-9]{1,3})\s*\)").unwrap()
});

static MATH_FN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:calc|min|max|clamp)\(").unwrap());

/// Canonicalize numeric and color literals.
///
/// Lengths inside `calc()`, `min()`, `max()` and `clamp()` keep their unit:
/// a bare `0` is a number there, not a length.
pub fn compact_values(text: &str) -> Cow<'_, str> {
    let math = math_ranges(text);
    let text = ZERO_UNIT.replace_all(text, |caps: &Captures| {
        let zero = caps.get(1).map_or(0, |m| m.end());
        if math.iter().any(|r| r.contains(&zero)) {
            caps[0].to_string()
        } else {
            format!("{}0", &caps[1])
        }
    });
    let text = rewrite(text, |t| LEADING_ZERO.replace_all(t, "${1}${2}"));
    rewrite(text, |t| {
        RGB.replace_all(t, |caps: &Captures| rgb_to_hex(&caps[1], &caps[2], &caps[3]))
    })
}

/// Byte ranges covered by math functions, outermost only.
fn math_ranges(text: &str) -> Vec<Range<usize>> {
    let b = text.as_bytes();
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for m in MATH_FN.find_iter(text) {
        if ranges.last().is_some_and(|r| r.contains(&m.start())) {
            continue;
        }
        let mut depth = 1;
        let mut i = m.end();
        while i < b.len() && depth > 0 {
            match b[i] {
                b'(' => depth += 1,
                b')' => depth -= 1,
                _ => {}
            }
            i += 1;
        }
        ranges.push(m.start()..i);
    }
    ranges
}

/// Apply `f`, keeping `text` when nothing was replaced.
fn rewrite<'a>(text: Cow<'a, str>, f: impl FnOnce(&str) -> Cow<'_, str>) -> Cow<'a, str> {
    let replaced = match f(&text) {
        Cow::Owned(s) => Some(s),
        Cow::Borrowed(_) => None,
    };
    replaced.map_or(text, Cow::Owned)
}

/// `rgb(255, 0, 0)` → `#f00`; channels above 255 are clamped.
pub fn rgb_to_hex(r: &str, g: &str, b: &str) -> String {
    let channel = |s: &str| s.parse::<u16>().unwrap_or(0).min(255) as u8;
    let [r, g, b] = [channel(r), channel(g), channel(b)];
    let short = [r, g, b].iter().all(|c| c >> 4 == c & 0xf);
    if short {
        format!("#{:x}{:x}{:x}", r & 0xf, g & 0xf, b & 0xf)
    } else {
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

// ============================================================================
// Whitespace
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Nothing,
    Space,
    Newline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    /// `{ color: red }`
    Declarations,
    /// `@media { ... }`, `@keyframes { ... }`: holds rules, i.e. selectors.
    Rules,
}

struct Emitter {
    out: String,
    level: CompressionLevel,
    pending: Pending,
    blocks: Vec<Block>,
    /// Start of the current selector or at-rule prelude in `out`.
    prelude: usize,
}

impl Emitter {
    fn new(capacity: usize, level: CompressionLevel) -> Self {
        Self {
            out: String::with_capacity(capacity),
            level,
            pending: Pending::Nothing,
            blocks: Vec::new(),
            prelude: 0,
        }
    }

    fn chunk(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\n' | '\r' => self.pending = Pending::Newline,
                c if c.is_whitespace() => {
                    if self.pending == Pending::Nothing {
                        self.pending = Pending::Space;
                    }
                }
                c => self.push_char(c),
            }
        }
    }

    fn opaque(&mut self, text: &str, next: Option<char>) {
        let first = text.chars().next().unwrap_or(' ');
        self.flush(first);
        if self.level.is_aggressive()
            && self.out.ends_with('=')
            && next == Some(']')
            && let Some(inner) = unquoted(text)
        {
            self.out.push_str(inner);
        } else {
            self.out.push_str(text);
        }
    }

    fn push_char(&mut self, c: char) {
        self.flush(c);
        match c {
            '{' => {
                let kind = block_kind(&self.out[self.prelude..]);
                self.blocks.push(kind);
                self.out.push(c);
                self.prelude = self.out.len();
            }
            '}' => {
                if self.level.is_aggressive() && self.out.ends_with(';') {
                    self.out.pop();
                }
                self.blocks.pop();
                self.out.push(c);
                self.prelude = self.out.len();
            }
            ';' => {
                self.out.push(c);
                self.prelude = self.out.len();
            }
            c => self.out.push(c),
        }
    }

    fn flush(&mut self, next: char) {
        let pending = std::mem::replace(&mut self.pending, Pending::Nothing);
        let Some(last) = self.out.chars().last() else {
            return;
        };
        match pending {
            Pending::Nothing => {}
            Pending::Newline if !self.level.is_aggressive() => self.out.push('\n'),
            _ if self.level.is_aggressive() && self.drops_space(last, next) => {}
            _ => self.out.push(' '),
        }
    }

    /// Whitespace between `prev` and `next` carries no meaning.
    fn drops_space(&self, prev: char, next: char) -> bool {
        let in_declarations = self.blocks.last() == Some(&Block::Declarations);
        let around = |set: &[char]| set.contains(&prev) || set.contains(&next);

        if around(&['{', '}', ';', ',']) || next == '!' {
            return true;
        }
        if in_declarations && around(&[':']) {
            return true;
        }
        if self.level >= CompressionLevel::Extreme {
            if prev == '(' || next == ')' {
                return true;
            }
            if !in_declarations && around(&['>', '+', '~']) {
                return true;
            }
        }
        false
    }

    fn finish(self) -> String {
        self.out
    }
}

fn block_kind(prelude: &str) -> Block {
    let prelude = prelude.trim_start().to_ascii_lowercase();
    const GROUPS: &[&str] = &[
        "@media",
        "@supports",
        "@layer",
        "@container",
        "@document",
        "@scope",
        "@starting-style",
        "@keyframes",
        "@-webkit-keyframes",
        "@-moz-keyframes",
    ];
    if GROUPS.iter().any(|g| prelude.starts_with(g)) {
        Block::Rules
    } else {
        Block::Declarations
    }
}

/// Inner text of a quoted identifier such as `"text"`.
fn unquoted(text: &str) -> Option<&str> {
    let quote = text.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
    let mut chars = inner.chars();
    let first = chars.next()?;
    (first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'))
    .then_some(inner)
}

fn next_significant_char(css: &str, rest: &[Span]) -> Option<char> {
    rest.first()
        .and_then(|span| span.slice(css).chars().find(|c| !c.is_whitespace()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggressive(css: &str) -> String {
        minify(css, CompressionLevel::Aggressive)
    }

    fn extreme(css: &str) -> String {
        minify(css, CompressionLevel::Extreme)
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("a/* x */b"), "a b");
        assert_eq!(strip_comments("a /* open"), "a  ");
        assert!(matches!(strip_comments("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_basic_keeps_lines() {
        let css = "body {\n    color: red;   /* c */\n\n    margin: 0px;\n}\n";
        assert_eq!(
            minify(css, CompressionLevel::Basic),
            "body {\ncolor: red;\nmargin: 0px;\n}"
        );
    }

    #[test]
    fn test_aggressive_compacts() {
        let css = "body { color: red; } /* comment */";
        assert_eq!(aggressive(css), "body{color:red}");
    }

    #[test]
    fn test_declarations_and_punctuation() {
        let css = "h1 , h2 {\n  margin : 0 auto ;\n  font-family : Arial , sans-serif ;\n}";
        assert_eq!(aggressive(css), "h1,h2{margin:0 auto;font-family:Arial,sans-serif}");
    }

    #[test]
    fn test_zero_units_and_decimals() {
        assert_eq!(
            aggressive("a{margin:0px 10px 0em 0.0rem;opacity:0.5;width:100px}"),
            "a{margin:0 10px 0 0;opacity:.5;width:100px}"
        );
        // percentages stay: keyframe selectors need them
        assert_eq!(aggressive("@keyframes k{0%{top:0}}"), "@keyframes k{0%{top:0}}");
        assert_eq!(aggressive("a{line-height:10.05em}"), "a{line-height:10.05em}");
    }

    #[test]
    fn test_math_functions_keep_zero_units() {
        assert_eq!(
            aggressive("a{width:calc(100% - 0px);margin:0px}"),
            "a{width:calc(100% - 0px);margin:0}"
        );
        assert_eq!(
            extreme("a{width:max(0px, 1em);height:CLAMP(0rem, calc(0px + 1vw), 2rem)}"),
            "a{width:max(0px,1em);height:CLAMP(0rem,calc(0px + 1vw),2rem)}"
        );
        assert_eq!(aggressive("a{min-width:0px}"), "a{min-width:0}");
    }

    #[test]
    fn test_unterminated_comment_keeps_original() {
        let css = "a { color: red; }\n/* never closed\nb { margin: 0px; }";
        assert!(matches!(
            try_minify(css, CompressionLevel::Extreme),
            Err(MinifyError::UnterminatedComment { offset: 18 })
        ));
        assert_eq!(extreme(css), css);
        assert_eq!(
            try_minify("a { b: c } /* ok */", CompressionLevel::Aggressive).unwrap(),
            "a{b:c}"
        );
    }

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex("255", "0", "0"), "#f00");
        assert_eq!(rgb_to_hex("18", "52", "86"), "#123456");
        assert_eq!(rgb_to_hex("300", "17", "34"), "#f12");
        assert_eq!(rgb_to_hex("300", "18", "52"), "#ff1234");
        assert_eq!(
            aggressive("a{color:rgb(255, 255, 255);background:RGB( 16 ,32,48 )}"),
            "a{color:#fff;background:#102030}"
        );
    }

    #[test]
    fn test_strings_keep_their_whitespace() {
        let css = "a::before { content: \"a  :  b ; 0px\" ; }";
        assert_eq!(aggressive(css), "a::before{content:\"a  :  b ; 0px\"}");
    }

    #[test]
    fn test_url_is_untouched() {
        let css = "a { background : url( 'x y.png' ) no-repeat ; }";
        assert_eq!(aggressive(css), "a{background:url( 'x y.png' ) no-repeat}");
    }

    #[test]
    fn test_attribute_selector_unquoted() {
        assert_eq!(aggressive("input[type=\"text\"]{a:b}"), "input[type=text]{a:b}");
        assert_eq!(
            aggressive("a[title=\"two words\"]{a:b}"),
            "a[title=\"two words\"]{a:b}"
        );
    }

    #[test]
    fn test_selector_colon_spacing_is_kept() {
        assert_eq!(aggressive("div :first-child { a : b }"), "div :first-child{a:b}");
        assert_eq!(
            aggressive("@media screen { div :hover { a : b } }"),
            "@media screen{div :hover{a:b}}"
        );
    }

    #[test]
    fn test_extreme_combinators_and_parens() {
        assert_eq!(extreme("ul > li + li ~ p { a: b }"), "ul>li+li~p{a:b}");
        assert_eq!(aggressive("ul > li { a: b }"), "ul > li{a:b}");
        assert_eq!(
            extreme("a { width: calc( 100% - 2px ) }"),
            "a{width:calc(100% - 2px)}"
        );
        assert_eq!(
            extreme("@media screen and ( max-width : 10px ) { a { b: c } }"),
            "@media screen and (max-width : 10px){a{b:c}}"
        );
    }

    #[test]
    fn test_important() {
        assert_eq!(aggressive("a { color: red !important; }"), "a{color:red!important}");
    }

    #[test]
    fn test_level_monotonic() {
        let css = "ul > li , p :hover {\n  margin : 0px ( 1 ) ;\n  color: rgb(0,0,0);\n}\n";
        let basic = minify(css, CompressionLevel::Basic);
        let aggressive = aggressive(css);
        let extreme = extreme(css);
        assert!(extreme.len() <= aggressive.len());
        assert!(aggressive.len() <= basic.len());
    }

    #[test]
    fn test_none_passes_through() {
        assert_eq!(minify("a { }", CompressionLevel::None), "a { }");
    }
}
