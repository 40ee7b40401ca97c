//! HTML utility functions.
//!
//! - `is_raw_text_element()` - Raw text elements (script, style)
//! - `is_preserved_element()` - Elements whose content is whitespace sensitive
//! - `is_block_element()` - Block-level elements (div, p, etc.)
//! - `is_javascript_type()` / `is_css_type()` - `<script type>` / `<style type>` checks
//! - `parse_attributes()` - HTML attribute string parsing

// =============================================================================
// Element Classification
// =============================================================================

/// Check if tag is a raw text element (content is not markup).
///
/// Script and style content is "raw text" in HTML.
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Check if tag content must survive byte-for-byte.
#[inline]
pub fn is_preserved_element(tag: &str) -> bool {
    matches!(tag, "pre" | "textarea" | "code")
}

/// Check if tag is a block-level element.
///
/// Whitespace next to a block boundary does not render.
#[inline]
pub fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "body"
            | "canvas"
            | "dd"
            | "details"
            | "dialog"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "head"
            | "header"
            | "hgroup"
            | "hr"
            | "html"
            | "li"
            | "link"
            | "main"
            | "meta"
            | "nav"
            | "noscript"
            | "ol"
            | "option"
            | "p"
            | "pre"
            | "section"
            | "summary"
            | "table"
            | "tbody"
            | "td"
            | "tfoot"
            | "th"
            | "thead"
            | "title"
            | "tr"
            | "ul"
            | "video"
    )
}

/// Check if a `<script type>` value denotes JavaScript.
///
/// A missing or empty type is JavaScript. Parameters (`; charset=...`) are ignored.
pub fn is_javascript_type(ty: Option<&str>) -> bool {
    let Some(ty) = ty else {
        return true;
    };
    let ty = mime_essence(ty);
    matches!(
        ty.as_str(),
        "" | "module"
            | "text/javascript"
            | "application/javascript"
            | "application/x-javascript"
            | "text/ecmascript"
            | "application/ecmascript"
            | "text/jscript"
    )
}

/// Check if a `<style type>` value denotes CSS.
pub fn is_css_type(ty: Option<&str>) -> bool {
    ty.is_none_or(|ty| matches!(mime_essence(ty).as_str(), "" | "text/css"))
}

fn mime_essence(ty: &str) -> String {
    ty.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

// =============================================================================
// Attribute Parsing
// =============================================================================

/// One attribute inside an opening tag, borrowed from the tag text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    /// Raw text between name and value, e.g. `=` or ` = `.
    pub separator: &'a str,
    /// `None` for boolean attributes.
    pub value: Option<&'a str>,
    /// Quote character around the value, if any.
    pub quote: Option<char>,
}

impl Attribute<'_> {
    /// Case-insensitive name comparison.
    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Parse HTML-style attributes from a string.
///
/// Input: `viewBox="0 0 100 100" class='foo' disabled`
/// Output: `viewBox`, `class` (quoted with `'`) and the boolean `disabled`.
///
/// A `/` where a name would start is skipped, as browsers do. An
/// unterminated quoted value runs to the end of the input.
pub fn parse_attributes(s: &str) -> Vec<Attribute<'_>> {
    let b = s.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;

    let skip_ws = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };

    while i < b.len() {
        if b[i].is_ascii_whitespace() || b[i] == b'/' {
            i += 1;
            continue;
        }

        // Read attribute name
        let name_start = i;
        i += 1;
        while i < b.len() && b[i] != b'=' && b[i] != b'/' && !b[i].is_ascii_whitespace() {
            i += 1;
        }
        let name = &s[name_start..i];

        // Check for value
        let sep_start = i;
        let after_ws = skip_ws(i);
        if b.get(after_ws) != Some(&b'=') {
            attrs.push(Attribute {
                name,
                separator: "",
                value: None,
                quote: None,
            });
            i = after_ws;
            continue;
        }
        let value_start = skip_ws(after_ws + 1);
        let separator = &s[sep_start..value_start];

        let (value, quote) = match b.get(value_start) {
            Some(&q @ (b'"' | b'\'')) => {
                let inner = value_start + 1;
                let close = b[inner..]
                    .iter()
                    .position(|c| *c == q)
                    .map_or(b.len(), |p| p + inner);
                i = (close + 1).min(b.len());
                (&s[inner..close], Some(q as char))
            }
            _ => {
                // Unquoted value (read until whitespace)
                i = value_start;
                while i < b.len() && !b[i].is_ascii_whitespace() {
                    i += 1;
                }
                (&s[value_start..i], None)
            }
        };

        attrs.push(Attribute {
            name,
            separator,
            value: Some(value),
            quote,
        });
    }

    attrs
}

// =============================================================================
// Tests
// =============================================================================
