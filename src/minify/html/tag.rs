//! Tag-level rewrites: attribute optimization and bracket spacing.

use crate::level::CompressionLevel;
use crate::utils::html::{Attribute, parse_attributes};
use std::borrow::Cow;

/// A parsed opening tag, borrowed from the source.
#[derive(Debug)]
pub struct Tag<'a> {
    pub name: &'a str,
    pub attrs: Vec<Attribute<'a>>,
    pub self_closing: bool,
    /// Whitespace before `>` or `/>`.
    pub trailing_space: bool,
}

impl<'a> Tag<'a> {
    /// Parse `<name attr=value ...>`. `text` must start with `<` and end with `>`.
    pub fn parse(text: &'a str) -> Option<Self> {
        let inner = text.strip_prefix('<')?.strip_suffix('>')?;
        let name_len = inner
            .bytes()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == b'-' || *c == b':')
            .count();
        if name_len == 0 {
            return None;
        }
        let name = &inner[..name_len];
        let rest = &inner[name_len..];
        let attrs = parse_attributes(rest);

        // `href=a/` owns its slash
        let trimmed = rest.trim_end();
        let self_closing = trimmed.ends_with('/')
            && !attrs
                .last()
                .is_some_and(|a| a.quote.is_none() && a.value.is_some_and(|v| v.ends_with('/')));
        let body = if self_closing {
            &trimmed[..trimmed.len() - 1]
        } else {
            rest
        };
        let trailing_space = body.ends_with(|c: char| c.is_ascii_whitespace());

        Some(Self {
            name,
            attrs,
            self_closing,
            trailing_space,
        })
    }

    /// Value of the first attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attrs.iter().find(|a| a.is(name)).and_then(|a| a.value)
    }
}

/// Rewrite an opening tag for `level`.
///
/// - `Aggressive`: single spaces between attributes, empty `class`/`id`/`style`
///   removed, `=""` dropped, simple values unquoted.
/// - `Extreme`: also `=` spacing and the space before `>` / `/>`.
pub fn opening(text: &str, level: CompressionLevel) -> Cow<'_, str> {
    if !level.is_aggressive() {
        return Cow::Borrowed(text);
    }
    let Some(tag) = Tag::parse(text) else {
        return Cow::Borrowed(text);
    };
    let extreme = level >= CompressionLevel::Extreme;

    let mut out = String::with_capacity(text.len());
    out.push('<');
    out.push_str(tag.name);

    let mut last_unquoted = false;
    for attr in &tag.attrs {
        if is_removable(attr) {
            continue;
        }
        out.push(' ');
        out.push_str(attr.name);
        last_unquoted = false;

        let Some(value) = attr.value else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        out.push_str(if extreme { "=" } else { attr.separator });
        match attr.quote {
            Some(q) if !can_unquote(value) => {
                out.push(q);
                out.push_str(value);
                out.push(q);
            }
            _ => {
                out.push_str(value);
                last_unquoted = true;
            }
        }
    }

    if tag.self_closing {
        if last_unquoted || (tag.trailing_space && !extreme) {
            out.push(' ');
        }
        out.push('/');
    } else if tag.trailing_space && !extreme {
        out.push(' ');
    }
    out.push('>');

    if out == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(out)
    }
}

/// Rewrite a closing tag: `</div  >` becomes `</div>` at `Extreme`.
pub fn closing(text: &str, level: CompressionLevel) -> Cow<'_, str> {
    if level < CompressionLevel::Extreme {
        return Cow::Borrowed(text);
    }
    let Some(inner) = text.strip_prefix("</").and_then(|t| t.strip_suffix('>')) else {
        return Cow::Borrowed(text);
    };
    let name = inner.trim_end();
    if name.len() == inner.len() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("</{name}>"))
    }
}

fn is_removable(attr: &Attribute<'_>) -> bool {
    (attr.is("class") || attr.is("id") || attr.is("style"))
        && attr.value.is_some_and(|v| v.trim().is_empty())
}

/// Values that parse identically without quotes.
fn can_unquote(value: &str) -> bool {
    !value.is_empty()
        && !value.ends_with('/')
        && !value
            .chars()
            .any(|c| c.is_ascii_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`'))
}

/// End offset (inclusive) of the `>` closing the tag that opens at `lt`.
///
/// Quotes only count after `=`, so `<a title=don't>` still ends at its `>`.
pub fn tag_end(b: &[u8], lt: usize) -> Option<usize> {
    let mut i = lt + 1;
    let mut after_eq = false;
    while i < b.len() {
        match b[i] {
            b'>' => return Some(i),
            b'=' => after_eq = true,
            q @ (b'"' | b'\'') if after_eq => {
                i = b[i + 1..].iter().position(|c| *c == q)? + i + 1;
                after_eq = false;
            }
            c if c.is_ascii_whitespace() => {}
            _ => after_eq = false,
        }
        i += 1;
    }
    None
}
