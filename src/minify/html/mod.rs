//! Markup minification.
//!
//! The document is first split by [`scan`](crate::scan) in markup mode:
//! `<pre>`, `<textarea>`, `<code>` and conditional comments are opaque and
//! copied as-is. Everything else is walked once:
//!
//! - comments are dropped (an unclosed `<!--` is kept with the rest of the input);
//! - whitespace runs in text collapse to one space, and whitespace-only runs
//!   between two tags disappear;
//! - `<script>` and `<style>` bodies go through the script and style minifiers
//!   at the same level;
//! - tags are rewritten by [`tag`] at `Aggressive` and above, where whitespace
//!   next to block-level tags is dropped as well.

pub mod tag;

use crate::level::CompressionLevel;
use crate::minify::{css, js};
use crate::scan::{self, ScanMode, close_tag_start, find, find_byte, opening_tag_name};
use crate::utils::html::{is_block_element, is_css_type, is_javascript_type, is_raw_text_element};
use tag::Tag;

/// Minify an HTML document or fragment.
pub fn minify(html: &str, level: CompressionLevel) -> String {
    let level = level.resolve(html);
    if level == CompressionLevel::None || html.trim().is_empty() {
        return html.to_string();
    }

    let mut writer = Writer::new(html.len(), level);
    for span in scan::scan(html, ScanMode::Markup) {
        let text = span.slice(html);
        if span.is_opaque() {
            writer.opaque(text);
        } else {
            writer.markup(text);
        }
    }
    writer.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Start,
    Text,
    Tag { block: bool },
}

struct Writer {
    out: String,
    level: CompressionLevel,
    /// Whitespace seen since the last emitted byte.
    pending: bool,
    last: Last,
}

impl Writer {
    fn new(capacity: usize, level: CompressionLevel) -> Self {
        Self {
            out: String::with_capacity(capacity),
            level,
            pending: false,
            last: Last::Start,
        }
    }

    fn markup(&mut self, s: &str) {
        let b = s.as_bytes();
        let mut i = 0;

        while i < b.len() {
            let Some(lt) = find_byte(b, b'<', i) else {
                self.text(&s[i..]);
                break;
            };
            self.text(&s[i..lt]);

            if b[lt..].starts_with(b"<!--") {
                match find(b, b"-->", lt + 4) {
                    Some(end) => i = end + 3,
                    None => {
                        self.tag(&s[lt..], false);
                        break;
                    }
                }
                continue;
            }

            // declarations and processing instructions: <!DOCTYPE html>, <?xml ...?>
            if matches!(b.get(lt + 1), Some(b'!' | b'?')) {
                let end = find_byte(b, b'>', lt).map_or(b.len(), |p| p + 1);
                self.tag(&s[lt..end], false);
                i = end;
                continue;
            }

            if b.get(lt + 1) == Some(&b'/') && b.get(lt + 2).is_some_and(u8::is_ascii_alphabetic) {
                let end = find_byte(b, b'>', lt).map_or(b.len(), |p| p + 1);
                let text = &s[lt..end];
                let name = close_tag_name(text);
                let block = is_block_element(&name);
                let rewritten = tag::closing(text, self.level);
                self.tag(&rewritten, block);
                i = end;
                continue;
            }

            let Some(name) = opening_tag_name(b, lt) else {
                self.text("<");
                i = lt + 1;
                continue;
            };
            let Some(gt) = tag::tag_end(b, lt) else {
                self.tag(&s[lt..], false);
                break;
            };
            let text = &s[lt..=gt];
            let rewritten = tag::opening(text, self.level);
            self.tag(&rewritten, is_block_element(&name));
            i = gt + 1;

            if is_raw_text_element(&name) {
                let close = close_tag_start(b, i, &name).unwrap_or(b.len());
                self.raw_text(&name, text, &s[i..close]);
                i = close;
            }
        }
    }

    /// Route a `<script>` or `<style>` body.
    fn raw_text(&mut self, name: &str, open: &str, body: &str) {
        let ty = Tag::parse(open).and_then(|t| t.attr("type"));
        let minified = match name {
            "script" if is_javascript_type(ty) => js::minify(body, self.level),
            "style" if is_css_type(ty) => css::minify(body, self.level),
            _ => body.to_string(),
        };
        self.out.push_str(&minified);
    }

    fn text(&mut self, s: &str) {
        for c in s.chars() {
            if c.is_ascii_whitespace() {
                self.pending = true;
                continue;
            }
            if std::mem::take(&mut self.pending) {
                let keep = match self.last {
                    Last::Start => false,
                    Last::Text => true,
                    Last::Tag { block } => !(block && self.level.is_aggressive()),
                };
                if keep {
                    self.out.push(' ');
                }
            }
            self.out.push(c);
            self.last = Last::Text;
        }
    }

    fn tag(&mut self, s: &str, block: bool) {
        if std::mem::take(&mut self.pending)
            && self.last == Last::Text
            && !(block && self.level.is_aggressive())
        {
            self.out.push(' ');
        }
        self.out.push_str(s);
        self.last = Last::Tag { block };
    }

    fn opaque(&mut self, s: &str) {
        let block = opening_tag_name(s.as_bytes(), 0).is_some_and(|name| is_block_element(&name));
        self.tag(s, block);
    }

    fn finish(self) -> String {
        self.out
    }
}

fn close_tag_name(text: &str) -> String {
    text.trim_start_matches("</")
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}
