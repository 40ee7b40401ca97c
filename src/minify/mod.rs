//! Minifiers for markup, scripts and styles.
//!
//! Every minifier is a pure function of its input and a [`CompressionLevel`].
//! None of them can fail from the caller's point of view: internal errors
//! are logged and the affected block is passed through unchanged.

pub mod css;
pub mod html;
pub mod js;

use crate::level::CompressionLevel;
use crate::log;
use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::str::FromStr;
use thiserror::Error;

/// Internal minifier failure. Recovered at the block boundary.
#[derive(Debug, Error)]
pub enum MinifyError {
    #[error("unterminated block comment at byte {offset}")]
    UnterminatedComment { offset: usize },

    #[error("literal at byte {offset} was altered")]
    LiteralMismatch { offset: usize },

    #[error("minifier panicked: {0}")]
    Panicked(String),
}

impl MinifyError {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self::Panicked(message)
    }
}

/// Run one minifier pass, turning a panic into [`MinifyError::Panicked`].
pub(crate) fn contain(
    pass: impl FnOnce() -> Result<String, MinifyError>,
) -> Result<String, MinifyError> {
    catch_unwind(AssertUnwindSafe(pass)).unwrap_or_else(|payload| Err(MinifyError::from_panic(payload)))
}

/// Unwrap a pass result, logging the failure and keeping `input` on error.
pub(crate) fn or_original(kind: ContentKind, input: &str, result: Result<String, MinifyError>) -> String {
    result.unwrap_or_else(|err| {
        log!("minify"; "{} left unminified ({} bytes): {}", kind, input.len(), err);
        input.to_string()
    })
}

/// What a payload contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentKind {
    #[default]
    Html,
    Js,
    Css,
}

impl ContentKind {
    /// Guess the kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" | "xhtml" | "php" => Some(Self::Html),
            "js" | "mjs" | "cjs" => Some(Self::Js),
            "css" => Some(Self::Css),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Js => "JS",
            Self::Css => "CSS",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "js" | "javascript" => Ok(Self::Js),
            "css" => Ok(Self::Css),
            other => Err(format!("unknown content kind `{other}` (expected html, js or css)")),
        }
    }
}

/// Output of a minifier stage.
///
/// `changed` is false when the output equals the input, which is the only
/// case in which running the stage again is guaranteed to be a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinificationResult {
    pub output: String,
    pub changed: bool,
}

impl MinificationResult {
    pub fn new(input: &str, output: String) -> Self {
        let changed = input != output;
        Self { output, changed }
    }

    pub fn unchanged(input: &str) -> Self {
        Self {
            output: input.to_string(),
            changed: false,
        }
    }
}

/// Minify `content` of the given kind at `level`.
pub fn minify(content: &str, level: CompressionLevel, kind: ContentKind) -> MinificationResult {
    let level = level.resolve(content);
    if level == CompressionLevel::None {
        return MinificationResult::unchanged(content);
    }
    let output = match kind {
        ContentKind::Html => html::minify(content, level),
        ContentKind::Js => js::minify(content, level),
        ContentKind::Css => css::minify(content, level),
    };
    MinificationResult::new(content, output)
}
