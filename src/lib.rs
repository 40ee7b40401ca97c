//! wirepress - markup, script and style compression engine.
//!
//! Shrinks server-rendered HTML payloads, including their embedded
//! `<script>` and `<style>` blocks, without changing what they do or how
//! they render. Whitespace-sensitive regions (`<pre>`, `<textarea>`,
//! `<code>`, string/template/regex literals) are copied byte for byte.
//!
//! ```ignore
//! use wirepress::{CompressionConfig, Compressor};
//!
//! let compressor = Compressor::new(CompressionConfig::default());
//! let encoded = compressor.compress(&page, Some("text/html"), request_accept_encoding);
//! for (name, value) in encoded.headers() { /* set headers */ }
//! ```

pub mod compressor;
pub mod config;
pub mod level;
pub mod logger;
pub mod minify;
pub mod scan;
pub mod transport;
pub mod utils;

pub use compressor::{BANNER, Compressor};
pub use config::{CompressionConfig, ConfigError, ConfigInfo, Environment};
pub use level::CompressionLevel;
pub use minify::{ContentKind, MinificationResult, MinifyError};
pub use scan::{ScanMode, Span, SpanKind};
pub use transport::Encoded;
