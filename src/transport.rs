//! gzip transport wrapper.
//!
//! The engine decides whether to gzip and hands back bytes together with the
//! header facts a caller needs. It never writes headers itself.

use crate::debug;
use crate::log;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("gzip encoding failed")]
    Gzip(#[from] io::Error),
}

/// Gzip `bytes` at maximum ratio.
pub fn gzip(bytes: &[u8]) -> Result<Vec<u8>, TransportError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::best());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Gzip `bytes` when allowed, otherwise return them unchanged.
///
/// An encoder failure also returns the input unchanged.
pub fn wrap(bytes: Vec<u8>, gzip_allowed: bool) -> Encoded {
    if !gzip_allowed {
        return Encoded::plain(bytes);
    }
    match gzip(&bytes) {
        Ok(body) => {
            debug!("gzip"; "{} -> {} bytes", bytes.len(), body.len());
            Encoded {
                body,
                gzipped: true,
                content_type: None,
            }
        }
        Err(err) => {
            log!("gzip"; "sending uncompressed: {}", err);
            Encoded::plain(bytes)
        }
    }
}

/// Whether an `Accept-Encoding` header value admits gzip.
///
/// `gzip`, `x-gzip` and `*` count unless their quality is zero; an explicit
/// `gzip;q=0` wins over `*`.
pub fn accepts_gzip(accept_encoding: Option<&str>) -> bool {
    let Some(header) = accept_encoding else {
        return false;
    };

    let mut wildcard = false;
    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let coding = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let refused = parts.any(|p| {
            p.trim()
                .strip_prefix("q=")
                .and_then(|q| q.trim().parse::<f32>().ok())
                .is_some_and(|q| q <= 0.0)
        });
        match coding.as_str() {
            "gzip" | "x-gzip" => return !refused,
            "*" => wildcard = !refused,
            _ => {}
        }
    }
    wildcard
}

/// Output bytes plus the facts needed to describe them in headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub body: Vec<u8>,
    pub gzipped: bool,
    /// MIME type without parameters, e.g. `text/html`.
    pub content_type: Option<String>,
}

impl Encoded {
    pub fn plain(body: Vec<u8>) -> Self {
        Self {
            body,
            gzipped: false,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: Option<&str>) -> Self {
        self.content_type = content_type
            .map(|ty| ty.split(';').next().unwrap_or_default().trim().to_string())
            .filter(|ty| !ty.is_empty());
        self
    }

    /// Value for `Content-Length`.
    #[inline]
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// `(name, value)` pairs a caller should set before sending `body`.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::with_capacity(4);
        if let Some(ty) = &self.content_type {
            headers.push(("Content-Type", format!("{ty}; charset=UTF-8")));
        }
        headers.push(("Content-Length", self.content_length().to_string()));
        if self.gzipped {
            headers.push(("Content-Encoding", "gzip".to_string()));
            headers.push(("Vary", "Accept-Encoding".to_string()));
        }
        headers
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}
