//! Level selection and the public compression entry points.
//!
//! A [`Compressor`] owns its configuration; there is no process-global
//! state. Each call takes one snapshot of the config, so a concurrent
//! `set_level` affects later calls only.

use crate::config::{
    CompressionConfig, ConfigHandle, ConfigInfo, Environment, STRATEGY_VAR,
};
use crate::debug;
use crate::level::CompressionLevel;
use crate::minify::{self, ContentKind};
use crate::transport::{self, Encoded};
use serde::Serialize;
use std::sync::Arc;

/// Advisory comment prepended to compressed pages.
pub const BANNER: &str = "<!--\n  Minified by wirepress: whitespace and comments removed,\n  attributes optimized, scripts and styles compacted.\n-->\n";

#[derive(Debug, Default)]
pub struct Compressor {
    config: ConfigHandle,
    environment: Environment,
    strategy: Option<String>,
}

impl Compressor {
    pub fn new(config: CompressionConfig) -> Self {
        Self {
            config: ConfigHandle::new(config),
            environment: Environment::default(),
            strategy: None,
        }
    }

    /// Preset of the detected environment, plus the strategy override.
    pub fn from_env() -> Self {
        let environment = Environment::detect();
        Self::new(CompressionConfig::for_environment(environment))
            .with_environment(environment)
            .with_strategy(std::env::var(STRATEGY_VAR).ok())
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_strategy(mut self, strategy: Option<String>) -> Self {
        self.strategy = strategy.filter(|s| !s.trim().is_empty());
        self
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    #[inline]
    pub fn config(&self) -> Arc<CompressionConfig> {
        self.config.get()
    }

    pub fn set_config(&self, config: CompressionConfig) {
        self.config.store(config);
    }

    /// Set the level from its ordinal. Values outside `0..=4` are clamped.
    pub fn set_level(&self, level: i64) {
        let level = CompressionLevel::clamped(level);
        self.config.update(|c| c.level = level);
    }

    pub fn set_gzip_enabled(&self, enabled: bool) {
        self.config.update(|c| c.gzip = enabled);
    }

    pub fn set_banner(&self, enabled: bool) {
        self.config.update(|c| c.banner = enabled);
    }

    /// Ordinal of the configured level.
    pub fn level(&self) -> u8 {
        self.config.get().level.ordinal()
    }

    pub fn info(&self, accept_encoding: Option<&str>) -> ConfigInfo {
        ConfigInfo::new(
            &self.config.get(),
            self.environment,
            self.strategy.clone(),
            accept_encoding,
        )
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Compress a full response body.
    ///
    /// The content kind follows `content_type` (HTML when absent). `None`
    /// passes the content through; otherwise it is minified, pages get the
    /// banner, and the result is gzipped when both the config and the
    /// client's `Accept-Encoding` allow it.
    pub fn compress(
        &self,
        content: &str,
        content_type: Option<&str>,
        accept_encoding: Option<&str>,
    ) -> Encoded {
        let config = self.config.get();
        let level = config.level.resolve(content);
        if config.level == CompressionLevel::Auto {
            debug!("level"; "auto picked {} for {} bytes", level, content.len());
        }

        if level == CompressionLevel::None {
            return Encoded::plain(content.as_bytes().to_vec()).with_content_type(content_type);
        }

        let kind = kind_for_content_type(content_type);
        let minified = minify::minify(content, level, kind).output;
        let body = if config.banner && kind == ContentKind::Html {
            let mut body = String::with_capacity(BANNER.len() + minified.len());
            body.push_str(BANNER);
            body.push_str(&minified);
            body
        } else {
            minified
        };

        let gzip = config.gzip && transport::accepts_gzip(accept_encoding);
        transport::wrap(body.into_bytes(), gzip).with_content_type(content_type)
    }

    /// Minify at an explicit level. No banner, no gzip.
    pub fn compress_with_level(
        &self,
        content: &str,
        level: CompressionLevel,
        kind: ContentKind,
    ) -> String {
        minify::minify(content, level, kind).output
    }

    /// Serialize `data` as JSON and gzip it when allowed. No minification.
    pub fn compress_json<T: Serialize + ?Sized>(
        &self,
        data: &T,
        accept_encoding: Option<&str>,
    ) -> Result<Encoded, serde_json::Error> {
        let json = serde_json::to_vec(data)?;
        let gzip = self.config.get().gzip && transport::accepts_gzip(accept_encoding);
        Ok(transport::wrap(json, gzip).with_content_type(Some("application/json")))
    }

    /// Minify a component update: always `Extreme`, no banner, no gzip.
    pub fn compress_component(&self, content: &str) -> String {
        self.compress_with_level(content, CompressionLevel::Extreme, ContentKind::Html)
    }
}

fn kind_for_content_type(content_type: Option<&str>) -> ContentKind {
    let Some(ty) = content_type else {
        return ContentKind::Html;
    };
    let essence = ty.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match essence.as_str() {
        "text/css" => ContentKind::Css,
        "text/javascript" | "application/javascript" | "application/x-javascript" => ContentKind::Js,
        _ => ContentKind::Html,
    }
}
