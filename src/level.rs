//! Compression levels and automatic level selection.
//!
//! Levels form a total order. A higher level applies every transformation of
//! the lower ones, except where a step is gated (full script and style
//! minification only starts at [`CompressionLevel::Aggressive`]).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Payloads below this size are compressed at `Basic` when `Auto` is requested.
pub const AUTO_BASIC_LIMIT: usize = 1024;

/// Payloads below this size (and at least [`AUTO_BASIC_LIMIT`]) get `Aggressive`.
pub const AUTO_AGGRESSIVE_LIMIT: usize = 10240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum CompressionLevel {
    /// Pass-through.
    None = 0,
    /// Pick a concrete level from the payload size.
    #[default]
    Auto = 1,
    Basic = 2,
    Aggressive = 3,
    Extreme = 4,
}

impl CompressionLevel {
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::Auto,
        Self::Basic,
        Self::Aggressive,
        Self::Extreme,
    ];

    /// Convert an integer into a level, clamping out-of-range values into `0..=4`.
    pub fn clamped(value: i64) -> Self {
        match value.clamp(0, 4) {
            0 => Self::None,
            1 => Self::Auto,
            2 => Self::Basic,
            3 => Self::Aggressive,
            _ => Self::Extreme,
        }
    }

    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Auto => "auto",
            Self::Basic => "basic",
            Self::Aggressive => "aggressive",
            Self::Extreme => "extreme",
        }
    }

    /// Map a payload size to a concrete level.
    pub fn for_size(len: usize) -> Self {
        if len < AUTO_BASIC_LIMIT {
            Self::Basic
        } else if len < AUTO_AGGRESSIVE_LIMIT {
            Self::Aggressive
        } else {
            Self::Extreme
        }
    }

    /// Resolve `Auto` against the content; concrete levels are returned as-is.
    #[inline]
    pub fn resolve(self, content: &str) -> Self {
        match self {
            Self::Auto => Self::for_size(content.len()),
            level => level,
        }
    }

    /// True for `Aggressive` and `Extreme`.
    #[inline]
    pub fn is_aggressive(self) -> bool {
        self >= Self::Aggressive
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a level string is neither a name nor an integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown compression level `{0}` (expected 0-4 or none/auto/basic/aggressive/extreme)")]
pub struct ParseLevelError(pub String);

impl FromStr for CompressionLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Ok(Self::clamped(n));
        }
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl Serialize for CompressionLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for CompressionLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Ok(Self::clamped(n)),
            Raw::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}
