//! Compression configuration for `wirepress.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── types/      # ConfigError, ConfigHandle
//! └── mod.rs      # CompressionConfig, Environment, ConfigInfo (this file)
//! ```
//!
//! # Example
//!
//! ```toml
//! [compression]
//! level = "aggressive"   # or 0..=4
//! gzip = true
//! banner = true
//! ```
//!
//! Without a config file, `WIREPRESS_ENV` (then `APP_ENV`) selects a preset:
//!
//! | Environment   | Level        | gzip |
//! |---------------|--------------|------|
//! | `development` | `None`       | no   |
//! | `staging`     | `Basic`      | yes  |
//! | `production`  | `Aggressive` | yes  |

pub mod types;

pub use types::{ConfigError, ConfigHandle};

use crate::level::CompressionLevel;
use crate::transport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Environment variable holding the deployment environment.
pub const ENV_VAR: &str = "WIREPRESS_ENV";
/// Fallback environment variable shared with other tooling.
pub const APP_ENV_VAR: &str = "APP_ENV";
/// Minifier strategy override, read once at startup.
pub const STRATEGY_VAR: &str = "WIREPRESS_STRATEGY";

// ============================================================================
// root configuration
// ============================================================================

/// Root structure of `wirepress.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    compression: CompressionConfig,
}

/// `[compression]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Level used by `compress` (default `auto`).
    pub level: CompressionLevel,

    /// Allow gzip when the client accepts it.
    pub gzip: bool,

    /// Prepend the advisory banner to compressed pages.
    pub banner: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            level: CompressionLevel::Auto,
            gzip: true,
            banner: true,
        }
    }
}

impl CompressionConfig {
    /// Parse the contents of a `wirepress.toml`.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.compression)
    }

    /// Load `[compression]` from a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Config file if present, else the preset of the detected environment.
    pub fn resolve(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }
        match Environment::from_env()? {
            Some(env) => Ok(Self::for_environment(env)),
            None => Ok(Self::default()),
        }
    }

    /// Preset for a deployment environment.
    pub fn for_environment(env: Environment) -> Self {
        let (level, gzip) = match env {
            Environment::Development => (CompressionLevel::None, false),
            Environment::Staging => (CompressionLevel::Basic, true),
            Environment::Production => (CompressionLevel::Aggressive, true),
        };
        Self {
            level,
            gzip,
            ..Self::default()
        }
    }

    /// Explicit level and gzip flag. Out-of-range levels are clamped.
    pub fn custom(level: i64, gzip: bool) -> Self {
        Self {
            level: CompressionLevel::clamped(level),
            gzip,
            ..Self::default()
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    /// Environment named by `WIREPRESS_ENV`, then `APP_ENV`, if any is set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_vars(
            std::env::var(ENV_VAR).ok().as_deref(),
            std::env::var(APP_ENV_VAR).ok().as_deref(),
        )
    }

    /// Like [`from_env`](Self::from_env) with the variable values passed in.
    ///
    /// An unknown name in `WIREPRESS_ENV` is an error; an unknown `APP_ENV`
    /// belongs to some other tool and counts as production.
    pub fn from_vars(own: Option<&str>, app: Option<&str>) -> Result<Option<Self>, ConfigError> {
        if let Some(own) = own.filter(|v| !v.trim().is_empty()) {
            return own.parse().map(Some);
        }
        Ok(app
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse().unwrap_or_default()))
    }

    /// Detected environment, production when nothing is set.
    pub fn detect() -> Self {
        Self::from_env().ok().flatten().unwrap_or_default()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "staging" | "stage" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::Validation(format!(
                "unknown environment `{other}` (expected development, staging or production)"
            ))),
        }
    }
}

// ============================================================================
// Info
// ============================================================================

/// Effective settings as reported by `wirepress info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigInfo {
    pub environment: Environment,
    pub level: CompressionLevel,
    pub gzip_enabled: bool,
    pub banner: bool,
    /// The encoder is compiled in, so this is always true.
    pub gzip_supported: bool,
    pub client_accepts_gzip: bool,
    /// Raw `WIREPRESS_STRATEGY`. Only the native strategy exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

impl ConfigInfo {
    pub fn new(
        config: &CompressionConfig,
        environment: Environment,
        strategy: Option<String>,
        accept_encoding: Option<&str>,
    ) -> Self {
        Self {
            environment,
            level: config.level,
            gzip_enabled: config.gzip,
            banner: config.banner,
            gzip_supported: true,
            client_accepts_gzip: transport::accepts_gzip(accept_encoding),
            strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CompressionConfig::default();
        assert_eq!(config.level, CompressionLevel::Auto);
        assert!(config.gzip);
        assert!(config.banner);
        assert_eq!(CompressionConfig::from_str("").unwrap(), config);
    }

    #[test]
    fn test_parse_level_forms() {
        let config = CompressionConfig::from_str("[compression]\nlevel = \"extreme\"\ngzip = false").unwrap();
        assert_eq!(config.level, CompressionLevel::Extreme);
        assert!(!config.gzip);

        let config = CompressionConfig::from_str("[compression]\nlevel = 2").unwrap();
        assert_eq!(config.level, CompressionLevel::Basic);

        let config = CompressionConfig::from_str("[compression]\nlevel = 42").unwrap();
        assert_eq!(config.level, CompressionLevel::Extreme);
    }

    #[test]
    fn test_parse_error() {
        let err = CompressionConfig::from_str("[compression]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[compression]\nlevel = \"basic\"\nbanner = false").unwrap();
        let config = CompressionConfig::load(file.path()).unwrap();
        assert_eq!(config.level, CompressionLevel::Basic);
        assert!(config.gzip);
        assert!(!config.banner);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = CompressionConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io(p, _) if p == path));
    }

    #[test]
    fn test_environment_presets() {
        let dev = CompressionConfig::for_environment(Environment::Development);
        assert_eq!((dev.level, dev.gzip), (CompressionLevel::None, false));
        let staging = CompressionConfig::for_environment(Environment::Staging);
        assert_eq!((staging.level, staging.gzip), (CompressionLevel::Basic, true));
        let prod = CompressionConfig::for_environment(Environment::Production);
        assert_eq!((prod.level, prod.gzip), (CompressionLevel::Aggressive, true));
    }

    #[test]
    fn test_custom_clamps() {
        let config = CompressionConfig::custom(9, false);
        assert_eq!(config.level, CompressionLevel::Extreme);
        assert!(!config.gzip);
        assert_eq!(CompressionConfig::custom(-1, true).level, CompressionLevel::None);
    }

    #[test]
    fn test_environment_from_vars() {
        assert_eq!(Environment::from_vars(None, None).unwrap(), None);
        assert_eq!(
            Environment::from_vars(Some("staging"), Some("development")).unwrap(),
            Some(Environment::Staging)
        );
        assert_eq!(
            Environment::from_vars(None, Some("development")).unwrap(),
            Some(Environment::Development)
        );
        assert_eq!(
            Environment::from_vars(Some(" "), Some("whatever")).unwrap(),
            Some(Environment::Production)
        );
        assert!(Environment::from_vars(Some("qa"), None).is_err());
    }

    #[test]
    fn test_info() {
        let config = CompressionConfig::for_environment(Environment::Staging);
        let info = ConfigInfo::new(&config, Environment::Staging, None, Some("gzip, br"));
        assert_eq!(info.environment, Environment::Staging);
        assert_eq!(info.level, CompressionLevel::Basic);
        assert!(info.gzip_supported);
        assert!(info.client_accepts_gzip);

        let rendered = toml::to_string(&info).unwrap();
        assert!(rendered.contains("environment = \"staging\""));
        assert!(rendered.contains("level = \"basic\""));
        assert!(!rendered.contains("strategy"));
    }
}
