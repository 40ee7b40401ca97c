//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;
use wirepress::{CompressionLevel, ContentKind};

/// Markup, script and style compression engine
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: wirepress.toml)
    #[arg(short = 'C', long, global = true, default_value = "wirepress.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Minify files or stdin
    #[command(visible_alias = "m")]
    Minify {
        #[command(flatten)]
        args: MinifyArgs,
    },

    /// Show the effective compression settings
    #[command(visible_alias = "i")]
    Info {
        /// Accept-Encoding value to test gzip negotiation against
        #[arg(short, long)]
        accept_encoding: Option<String>,
    },
}

/// Minify command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct MinifyArgs {
    /// Files to minify. If omitted (or `-`), reads stdin.
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Compression level, 0-4 or none/auto/basic/aggressive/extreme
    /// (default: level from config)
    #[arg(short, long)]
    pub level: Option<CompressionLevel>,

    /// Content kind: html, js or css (default: from file extension, else html)
    #[arg(short, long)]
    pub kind: Option<ContentKind>,

    /// Write results into this directory instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Component mode: always extreme
    #[arg(long)]
    pub component: bool,

    /// gzip the output (adds `.gz` in the output directory)
    #[arg(short, long)]
    pub gzip: bool,
}

impl MinifyArgs {
    /// True when input comes from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.files.is_empty() || (self.files.len() == 1 && self.files[0].as_os_str() == "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minify() {
        let cli = Cli::parse_from([
            "wirepress", "minify", "-l", "aggressive", "-k", "css", "--gzip", "a.css", "b.css",
        ]);
        let Commands::Minify { args } = cli.command else {
            panic!("expected minify");
        };
        assert_eq!(args.level, Some(CompressionLevel::Aggressive));
        assert_eq!(args.kind, Some(ContentKind::Css));
        assert!(args.gzip);
        assert_eq!(args.files.len(), 2);
        assert!(!args.reads_stdin());
    }

    #[test]
    fn test_parse_numeric_level_and_globals() {
        let cli = Cli::parse_from(["wirepress", "minify", "-l", "4", "-", "-v", "-C", "x.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        let Commands::Minify { args } = cli.command else {
            panic!("expected minify");
        };
        assert_eq!(args.level, Some(CompressionLevel::Extreme));
        assert!(args.reads_stdin());
    }

    #[test]
    fn test_parse_info() {
        let cli = Cli::parse_from(["wirepress", "info", "--accept-encoding", "gzip"]);
        assert!(matches!(
            cli.command,
            Commands::Info { accept_encoding: Some(ref v) } if v == "gzip"
        ));
    }

    #[test]
    fn test_invalid_level_rejected() {
        assert!(Cli::try_parse_from(["wirepress", "minify", "-l", "loud"]).is_err());
    }
}
