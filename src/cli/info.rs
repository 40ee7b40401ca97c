//! `wirepress info`: print the effective settings.

use anyhow::{Context, Result};
use wirepress::Compressor;

pub fn run_info(compressor: &Compressor, accept_encoding: Option<&str>) -> Result<()> {
    let info = compressor.info(accept_encoding);
    let rendered = toml::to_string_pretty(&info).context("failed to render settings")?;
    print!("{rendered}");
    Ok(())
}
