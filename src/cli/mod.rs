//! Command-line interface module.

mod args;
pub mod info;
pub mod minify;

pub use args::{Cli, Commands, MinifyArgs};
