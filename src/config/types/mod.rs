//! Configuration utility types.
//!
//! | Module   | Purpose                                  |
//! |----------|------------------------------------------|
//! | `error`  | Configuration error types                |
//! | `handle` | Shared configuration handle (lock-free)  |

mod error;
pub mod handle;

pub use error::ConfigError;
pub use handle::ConfigHandle;
