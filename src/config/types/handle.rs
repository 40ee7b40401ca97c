//! Shared config with atomic replacement.
//!
//! Uses `arc-swap` for lock-free reads: every compression call does one
//! `load`, and setters swap in a whole new value.

use crate::config::CompressionConfig;
use arc_swap::ArcSwap;
use std::sync::Arc;

#[derive(Debug)]
pub struct ConfigHandle {
    inner: ArcSwap<CompressionConfig>,
}

impl ConfigHandle {
    pub fn new(config: CompressionConfig) -> Self {
        Self {
            inner: ArcSwap::from_pointee(config),
        }
    }

    /// Snapshot of the current config.
    #[inline]
    pub fn get(&self) -> Arc<CompressionConfig> {
        self.inner.load_full()
    }

    /// Replace the whole config.
    pub fn store(&self, config: CompressionConfig) {
        self.inner.store(Arc::new(config));
    }

    /// Apply `f` to a copy of the current config and publish the result.
    pub fn update(&self, f: impl Fn(&mut CompressionConfig)) {
        self.inner.rcu(|current| {
            let mut next = CompressionConfig::clone(current);
            f(&mut next);
            next
        });
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new(CompressionConfig::default())
    }
}
