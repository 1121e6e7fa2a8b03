//! Liveness and readiness flags.
//!
//! `ready` is written only by the store health task and the startup path;
//! handlers read it.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct HealthState {
    live: AtomicBool,
    keys_loaded: AtomicBool,
    store_ready: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// live=true, everything else not ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: AtomicBool::new(true),
            keys_loaded: AtomicBool::new(false),
            store_ready: AtomicBool::new(false),
        }
    }

    pub fn set_keys_loaded(&self) {
        self.keys_loaded.store(true, Ordering::SeqCst);
    }

    pub fn set_store_ready(&self, ready: bool) {
        self.store_ready.store(ready, Ordering::SeqCst);
    }

    /// Mark not ready during shutdown.
    pub fn set_not_ready(&self) {
        self.store_ready.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn keys_loaded(&self) -> bool {
        self.keys_loaded.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn store_ready(&self) -> bool {
        self.store_ready.load(Ordering::SeqCst)
    }

    /// Ready to serve traffic: signing keys loaded and the store reachable.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.keys_loaded() && self.store_ready()
    }
}
