//! Graceful shutdown signal shared by the subscriber, coordinator, and
//! scheduler tasks. Shutdown propagates to any in-flight coordinator call.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Marker type sent through the event system to signal that an orderly
/// shutdown should begin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Shutdown;

/// A cheaply-cloneable broadcast of the shutdown signal.
///
/// `ShutdownHandle::listen` returns a future that resolves once
/// [`ShutdownHandle::trigger`] has been called (or the OS delivers SIGINT),
/// so every long-running task can `tokio::select!` on it alongside its own
/// work.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Spawns a task that triggers shutdown when the process receives
    /// ctrl-c / SIGINT. Exit code handling happens in `app`.
    pub fn watch_ctrl_c(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested (ctrl-c)");
            let _ = tx.send(true);
        });
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once shutdown has been triggered.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}
