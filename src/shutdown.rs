// Graceful shutdown handling for signal trapping

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared shutdown state across the application
#[derive(Clone)]
pub struct ShutdownState {
    /// Flag indicating shutdown has been requested
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownState {
    /// Create a new shutdown state
    pub fn new() -> Self {
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request a shutdown
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        log::info!("Shutdown requested");
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Reset shutdown state (for testing)
    pub fn reset(&self) {
        self.shutdown_requested.store(false, Ordering::SeqCst);
    }
}

impl Default for ShutdownState {
    fn default() -> Self {
        Self::new()
    }
}

/// Register signal handlers for graceful shutdown
/// This sets up handlers for SIGINT (Ctrl+C), SIGTERM, and SIGHUP
#[cfg(unix)]
pub fn register_signal_handlers(state: ShutdownState) -> Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::thread;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])
        .map_err(|e| anyhow::anyhow!("Failed to register signal handlers: {}", e))?;

    thread::spawn(move || {
        for signal in signals.forever() {
            match signal {
                SIGINT => {
                    log::info!("Received SIGINT (Ctrl+C)");
                    state.request_shutdown();
                }
                SIGTERM => {
                    log::info!("Received SIGTERM");
                    state.request_shutdown();
                }
                SIGHUP => {
                    log::info!("Received SIGHUP");
                    state.request_shutdown();
                }
                _ => {}
            }
        }
    });

    log::info!("Signal handlers registered (SIGINT, SIGTERM, SIGHUP)");
    Ok(())
}

/// Register signal handlers for Windows
#[cfg(windows)]
pub fn register_signal_handlers(state: ShutdownState) -> Result<()> {
    ctrlc::set_handler(move || {
        log::info!("Received Ctrl+C");
        state.request_shutdown();
    })
    .map_err(|e| anyhow::anyhow!("Failed to register Ctrl+C handler: {}", e))?;

    log::info!("Signal handler registered (Ctrl+C)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_state_new() {
        let state = ShutdownState::new();
        assert!(!state.is_shutdown_requested());
    }

    #[test]
    fn test_request_shutdown() {
        let state = ShutdownState::new();
        state.request_shutdown();
        assert!(state.is_shutdown_requested());
    }

    #[test]
    fn test_shutdown_state_clone_shares_flag() {
        let state1 = ShutdownState::new();
        let state2 = state1.clone();

        state1.request_shutdown();
        assert!(state2.is_shutdown_requested());
    }

    #[test]
    fn test_shutdown_state_reset() {
        let state = ShutdownState::new();
        state.request_shutdown();
        state.reset();
        assert!(!state.is_shutdown_requested());
    }
}
