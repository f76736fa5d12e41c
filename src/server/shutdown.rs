//! Cooperative shutdown flag tripped by Ctrl-C / SIGTERM.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tracing::info;

/// Cloneable handle shared between the signal watcher and server workers.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the server to stop accepting requests.
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Register interrupt and terminate handlers, then spawn a watcher
    /// thread that trips this flag on the first one delivered.
    ///
    /// The handlers are installed before this returns, so a signal that
    /// arrives while the watcher thread is still starting is not lost. The
    /// watcher drives a current-thread tokio runtime used only for signal
    /// delivery; request handling stays on the synchronous worker pool.
    pub fn install_signal_handlers(&self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build signal runtime")?;

        let mut signals = {
            let _guard = runtime.enter();
            Signals::register().context("failed to register signal handlers")?
        };

        let handle = self.clone();
        std::thread::Builder::new()
            .name("newscheck-signals".to_string())
            .spawn(move || {
                runtime.block_on(signals.recv());
                info!("shutdown signal received");
                handle.trigger();
            })
            .context("failed to spawn signal watcher")?;

        Ok(())
    }
}

/// Registered shutdown signal streams.
#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    /// Must run inside the signal runtime's context.
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {}
            _ = self.terminate.recv() => {}
        }
    }
}

#[cfg(windows)]
struct Signals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl Signals {
    fn register() -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(&mut self) {
        self.ctrl_c.recv().await;
    }
}
