//! SIGINT/SIGTERM handling
//!
//! Signals cancel the root [`CancellationToken`]; the serve loop and any
//! in-flight agent batches observe it and wind down.

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::{Handle, Signals};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancels a token when the process is asked to stop
pub struct SignalHandler {
    handle: Handle,
    task: JoinHandle<()>,
}

impl SignalHandler {
    /// Start listening; the first signal cancels `cancel`
    pub fn start(cancel: CancellationToken) -> std::io::Result<Self> {
        let signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();

        let task = tokio::spawn(async move {
            let mut signals = signals;
            while let Some(signal) = signals.next().await {
                if cancel.is_cancelled() {
                    warn!(signal, "second signal received, exiting immediately");
                    std::process::exit(130);
                }
                info!(signal, "shutdown requested");
                cancel.cancel();
            }
        });

        Ok(Self { handle, task })
    }
}

impl Drop for SignalHandler {
    fn drop(&mut self) {
        self.handle.close();
        self.task.abort();
    }
}
