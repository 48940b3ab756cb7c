//! Two-stage interrupt handling.

use tokio::signal;
use tokio::sync::watch;
use tracing::info;

pub const EXIT_CODE_INTERRUPT: i32 = 2;

/// Spawn the interrupt watcher. The first Ctrl-C flips the returned flag
/// so the transport stops polling and the pipeline unwinds; a second
/// Ctrl-C terminates the process immediately, bypassing cleanup. The flag
/// is a one-way broadcast: it never flips back.
pub fn install() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_err() {
            return;
        }
        info!("interrupt received, shutting down");
        let _ = tx.send(true);

        if signal::ctrl_c().await.is_ok() {
            info!("second interrupt, exiting immediately");
            std::process::exit(EXIT_CODE_INTERRUPT);
        }
    });
    rx
}
