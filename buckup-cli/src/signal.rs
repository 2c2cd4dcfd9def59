//! Ctrl-C handling while the provisioning sequence runs

use buckup_core::CancellationToken;
use log::warn;
use tokio::task::JoinHandle;

/// Cancel `token` on the first Ctrl-C. The call in flight finishes; the sequence
/// stops before the next one. Abort the handle once the sequence is done.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current AWS call");
            token.cancel();
        }
    })
}
