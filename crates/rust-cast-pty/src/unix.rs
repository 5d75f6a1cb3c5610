//! Unix implementation of one-shot PTY capture.
//!
//! Works wherever `/dev/ptmx` is available (Linux, macOS, the BSDs).

mod child;
mod pty;

pub use child::spawn_in_pty;
pub use pty::PtyMaster;

use tracing::debug;

use crate::PtyCapture;
use crate::config::PtyConfig;
use crate::error::{PtyError, Result};

/// Run `command` through the configured shell inside a fresh PTY and
/// collect everything it writes to the terminal.
///
/// There is no timeout: a command that never exits, or that waits for
/// input on the terminal, blocks this call indefinitely.
pub async fn capture(command: &str, config: &PtyConfig) -> Result<PtyCapture> {
    let (master, slave) = PtyMaster::open()?;
    master.set_window_size(config.window_size)?;

    let mut child = spawn_in_pty(&slave, command, config)?;
    // The master only sees EOF once our copy of the slave is gone too.
    drop(slave);
    debug!(pid = child.id(), "spawned command in pty");

    let output = master.read_to_end().await?;
    let status = child.wait().await.map_err(PtyError::Wait)?;

    Ok(PtyCapture {
        output,
        status: status.into(),
    })
}
