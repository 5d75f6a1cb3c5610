//! rust-cast-pty: one-shot pseudo-terminal capture
//!
//! Runs a single shell command with a pseudo-terminal as its controlling
//! terminal and returns the raw bytes it wrote, escape sequences included,
//! together with its exit status. This is what lets a recording keep the
//! colors and cursor codes a program emits when it believes it is talking
//! to a real terminal.
//!
//! # Platform Support
//!
//! - **Unix**: `rustix` for PTY allocation, tokio `AsyncFd` for reading
//! - **Other platforms**: [`capture`] returns [`PtyError::Unsupported`]
//!
//! # Example
//!
//! ```ignore
//! use rust_cast_pty::{PtyConfig, capture};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), rust_cast_pty::PtyError> {
//!     let captured = capture("ls --color=always", &PtyConfig::default()).await?;
//!     print!("{}", captured.text());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod status;

#[cfg(unix)]
pub mod unix;

pub use config::{DEFAULT_SHELL, PtyConfig, PtyConfigBuilder, WindowSize};
pub use error::{PtyError, Result};
pub use status::ExitStatus;

/// Output and exit status of one command run inside a PTY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtyCapture {
    /// Raw bytes read from the master side.
    pub output: Vec<u8>,
    /// How the shell exited.
    pub status: ExitStatus,
}

impl PtyCapture {
    /// The output decoded as UTF-8, invalid sequences replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

/// Run `command` through the configured shell inside a fresh PTY.
///
/// # Errors
///
/// Returns an error if the PTY cannot be allocated, the shell cannot be
/// spawned, or reading its output fails. A non-zero exit status is not an
/// error; it is reported in [`PtyCapture::status`].
#[cfg(unix)]
pub async fn capture(command: &str, config: &PtyConfig) -> Result<PtyCapture> {
    unix::capture(command, config).await
}

/// Run `command` through the configured shell inside a fresh PTY.
///
/// # Errors
///
/// Always returns [`PtyError::Unsupported`] on this platform.
#[cfg(not(unix))]
pub async fn capture(_command: &str, _config: &PtyConfig) -> Result<PtyCapture> {
    Err(PtyError::Unsupported)
}
