//! Error types for the rust-cast-pty crate.

use std::io;

/// The error type for PTY capture.
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    /// Failed to allocate the master/slave pair.
    #[error("failed to create PTY: {0}")]
    Create(#[source] io::Error),

    /// Failed to spawn the shell on the slave side.
    #[error("failed to spawn process: {0}")]
    Spawn(#[source] io::Error),

    /// An I/O error occurred while reading the master side.
    #[error("PTY I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to apply the window size.
    #[error("failed to resize PTY: {0}")]
    Resize(#[source] io::Error),

    /// Failed to wait for the child process.
    #[error("failed to wait for child: {0}")]
    Wait(#[source] io::Error),

    /// Pseudo-terminals are not available on this platform.
    #[error("PTY capture is not supported on this platform")]
    Unsupported,
}

/// A specialized Result type for PTY operations.
pub type Result<T> = std::result::Result<T, PtyError>;

/// Convert a rustix errno into a plain I/O error.
#[cfg(unix)]
pub(crate) fn errno(e: rustix::io::Errno) -> io::Error {
    io::Error::from_raw_os_error(e.raw_os_error())
}
