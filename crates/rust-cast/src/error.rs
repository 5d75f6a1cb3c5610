//! Error types for rust-cast.
//!
//! Everything that can abort a recording is a [`CastError`]. A command that
//! exits with a non-zero status is deliberately not one of them: its output
//! is recorded like any other and the status is only logged.

use std::path::{Path, PathBuf};

use rust_cast_pty::PtyError;
use thiserror::Error;

/// The main error type for rust-cast operations.
#[derive(Debug, Error)]
pub enum CastError {
    /// The input script could not be read.
    #[error("failed to read script {}: {source}", path.display())]
    InputRead {
        /// Path of the script.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the recording failed.
    #[error("{context}: {source}")]
    OutputWrite {
        /// What was being written.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A computed delay was negative or not finite.
    #[error("invalid delay {delay}: delays must be finite and non-negative")]
    InvalidDelay {
        /// The offending delay in seconds.
        delay: f64,
    },

    /// The host shell could not be started.
    #[error("failed to run {shell} for command '{command}': {source}")]
    Spawn {
        /// The shell that was invoked.
        shell: String,
        /// The command line handed to it.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// ANSI-preserving capture failed to set up its pseudo-terminal.
    #[error("pty capture failed: {0}")]
    Pty(#[from] PtyError),

    /// The writer was used out of order.
    #[error("cast writer misuse: {message}")]
    WriterState {
        /// What went wrong.
        message: String,
    },

    /// An event would have moved time backwards.
    #[error("timestamp regression: {current:.6} follows {previous:.6}")]
    TimestampRegression {
        /// Timestamp of the last event written.
        previous: f64,
        /// Timestamp of the rejected event.
        current: f64,
    },

    /// The session already recorded a script.
    #[error("recording session is already done; create a new caster")]
    SessionFinished,

    /// A recorded cast could not be parsed.
    #[error("malformed cast at line {line}: {message}")]
    MalformedCast {
        /// One-based line number.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// The built-in self test produced an unexpected recording.
    #[error("self test failed: {message}")]
    SelfTest {
        /// What did not match.
        message: String,
    },

    /// The requested feature does not exist yet.
    #[error("not implemented: {feature}")]
    NotImplemented {
        /// The missing feature.
        feature: String,
    },
}

/// Result type alias for rust-cast operations.
pub type Result<T> = std::result::Result<T, CastError>;

impl CastError {
    /// Create an input read error.
    pub fn input_read(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::InputRead {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an output write error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::OutputWrite {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid delay error.
    #[must_use]
    pub const fn invalid_delay(delay: f64) -> Self {
        Self::InvalidDelay { delay }
    }

    /// Create a writer state error.
    pub fn writer_state(message: impl Into<String>) -> Self {
        Self::WriterState {
            message: message.into(),
        }
    }

    /// Create a malformed cast error.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedCast {
            line,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a self test failure.
    pub fn self_test(message: impl Into<String>) -> Self {
        Self::SelfTest {
            message: message.into(),
        }
    }

    /// Create a not-implemented error.
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Check if this error was raised before any output could be written.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InputRead { .. } | Self::Config { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_read_names_path() {
        let err = CastError::input_read(
            "demo.sh",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("demo.sh"));
        assert!(msg.contains("no such file"));
        assert!(err.is_input_error());
    }

    #[test]
    fn io_context_message() {
        let err = CastError::io_context(
            "writing cast event",
            std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
        );
        assert_eq!(err.to_string(), "writing cast event: disk full");
        assert!(!err.is_input_error());
    }

    #[test]
    fn regression_uses_fixed_precision() {
        let err = CastError::TimestampRegression {
            previous: 1.5,
            current: 1.25,
        };
        assert_eq!(
            err.to_string(),
            "timestamp regression: 1.250000 follows 1.500000"
        );
    }

    #[test]
    fn not_implemented_message() {
        let err = CastError::not_implemented("replay test");
        assert_eq!(err.to_string(), "not implemented: replay test");
    }
}
