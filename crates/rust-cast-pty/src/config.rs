//! Configuration for a single PTY capture.
//!
//! [`PtyConfig`] names the shell that interprets the command and the window
//! size the child sees.

use std::path::PathBuf;

/// Shell used when none is configured.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Configuration for running one command in a PTY.
///
/// # Example
///
/// ```
/// use rust_cast_pty::PtyConfig;
///
/// let config = PtyConfig::builder()
///     .shell("/bin/bash")
///     .window_size(100, 30)
///     .build();
/// assert_eq!(config.window_size.cols, 100);
/// ```
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Shell invoked as `<shell> -c <command>`.
    pub shell: PathBuf,

    /// Window size reported to the child.
    pub window_size: WindowSize,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            shell: PathBuf::from(DEFAULT_SHELL),
            window_size: WindowSize::default(),
        }
    }
}

impl PtyConfig {
    /// Create a new builder for `PtyConfig`.
    #[must_use]
    pub fn builder() -> PtyConfigBuilder {
        PtyConfigBuilder::default()
    }
}

/// Builder for [`PtyConfig`].
#[derive(Debug, Clone, Default)]
pub struct PtyConfigBuilder {
    config: PtyConfig,
}

impl PtyConfigBuilder {
    /// Set the shell.
    #[must_use]
    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.config.shell = shell.into();
        self
    }

    /// Set the window size in columns and rows.
    #[must_use]
    pub const fn window_size(mut self, cols: u16, rows: u16) -> Self {
        self.config.window_size = WindowSize::new(cols, rows);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> PtyConfig {
        self.config
    }
}

/// Terminal window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    /// Number of columns.
    pub cols: u16,
    /// Number of rows.
    pub rows: u16,
}

impl WindowSize {
    /// Create a new window size.
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}
