//! Configuration types for rust-cast.
//!
//! [`RecordConfig`] holds everything a recording session needs to know up
//! front. Values are layered: built-in defaults, then an optional TOML file
//! ([`file`]), then `CAST_*` environment variables ([`env`]), then whatever
//! the command line sets explicitly.

pub mod env;
pub mod file;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{CastError, Result};

/// Asciicast format version written in every header.
pub const CAST_VERSION: u8 = 2;

/// Default idle time limit stored in the header, in seconds.
pub const DEFAULT_IDLE_TIME_LIMIT: f64 = 4.0;

/// `SHELL` recorded in the header when the environment has none.
pub const DEFAULT_HEADER_SHELL: &str = "/bin/bash";

/// `TERM` recorded in the header when the environment has none.
pub const DEFAULT_TERM: &str = "xterm-256color";

/// Shell that executes each block.
pub const DEFAULT_EXEC_SHELL: &str = rust_cast_pty::DEFAULT_SHELL;

/// Default terminal width.
pub const DEFAULT_TERMINAL_WIDTH: u16 = 80;

/// Default terminal height.
pub const DEFAULT_TERMINAL_HEIGHT: u16 = 24;

/// Clock advance after each captured output line, in seconds.
pub const OUTPUT_LINE_PACING: f64 = 0.01;

/// Upper bound (exclusive) of a human keystroke delay, in seconds.
pub const HUMAN_MAX_DELAY: f64 = 0.1;

/// Simulated shell prompt typed before the first line of a block.
pub const PROMPT: &str = "$ ";

/// Extension given to recordings when no output path is named.
pub const CAST_EXTENSION: &str = "cast";

/// How input lines are typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypingMode {
    /// Whole line at once, no delay.
    Instant,

    /// One character at a time with random delays.
    #[default]
    Human,
}

impl TypingMode {
    /// Name used in config files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Human => "human",
        }
    }
}

impl FromStr for TypingMode {
    type Err = CastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "instant" => Ok(Self::Instant),
            "human" => Ok(Self::Human),
            other => Err(CastError::config(format!(
                "unknown typing mode '{other}' (expected instant or human)"
            ))),
        }
    }
}

impl fmt::Display for TypingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How command output is captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Combined stdout/stderr through pipes.
    #[default]
    Plain,

    /// Terminal output through a PTY, escape sequences intact.
    Ansi,
}

impl CaptureMode {
    /// Name used in config files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Ansi => "ansi",
        }
    }
}

impl FromStr for CaptureMode {
    type Err = CastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "ansi" => Ok(Self::Ansi),
            other => Err(CastError::config(format!(
                "unknown capture mode '{other}' (expected plain or ansi)"
            ))),
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header fields that replace the detected values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderOverrides {
    /// Terminal width.
    pub width: Option<u16>,
    /// Terminal height.
    pub height: Option<u16>,
    /// Idle time limit in seconds.
    pub idle_time_limit: Option<f64>,
    /// Recording title.
    pub title: Option<String>,
    /// `SHELL` value for the header env.
    pub shell: Option<String>,
    /// `TERM` value for the header env.
    pub term: Option<String>,
}

impl HeaderOverrides {
    /// Create an empty set of overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the terminal size.
    #[must_use]
    pub const fn size(mut self, width: u16, height: u16) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the idle time limit.
    #[must_use]
    pub const fn idle_time_limit(mut self, seconds: f64) -> Self {
        self.idle_time_limit = Some(seconds);
        self
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the header `SHELL`.
    #[must_use]
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    /// Set the header `TERM`.
    #[must_use]
    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Take every field that `other` sets.
    pub fn merge(&mut self, other: Self) {
        self.width = other.width.or(self.width);
        self.height = other.height.or(self.height);
        self.idle_time_limit = other.idle_time_limit.or(self.idle_time_limit);
        self.title = other.title.or_else(|| self.title.take());
        self.shell = other.shell.or_else(|| self.shell.take());
        self.term = other.term.or_else(|| self.term.take());
    }
}

/// Configuration for one recording session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordConfig {
    /// Typing simulation.
    pub typing: TypingMode,

    /// Output capture mode.
    pub capture: CaptureMode,

    /// Sleep for simulated keystroke delays in real time.
    pub pace: bool,

    /// Seed for the keystroke delay generator.
    pub seed: Option<u64>,

    /// Shell that runs each block as `<shell> -c <block>`.
    pub shell: PathBuf,

    /// Header overrides.
    pub header: HeaderOverrides,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            typing: TypingMode::default(),
            capture: CaptureMode::default(),
            pace: false,
            seed: None,
            shell: PathBuf::from(DEFAULT_EXEC_SHELL),
            header: HeaderOverrides::default(),
        }
    }
}

impl RecordConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the typing mode.
    #[must_use]
    pub const fn typing(mut self, typing: TypingMode) -> Self {
        self.typing = typing;
        self
    }

    /// Set the capture mode.
    #[must_use]
    pub const fn capture(mut self, capture: CaptureMode) -> Self {
        self.capture = capture;
        self
    }

    /// Set whether delays are waited out in real time.
    #[must_use]
    pub const fn pace(mut self, pace: bool) -> Self {
        self.pace = pace;
        self
    }

    /// Seed the keystroke delay generator.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the execution shell.
    #[must_use]
    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Set the header overrides.
    #[must_use]
    pub fn header(mut self, header: HeaderOverrides) -> Self {
        self.header = header;
        self
    }

    /// Check values that would otherwise produce an unplayable cast.
    pub fn validate(&self) -> Result<()> {
        let bad_limit = |limit: &f64| !(limit.is_finite() && *limit > 0.0);
        if let Some(limit) = self.header.idle_time_limit.filter(bad_limit) {
            return Err(CastError::config(format!(
                "idle_time_limit must be a positive number of seconds, got {limit}"
            )));
        }
        if self.header.width == Some(0) || self.header.height == Some(0) {
            return Err(CastError::config("terminal width and height must be non-zero"));
        }
        if self.shell.as_os_str().is_empty() {
            return Err(CastError::config("execution shell must not be empty"));
        }
        Ok(())
    }
}
