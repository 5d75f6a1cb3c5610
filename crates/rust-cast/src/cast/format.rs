//! Cast header and event definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{CAST_VERSION, DEFAULT_HEADER_SHELL, DEFAULT_IDLE_TIME_LIMIT, DEFAULT_TERM};
use crate::error::{CastError, Result};

/// First line of a cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastHeader {
    /// Format version, always 2.
    pub version: u8,
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Recording start, Unix seconds.
    #[serde(default)]
    pub timestamp: u64,
    /// Longest pause a player shows, in seconds.
    #[serde(default = "default_idle_time_limit")]
    pub idle_time_limit: f64,
    /// Environment of the recording.
    #[serde(default)]
    pub env: HeaderEnv,
    /// Recording title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

const fn default_idle_time_limit() -> f64 {
    DEFAULT_IDLE_TIME_LIMIT
}

impl CastHeader {
    /// Create a header with default limits and environment.
    #[must_use]
    pub fn new(width: u16, height: u16, timestamp: u64) -> Self {
        Self {
            version: CAST_VERSION,
            width,
            height,
            timestamp,
            idle_time_limit: DEFAULT_IDLE_TIME_LIMIT,
            env: HeaderEnv::default(),
            title: None,
        }
    }

    /// Encode as a single JSON line, without the newline.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CastError::io_context("serializing cast header", e.into()))
    }
}

/// The `env` object of a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEnv {
    /// Login shell.
    #[serde(rename = "SHELL", default)]
    pub shell: String,
    /// Terminal type.
    #[serde(rename = "TERM", default)]
    pub term: String,
}

impl Default for HeaderEnv {
    fn default() -> Self {
        Self {
            shell: DEFAULT_HEADER_SHELL.to_string(),
            term: DEFAULT_TERM.to_string(),
        }
    }
}

/// Stream an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Terminal output. Simulated keystrokes use this channel too.
    Output,
    /// Keyboard input.
    Input,
}

impl Channel {
    /// Single-letter code used in the event array.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Output => "o",
            Self::Input => "i",
        }
    }

    /// Look up a channel by its code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "o" => Some(Self::Output),
            "i" => Some(Self::Input),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One timestamped event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Seconds since the header timestamp.
    pub timestamp: f64,
    /// Stream the data belongs to.
    pub channel: Channel,
    /// The text.
    pub data: String,
}

impl Event {
    /// Create an output event.
    pub fn output(timestamp: f64, data: impl Into<String>) -> Self {
        Self {
            timestamp,
            channel: Channel::Output,
            data: data.into(),
        }
    }

    /// Create an input event.
    pub fn input(timestamp: f64, data: impl Into<String>) -> Self {
        Self {
            timestamp,
            channel: Channel::Input,
            data: data.into(),
        }
    }

    /// Encode as a single JSON array, without the newline.
    ///
    /// Timestamps always carry six decimal digits.
    #[must_use]
    pub fn to_json(&self) -> String {
        format!(
            "[{:.6}, \"{}\", {}]",
            self.timestamp,
            self.channel.code(),
            serde_json::Value::from(self.data.as_str())
        )
    }
}
