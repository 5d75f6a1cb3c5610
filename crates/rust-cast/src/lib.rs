//! rust-cast: replay shell scripts as asciicast recordings
//!
//! This crate takes a script of shell commands, types each command as a
//! person would, runs it for real, and records both the keystrokes and the
//! command output as an [asciicast v2] file that any compatible player can
//! show.
//!
//! # Features
//!
//! - **Blank-line blocks**: each group of non-empty lines is one command
//! - **Human or instant typing** with seeded, reproducible delays
//! - **Plain or ANSI capture**: pipes, or a PTY that keeps colors intact
//! - **Monotonic timestamps** enforced by the writer
//! - **Layered configuration**: TOML file, `CAST_*` variables, builder
//!
//! # Example
//!
//! ```ignore
//! use rust_cast::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let config = RecordConfig::new().typing(TypingMode::Instant);
//!     let mut caster = Caster::new(config);
//!     caster.record_file("demo.sh", "demo.cast").await?;
//!     Ok(())
//! }
//! ```
//!
//! [asciicast v2]: https://docs.asciinema.org/manual/asciicast/v2/

pub mod capture;
pub mod cast;
pub mod caster;
pub mod clock;
pub mod config;
pub mod error;
pub mod prelude;
pub mod script;
pub mod typist;

pub use capture::{Capture, OutputCapturer};
pub use cast::{Cast, CastHeader, CastWriter, Channel, Event, HeaderEnv, parse_cast, read_cast};
pub use caster::{
    Caster, RecordSummary, SessionState, default_output_path, replay_test, self_test,
};
pub use clock::{ManualTime, SystemTime, TimeSource, TypingClock};
pub use config::env::EnvConfig;
pub use config::file::load_config;
pub use config::{CaptureMode, HeaderOverrides, RecordConfig, TypingMode};
pub use error::{CastError, Result};
pub use script::{Block, Blocks, Script};
pub use typist::{Delay, Keystroke, Typist};
