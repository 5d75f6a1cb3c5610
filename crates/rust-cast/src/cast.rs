//! Asciicast v2 recordings.
//!
//! A cast is one JSON header object followed by one `[time, code, data]`
//! array per event, each on its own line.

pub mod format;
pub mod reader;
pub mod writer;

pub use format::{CastHeader, Channel, Event, HeaderEnv};
pub use reader::{Cast, parse_cast, read_cast};
pub use writer::CastWriter;
