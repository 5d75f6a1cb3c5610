//! Convenient re-exports for common rust-cast usage.
//!
//! ```ignore
//! use rust_cast::prelude::*;
//! ```

// Configuration
pub use crate::config::{CaptureMode, HeaderOverrides, RecordConfig, TypingMode};

// Error handling
pub use crate::error::{CastError, Result};

// Recording
pub use crate::caster::{Caster, RecordSummary, SessionState};
pub use crate::script::Script;

// Casts
pub use crate::cast::{Cast, CastHeader, CastWriter, Event, read_cast};
