//! Streaming cast writer.

use std::io::Write;

use tracing::trace;

use super::format::{CastHeader, Event};
use crate::error::{CastError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AwaitingHeader,
    Open,
    Finished,
}

/// Writes a header and then events, one line each, in call order.
///
/// The writer refuses anything that would produce an invalid cast: a second
/// header, an event before the header, an event earlier than the one before
/// it, or any write after [`CastWriter::finish`].
#[derive(Debug)]
pub struct CastWriter<W: Write> {
    inner: W,
    stage: Stage,
    events: usize,
    last_timestamp: Option<f64>,
}

impl<W: Write> CastWriter<W> {
    /// Wrap an output stream.
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            stage: Stage::AwaitingHeader,
            events: 0,
            last_timestamp: None,
        }
    }

    /// Write the header line. Must be the first write.
    pub fn write_header(&mut self, header: &CastHeader) -> Result<()> {
        match self.stage {
            Stage::AwaitingHeader => {}
            Stage::Open => return Err(CastError::writer_state("header already written")),
            Stage::Finished => return Err(CastError::writer_state("writer is finished")),
        }
        let line = header.to_json()?;
        writeln!(self.inner, "{line}")
            .map_err(|e| CastError::io_context("writing cast header", e))?;
        self.stage = Stage::Open;
        trace!(width = header.width, height = header.height, "wrote cast header");
        Ok(())
    }

    /// Append one event line.
    pub fn write_event(&mut self, event: &Event) -> Result<()> {
        match self.stage {
            Stage::Open => {}
            Stage::AwaitingHeader => {
                return Err(CastError::writer_state("event written before header"));
            }
            Stage::Finished => return Err(CastError::writer_state("writer is finished")),
        }
        if !event.timestamp.is_finite() {
            return Err(CastError::writer_state(format!(
                "event timestamp {} is not finite",
                event.timestamp
            )));
        }
        let previous = self.last_timestamp.unwrap_or(0.0);
        if event.timestamp < previous {
            return Err(CastError::TimestampRegression {
                previous,
                current: event.timestamp,
            });
        }

        writeln!(self.inner, "{}", event.to_json())
            .map_err(|e| CastError::io_context("writing cast event", e))?;
        self.last_timestamp = Some(event.timestamp);
        self.events += 1;
        Ok(())
    }

    /// Flush buffered lines to the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        self.inner
            .flush()
            .map_err(|e| CastError::io_context("flushing cast output", e))
    }

    /// Flush and refuse further writes.
    pub fn finish(&mut self) -> Result<()> {
        self.stage = Stage::Finished;
        self.flush()
    }

    /// Number of events written.
    #[must_use]
    pub const fn events_written(&self) -> usize {
        self.events
    }

    /// Timestamp of the last event written.
    #[must_use]
    pub const fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    /// Whether [`CastWriter::finish`] was called.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finished
    }

    /// Get a reference to the underlying stream.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
