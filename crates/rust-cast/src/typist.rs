//! Simulated typing of script lines.
//!
//! The [`Typist`] turns each line of a block into [`Keystroke`]s stamped by
//! the session [`TypingClock`]. With a [`Delay::Sampled`] policy every
//! character is its own keystroke, each one after its own delay; with a zero
//! [`Delay::Fixed`] policy the line appears in one piece.

use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::TypingClock;
use crate::config::{HUMAN_MAX_DELAY, OUTPUT_LINE_PACING, PROMPT, TypingMode};
use crate::error::Result;
use crate::script::Block;

/// Terminator typed after every line.
pub const LINE_END: &str = "\r\n";

/// Per-character delay policy, in seconds.
pub enum Delay {
    /// The same delay for every character. Zero types whole lines at once.
    Fixed(f64),
    /// A fresh delay drawn for every character.
    Sampled(Box<dyn FnMut() -> f64 + Send>),
}

impl Delay {
    /// Human-like delays, uniform in `[0, 0.1)` seconds.
    ///
    /// A seed makes the sequence reproducible.
    #[must_use]
    pub fn human(seed: Option<u64>) -> Self {
        let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::Sampled(Box::new(move || rng.random::<f64>() * HUMAN_MAX_DELAY))
    }

    /// Resolve the delay for the next character.
    pub fn resolve(&mut self) -> f64 {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Sampled(sample) => sample(),
        }
    }

    /// Whether whole lines are typed in one emission.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_instant(&self) -> bool {
        matches!(self, Self::Fixed(delay) if *delay == 0.0)
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(delay) => f.debug_tuple("Fixed").field(delay).finish(),
            Self::Sampled(_) => f.debug_tuple("Sampled").finish_non_exhaustive(),
        }
    }
}

impl TypingMode {
    /// The delay policy for this mode.
    #[must_use]
    pub fn delay(self, seed: Option<u64>) -> Delay {
        match self {
            Self::Instant => Delay::Fixed(0.0),
            Self::Human => Delay::human(seed),
        }
    }
}

/// One emission of typed text.
#[derive(Debug, Clone, PartialEq)]
pub struct Keystroke {
    /// Session time in seconds.
    pub timestamp: f64,
    /// The text that appears.
    pub text: String,
}

impl Keystroke {
    fn new(timestamp: f64, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }
}

/// Types script lines against the session clock.
#[derive(Debug)]
pub struct Typist {
    delay: Delay,
    pace: bool,
}

impl Typist {
    /// Create a typist.
    ///
    /// With `pace` set, every delay is also slept in real time.
    #[must_use]
    pub const fn new(delay: Delay, pace: bool) -> Self {
        Self { delay, pace }
    }

    /// Whether delays are slept in real time.
    #[must_use]
    pub const fn pace(&self) -> bool {
        self.pace
    }

    /// Type one line, passing every keystroke to `emit` as it happens.
    ///
    /// The first line of a block is preceded by the prompt unless it is a
    /// `#` comment. A line of only whitespace is typed as a bare line end,
    /// with no prompt, followed by a fixed 10ms step.
    pub async fn type_line<F>(
        &mut self,
        clock: &mut TypingClock,
        line: &str,
        first_line: bool,
        mut emit: F,
    ) -> Result<()>
    where
        F: FnMut(Keystroke) -> Result<()>,
    {
        if line.trim().is_empty() {
            emit(Keystroke::new(clock.now(), LINE_END))?;
            return clock.advance(OUTPUT_LINE_PACING).map(|_| ());
        }
        if first_line && !line.starts_with('#') {
            emit(Keystroke::new(clock.now(), PROMPT))?;
        }

        if self.delay.is_instant() {
            return emit(Keystroke::new(clock.now(), format!("{line}{LINE_END}")));
        }

        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            let delay = self.delay.resolve();
            self.wait(clock, delay).await?;

            let mut text = String::from(c);
            if chars.peek().is_none() {
                text.push_str(LINE_END);
            }
            emit(Keystroke::new(clock.now(), text))?;
        }
        Ok(())
    }

    /// Type every line of a block.
    pub async fn type_block<F>(
        &mut self,
        clock: &mut TypingClock,
        block: &Block<'_>,
        mut emit: F,
    ) -> Result<()>
    where
        F: FnMut(Keystroke) -> Result<()>,
    {
        for (i, line) in block.lines().iter().enumerate() {
            self.type_line(clock, line, i == 0, &mut emit).await?;
        }
        Ok(())
    }

    /// Type one line and collect its keystrokes.
    pub async fn emit(
        &mut self,
        clock: &mut TypingClock,
        line: &str,
        first_line: bool,
    ) -> Result<Vec<Keystroke>> {
        let mut keystrokes = Vec::new();
        self.type_line(clock, line, first_line, |k| {
            keystrokes.push(k);
            Ok(())
        })
        .await?;
        Ok(keystrokes)
    }

    async fn wait(&self, clock: &mut TypingClock, delay: f64) -> Result<()> {
        clock.advance(delay)?;
        if self.pace && delay > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(delay)).await;
        }
        Ok(())
    }
}
