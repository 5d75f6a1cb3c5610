//! The recording pipeline.
//!
//! A [`Caster`] owns one recording session: it writes the header, then for
//! each block types the lines and captures the command output, sending every
//! emission to a [`CastWriter`] as it happens.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::capture::OutputCapturer;
use crate::cast::{Cast, CastHeader, CastWriter, Event, HeaderEnv, parse_cast};
use crate::clock::{SystemTime, TimeSource, TypingClock};
use crate::config::env::EnvConfig;
use crate::config::{
    CAST_EXTENSION, CAST_VERSION, DEFAULT_HEADER_SHELL, DEFAULT_TERM, DEFAULT_TERMINAL_HEIGHT,
    DEFAULT_TERMINAL_WIDTH, RecordConfig, TypingMode,
};
use crate::error::{CastError, Result};
use crate::script::Script;
use crate::typist::Typist;

/// Output path meaning standard output.
pub const STDOUT_PATH: &str = "-";

/// Where a recording session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing written yet.
    Idle,
    /// Header written, no block started.
    HeaderWritten,
    /// Typing the lines of a block.
    TypingInput,
    /// Running a block and recording its output.
    CapturingOutput,
    /// Finished; the caster cannot record again.
    Done,
}

impl SessionState {
    /// Check if the session has ended.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::HeaderWritten => "header written",
            Self::TypingInput => "typing input",
            Self::CapturingOutput => "capturing output",
            Self::Done => "done",
        })
    }
}

/// What a finished recording contains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordSummary {
    /// Blocks replayed.
    pub blocks: usize,
    /// Events written, header excluded.
    pub events: usize,
    /// Final clock value in seconds.
    pub duration: f64,
}

/// Records one script into one cast.
#[derive(Debug)]
pub struct Caster {
    config: RecordConfig,
    env: EnvConfig,
    time: Arc<dyn TimeSource>,
    state: SessionState,
}

impl Caster {
    /// Create a caster reading the process environment and the system clock.
    #[must_use]
    pub fn new(config: RecordConfig) -> Self {
        Self {
            config,
            env: EnvConfig::default(),
            time: Arc::new(SystemTime::new()),
            state: SessionState::Idle,
        }
    }

    /// Use a fixed set of environment variables.
    #[must_use]
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env = env;
        self
    }

    /// Use a different time source.
    #[must_use]
    pub fn with_time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    /// The session configuration.
    #[must_use]
    pub const fn config(&self) -> &RecordConfig {
        &self.config
    }

    /// The current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Compute the header for a recording starting now.
    ///
    /// Everything but `timestamp` depends only on the environment and the
    /// configured overrides.
    #[must_use]
    pub fn build_header(&self) -> CastHeader {
        let overrides = &self.config.header;
        let (width, height) = terminal_size(&self.env);

        let mut header = CastHeader::new(
            overrides.width.unwrap_or(width),
            overrides.height.unwrap_or(height),
            self.time.unix_timestamp(),
        );
        if let Some(limit) = overrides.idle_time_limit {
            header.idle_time_limit = limit;
        }
        header.title.clone_from(&overrides.title);
        header.env = HeaderEnv {
            shell: overrides
                .shell
                .as_deref()
                .or_else(|| self.env.raw_non_empty("SHELL"))
                .unwrap_or(DEFAULT_HEADER_SHELL)
                .to_string(),
            term: overrides
                .term
                .as_deref()
                .or_else(|| self.env.raw_non_empty("TERM"))
                .unwrap_or(DEFAULT_TERM)
                .to_string(),
        };
        header
    }

    /// Record `script` as a cast written to `output`.
    ///
    /// The output is flushed whether or not recording succeeds. A caster
    /// records once; later calls fail with [`CastError::SessionFinished`].
    pub async fn record<W: Write>(&mut self, script: &Script, output: W) -> Result<RecordSummary> {
        if self.state != SessionState::Idle {
            return Err(CastError::SessionFinished);
        }
        self.config.validate()?;

        let mut writer = CastWriter::new(output);
        let result = self.run(script, &mut writer).await;
        self.transition(SessionState::Done);

        match result {
            Ok(summary) => {
                writer.finish()?;
                info!(
                    blocks = summary.blocks,
                    events = summary.events,
                    duration = summary.duration,
                    "recording finished"
                );
                Ok(summary)
            }
            Err(e) => {
                if let Err(flush_err) = writer.flush() {
                    warn!(error = %flush_err, "failed to flush partial recording");
                }
                Err(e)
            }
        }
    }

    /// Record the script at `input` into the file at `output`.
    ///
    /// The script is read and the configuration checked before the output is
    /// created, so neither failure leaves a file behind. An output of `-`
    /// writes to standard output.
    pub async fn record_file(
        &mut self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<RecordSummary> {
        let input = input.as_ref();
        let output = output.as_ref();
        let script = Script::from_path(input)?;
        self.config.validate()?;
        debug!(input = %input.display(), output = %output.display(), "recording script");

        if output == Path::new(STDOUT_PATH) {
            return self.record(&script, std::io::stdout()).await;
        }

        let file = File::create(output)
            .map_err(|e| CastError::io_context(format!("creating {}", output.display()), e))?;
        self.record(&script, BufWriter::new(file)).await
    }

    async fn run<W: Write>(
        &mut self,
        script: &Script,
        writer: &mut CastWriter<W>,
    ) -> Result<RecordSummary> {
        let header = self.build_header();
        writer.write_header(&header)?;
        self.transition(SessionState::HeaderWritten);

        let mut clock = TypingClock::new();
        let mut typist = Typist::new(self.config.typing.delay(self.config.seed), self.config.pace);
        let capturer = OutputCapturer::new(self.config.capture)
            .shell(&self.config.shell)
            .window_size(header.width, header.height)
            .env(self.env.clone())
            .time_source(Arc::clone(&self.time));

        let mut blocks = 0;
        for block in script.blocks() {
            blocks += 1;
            debug!(block = blocks, lines = block.len(), clock = clock.now(), "replaying block");

            self.transition(SessionState::TypingInput);
            typist
                .type_block(&mut clock, &block, |key| {
                    writer.write_event(&Event::output(key.timestamp, key.text))
                })
                .await?;

            self.transition(SessionState::CapturingOutput);
            capturer
                .record(&mut clock, &block, |timestamp, line| {
                    writer.write_event(&Event::output(timestamp, line))
                })
                .await?;
        }

        Ok(RecordSummary {
            blocks,
            events: writer.events_written(),
            duration: clock.now(),
        })
    }

    fn transition(&mut self, next: SessionState) {
        trace!(from = %self.state, to = %next, "session state");
        self.state = next;
    }
}

/// Terminal size for the header.
///
/// `COLUMNS` and `LINES` win, then the size of the controlling terminal,
/// then 80x24.
#[must_use]
pub fn terminal_size(env: &EnvConfig) -> (u16, u16) {
    let from_env = |name: &str| {
        env.raw(name)
            .and_then(|v| v.trim().parse::<u16>().ok())
            .filter(|&v| v > 0)
    };
    let tty = crossterm::terminal::size()
        .ok()
        .filter(|&(cols, rows)| cols > 0 && rows > 0);

    (
        from_env("COLUMNS")
            .or(tty.map(|(cols, _)| cols))
            .unwrap_or(DEFAULT_TERMINAL_WIDTH),
        from_env("LINES")
            .or(tty.map(|(_, rows)| rows))
            .unwrap_or(DEFAULT_TERMINAL_HEIGHT),
    )
}

/// Output path used when none is given: the input with a `.cast` extension.
#[must_use]
pub fn default_output_path(input: impl AsRef<Path>) -> PathBuf {
    input.as_ref().with_extension(CAST_EXTENSION)
}

/// Compare a fresh replay of `input` with an earlier recording.
///
/// Not available yet; always fails with [`CastError::NotImplemented`].
pub fn replay_test(input: impl AsRef<Path>, previous: Option<&Path>) -> Result<()> {
    debug!(
        input = %input.as_ref().display(),
        previous = ?previous,
        "replay test requested"
    );
    Err(CastError::not_implemented(
        "comparing a replay against a previous recording",
    ))
}

/// Script recorded by [`self_test`].
pub const SELF_TEST_SCRIPT: &str = "echo hello\n\n# two lines\nprintf 'one\\ntwo\\n'\n";

/// Record [`SELF_TEST_SCRIPT`] in memory and check the result.
pub async fn self_test(mut config: RecordConfig) -> Result<Cast> {
    config.typing = TypingMode::Instant;
    config.pace = false;

    let mut caster = Caster::new(config);
    let mut buffer = Vec::new();
    let summary = caster.record(&Script::new(SELF_TEST_SCRIPT), &mut buffer).await?;

    let text = String::from_utf8(buffer)
        .map_err(|e| CastError::self_test(format!("recording is not UTF-8: {e}")))?;
    let cast = parse_cast(&text)?;

    if cast.header.version != CAST_VERSION {
        return Err(CastError::self_test(format!(
            "header version {} instead of {CAST_VERSION}",
            cast.header.version
        )));
    }
    if summary.blocks != 2 || cast.events.len() != summary.events {
        return Err(CastError::self_test(format!(
            "expected 2 blocks and {} events, read {} blocks and {} events",
            summary.events,
            summary.blocks,
            cast.events.len()
        )));
    }
    if !cast.is_monotonic() {
        return Err(CastError::self_test("event timestamps decrease"));
    }
    let expected = "$ echo hello\r\nhello\r\n# two lines\r\nprintf 'one\\ntwo\\n'\r\none\r\ntwo\r\n";
    if cast.output_text() != expected {
        return Err(CastError::self_test(format!(
            "unexpected output {:?}",
            cast.output_text()
        )));
    }
    Ok(cast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualTime;
    use crate::config::env::DEFAULT_PREFIX;
    use crate::config::HeaderOverrides;
    use std::time::Duration;

    fn env() -> EnvConfig {
        EnvConfig::from_vars(
            DEFAULT_PREFIX,
            [
                ("COLUMNS", "100"),
                ("LINES", "30"),
                ("SHELL", "/bin/zsh"),
                ("TERM", "screen"),
            ],
        )
    }

    fn caster(config: RecordConfig) -> Caster {
        Caster::new(config)
            .with_env(env())
            .with_time_source(Arc::new(ManualTime::new(
                1_700_000_000,
                Duration::from_millis(2),
            )))
    }

    #[test]
    fn header_from_environment() {
        let header = caster(RecordConfig::default()).build_header();
        assert_eq!(header.version, 2);
        assert_eq!((header.width, header.height), (100, 30));
        assert_eq!(header.timestamp, 1_700_000_000);
        assert_eq!(header.env.shell, "/bin/zsh");
        assert_eq!(header.env.term, "screen");
        assert!((header.idle_time_limit - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn header_overrides_win() {
        let config = RecordConfig::default().header(
            HeaderOverrides::new()
                .size(120, 40)
                .idle_time_limit(1.5)
                .title("demo")
                .term("vt100"),
        );
        let header = caster(config).build_header();
        assert_eq!((header.width, header.height), (120, 40));
        assert_eq!(header.title.as_deref(), Some("demo"));
        assert_eq!(header.env.term, "vt100");
        assert_eq!(header.env.shell, "/bin/zsh");
    }

    #[test]
    fn header_env_defaults() {
        let caster = Caster::new(RecordConfig::default())
            .with_env(EnvConfig::from_vars(DEFAULT_PREFIX, [("SHELL", "")]));
        let header = caster.build_header();
        assert_eq!(header.env.shell, DEFAULT_HEADER_SHELL);
        assert_eq!(header.env.term, DEFAULT_TERM);
    }

    #[test]
    fn header_is_idempotent_but_timestamp() {
        let time = Arc::new(ManualTime::new(10, Duration::ZERO));
        let caster = Caster::new(RecordConfig::default())
            .with_env(env())
            .with_time_source(time.clone());

        let first = caster.build_header();
        time.set_unix_timestamp(20);
        let second = caster.build_header();

        assert_eq!(second.timestamp, 20);
        assert_eq!(CastHeader { timestamp: 10, ..second }, first);
    }

    #[test]
    fn terminal_size_ignores_bad_values() {
        let env = EnvConfig::from_vars(DEFAULT_PREFIX, [("COLUMNS", "0"), ("LINES", "tall")]);
        let (cols, rows) = terminal_size(&env);
        assert!(cols > 0 && rows > 0);
    }

    #[test]
    fn output_path_defaults_to_cast_extension() {
        assert_eq!(default_output_path("demo.sh"), PathBuf::from("demo.cast"));
        assert_eq!(default_output_path("dir/demo"), PathBuf::from("dir/demo.cast"));
    }

    #[test]
    fn replay_test_is_not_implemented() {
        let err = replay_test("demo.sh", None).unwrap_err();
        assert!(matches!(err, CastError::NotImplemented { .. }));
    }

    #[tokio::test]
    async fn record_walks_states() {
        let mut caster = caster(RecordConfig::default().typing(TypingMode::Instant));
        assert_eq!(caster.state(), SessionState::Idle);

        let mut out = Vec::new();
        let summary = caster.record(&Script::new("echo hi"), &mut out).await.unwrap();
        assert_eq!(caster.state(), SessionState::Done);
        assert_eq!(summary.blocks, 1);
        assert_eq!(summary.events, 3);
    }

    #[tokio::test]
    async fn record_only_once() {
        let mut caster = caster(RecordConfig::default().typing(TypingMode::Instant));
        caster.record(&Script::new("true"), Vec::new()).await.unwrap();

        let err = caster.record(&Script::new("true"), Vec::new()).await.unwrap_err();
        assert!(matches!(err, CastError::SessionFinished));
    }

    #[tokio::test]
    async fn invalid_config_writes_nothing() {
        let config = RecordConfig::default().header(HeaderOverrides::new().idle_time_limit(0.0));
        let mut caster = caster(config);
        let mut out = Vec::new();

        assert!(caster.record(&Script::new("true"), &mut out).await.is_err());
        assert!(out.is_empty());
        assert_eq!(caster.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn failure_keeps_partial_output() {
        let config = RecordConfig::default()
            .typing(TypingMode::Instant)
            .shell("/nonexistent/shell");
        let mut caster = caster(config);
        let mut out = Vec::new();

        let err = caster.record(&Script::new("echo hi"), &mut out).await.unwrap_err();
        assert!(matches!(err, CastError::Spawn { .. }));
        assert_eq!(caster.state(), SessionState::Done);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn self_test_passes() {
        let cast = self_test(RecordConfig::default()).await.unwrap();
        assert_eq!(cast.events.len(), 7);
    }
}
