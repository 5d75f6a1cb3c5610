//! Running blocks and capturing what they print.
//!
//! Each block runs once as `<shell> -c <command>`. Plain capture collects
//! stdout and stderr through a pipe; ANSI capture runs the command inside a
//! pseudo-terminal so programs keep their colors and cursor codes.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use rust_cast_pty::{ExitStatus, PtyConfig, WindowSize};
use tracing::{debug, warn};

use crate::clock::{SystemTime, TimeSource, TypingClock};
use crate::config::env::EnvConfig;
use crate::config::{CaptureMode, DEFAULT_EXEC_SHELL, OUTPUT_LINE_PACING};
use crate::error::{CastError, Result};
use crate::script::Block;
use crate::typist::LINE_END;

/// Output of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Output lines without terminators.
    pub lines: Vec<String>,
    /// Wall-clock time the command took.
    pub elapsed: Duration,
    /// How the shell exited.
    pub status: ExitStatus,
}

/// Runs blocks through the host shell.
#[derive(Debug, Clone)]
pub struct OutputCapturer {
    mode: CaptureMode,
    shell: PathBuf,
    window: WindowSize,
    env: EnvConfig,
    time: Arc<dyn TimeSource>,
}

impl Default for OutputCapturer {
    fn default() -> Self {
        Self::new(CaptureMode::default())
    }
}

impl OutputCapturer {
    /// Create a capturer using the default shell and the process environment.
    #[must_use]
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            shell: PathBuf::from(DEFAULT_EXEC_SHELL),
            window: WindowSize::default(),
            env: EnvConfig::default(),
            time: Arc::new(SystemTime::new()),
        }
    }

    /// Set the shell that runs each block.
    #[must_use]
    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Set the terminal size seen by commands in ANSI mode.
    #[must_use]
    pub const fn window_size(mut self, cols: u16, rows: u16) -> Self {
        self.window = WindowSize::new(cols, rows);
        self
    }

    /// Set the variables used for `$VAR` and `~` expansion.
    #[must_use]
    pub fn env(mut self, env: EnvConfig) -> Self {
        self.env = env;
        self
    }

    /// Set the source used to measure command duration.
    #[must_use]
    pub fn time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    /// The capture mode.
    #[must_use]
    pub const fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// The execution shell.
    #[must_use]
    pub fn shell_path(&self) -> &Path {
        &self.shell
    }

    /// The command line a block runs as, after expansion.
    #[must_use]
    pub fn expand_command(&self, block: &Block<'_>) -> String {
        self.env.expand(&block.command())
    }

    /// Run a block and collect its output.
    ///
    /// A non-zero exit status is logged and returned, not raised.
    pub async fn run(&self, block: &Block<'_>) -> Result<Capture> {
        let command = self.expand_command(block);
        debug!(mode = %self.mode, command = %command, "running block");

        let start = self.time.monotonic();
        let (output, status) = match self.mode {
            CaptureMode::Plain => self.run_plain(&command).await?,
            CaptureMode::Ansi => self.run_pty(&command).await?,
        };
        let elapsed = self.time.monotonic().saturating_sub(start);

        if !status.success() {
            warn!(%status, command = %command, "command exited unsuccessfully");
        }

        let lines = match self.mode {
            CaptureMode::Plain => split_output(&output),
            CaptureMode::Ansi => split_terminal_output(&output),
        };
        debug!(lines = lines.len(), elapsed_ms = elapsed.as_millis(), "block finished");

        Ok(Capture {
            lines,
            elapsed,
            status,
        })
    }

    /// Run a block and emit its output lines against the session clock.
    ///
    /// The clock first moves by the time the command took, then every line
    /// is emitted at the current time followed by a fixed 10ms step.
    pub async fn record<F>(
        &self,
        clock: &mut TypingClock,
        block: &Block<'_>,
        mut emit: F,
    ) -> Result<Capture>
    where
        F: FnMut(f64, String) -> Result<()>,
    {
        let capture = self.run(block).await?;
        clock.advance_by(capture.elapsed)?;
        for line in &capture.lines {
            emit(clock.now(), format!("{line}{LINE_END}"))?;
            clock.advance(OUTPUT_LINE_PACING)?;
        }
        Ok(capture)
    }

    async fn run_plain(&self, command: &str) -> Result<(String, ExitStatus)> {
        // Same line as the command, so shell diagnostics keep its line numbers.
        let script = format!("exec 2>&1; {command}");
        let output = tokio::process::Command::new(&self.shell)
            .arg("-c")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|source| CastError::Spawn {
                shell: self.shell.display().to_string(),
                command: command.to_string(),
                source,
            })?;

        Ok((
            String::from_utf8_lossy(&output.stdout).into_owned(),
            output.status.into(),
        ))
    }

    async fn run_pty(&self, command: &str) -> Result<(String, ExitStatus)> {
        let config = PtyConfig::builder()
            .shell(&self.shell)
            .window_size(self.window.cols, self.window.rows)
            .build();
        let captured = rust_cast_pty::capture(command, &config).await?;
        Ok((captured.text(), captured.status))
    }
}

/// Split piped output into lines.
///
/// One trailing newline is dropped, and empty output has no lines.
#[must_use]
pub fn split_output(output: &str) -> Vec<String> {
    let body = output.strip_suffix('\n').unwrap_or(output);
    if body.is_empty() {
        return Vec::new();
    }
    body.split('\n').map(str::to_string).collect()
}

/// Split terminal output into lines, removing the `\r` of each `\r\n`.
#[must_use]
pub fn split_terminal_output(output: &str) -> Vec<String> {
    split_output(output)
        .into_iter()
        .map(|line| match line.strip_suffix('\r') {
            Some(stripped) => stripped.to_string(),
            None => line,
        })
        .collect()
}
