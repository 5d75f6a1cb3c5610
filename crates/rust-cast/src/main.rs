//! rust-cast - record shell scripts as asciicast screencasts
//!
//! # Commands
//!
//! - `rust-cast record <script>` - replay a script and write `<script>.cast`
//! - `rust-cast test <script>` - compare a replay with an earlier recording
//! - `rust-cast selftest` - record a built-in script and check the result
//!
//! # Usage
//!
//! ```bash
//! # Type like a person, capture plain output
//! rust-cast record demo.sh
//!
//! # Keep colors, type instantly, write to stdout
//! rust-cast record demo.sh --with-ansi --typing instant -o -
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_cast::caster::STDOUT_PATH;
use rust_cast::config::env::{DEFAULT_PREFIX, EnvConfig};
use rust_cast::{
    CaptureMode, Caster, HeaderOverrides, RecordConfig, TypingMode, default_output_path,
    load_config, replay_test, self_test,
};

/// rust-cast - record shell scripts as asciicast screencasts
#[derive(Parser)]
#[command(name = "rust-cast")]
#[command(about = "Execute a shell script as if typed by a human and record it as an asciicast")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a script and record it
    #[command(alias = "exec")]
    Record(RecordArgs),

    /// Replay a script and compare it with a previous recording
    Test(TestArgs),

    /// Record a built-in script and verify the recording
    Selftest,
}

#[derive(Args)]
struct RecordArgs {
    /// Script to replay
    input: PathBuf,

    /// Output file, `-` for stdout [default: input with a .cast extension]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Typing simulation: instant or human
    #[arg(long)]
    typing: Option<TypingMode>,

    /// Capture output through a PTY, keeping escape sequences
    #[arg(long)]
    with_ansi: bool,

    /// Sleep for typing delays in real time
    #[arg(long)]
    pace: bool,

    /// Seed for typing delays
    #[arg(long)]
    seed: Option<u64>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Shell that runs each block
    #[arg(long)]
    shell: Option<PathBuf>,

    /// Terminal width in the header
    #[arg(long)]
    cols: Option<u16>,

    /// Terminal height in the header
    #[arg(long)]
    rows: Option<u16>,

    /// Idle time limit in the header, in seconds
    #[arg(long)]
    idle_time_limit: Option<f64>,

    /// Title in the header
    #[arg(long)]
    title: Option<String>,
}

impl RecordArgs {
    /// Defaults, then the config file, then `CAST_*` variables, then flags.
    fn resolve_config(&self, env: &EnvConfig) -> Result<RecordConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RecordConfig::default(),
        };
        env.apply(&mut config)?;

        if let Some(typing) = self.typing {
            config.typing = typing;
        }
        if self.with_ansi {
            config.capture = CaptureMode::Ansi;
        }
        if self.pace {
            config.pace = true;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(shell) = &self.shell {
            config.shell.clone_from(shell);
        }
        config.header.merge(HeaderOverrides {
            width: self.cols,
            height: self.rows,
            idle_time_limit: self.idle_time_limit,
            title: self.title.clone(),
            ..HeaderOverrides::default()
        });

        config.validate()?;
        Ok(config)
    }
}

#[derive(Args)]
struct TestArgs {
    /// Script to replay
    input: PathBuf,

    /// Recording to compare against
    #[arg(long)]
    previous_output: Option<PathBuf>,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stderr keeps stdout free for `-o -`
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn record(args: RecordArgs) -> Result<()> {
    let env = EnvConfig::from_env(DEFAULT_PREFIX);
    let config = args.resolve_config(&env)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));

    let mut caster = Caster::new(config).with_env(env);
    let summary = caster
        .record_file(&args.input, &output)
        .await
        .with_context(|| format!("failed to record {}", args.input.display()))?;

    if output.as_os_str() != STDOUT_PATH {
        info!(
            output = %output.display(),
            blocks = summary.blocks,
            events = summary.events,
            "wrote recording"
        );
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Record(args) => record(args).await,
        Commands::Test(args) => {
            replay_test(&args.input, args.previous_output.as_deref())?;
            Ok(())
        }
        Commands::Selftest => {
            self_test(RecordConfig::default())
                .await
                .context("self test failed")?;
            println!("SUCCESS");
            Ok(())
        }
    }
}
