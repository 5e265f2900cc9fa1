//! voicebank - play and bounce the voice engine from a terminal
//!
//! Run with: cargo run -- play

mod app;
mod bounce;
mod keyboard;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing::info;
use voicebank::{AllocationStrategy, EngineConfig, VoiceMode};

#[derive(Parser)]
#[command(version, about = "Polyphonic voice engine playground")]
struct Cli {
    /// TOML engine configuration. Built-in defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write debug logs here (the TUI owns the terminal).
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the engine live from the computer keyboard.
    Play {
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Render a demo phrase to a WAV file.
    Bounce {
        /// Output file.
        output: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command-line overrides applied on top of the config file.
#[derive(Args)]
struct Overrides {
    /// mono, poly or unison
    #[arg(long, value_parser = parse_mode)]
    mode: Option<VoiceMode>,

    /// round_robin, oldest_note, first_available or release_first
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<AllocationStrategy>,

    /// Number of voices (1-16).
    #[arg(long)]
    voices: Option<usize>,

    /// Portamento time in milliseconds.
    #[arg(long)]
    portamento: Option<f32>,
}

impl Overrides {
    fn apply(&self, config: &mut EngineConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(voices) = self.voices {
            config.max_voices = voices;
        }
        if let Some(ms) = self.portamento {
            config.portamento_ms = ms;
        }
    }
}

fn parse_mode(s: &str) -> Result<VoiceMode, String> {
    match s {
        "mono" | "monophonic" => Ok(VoiceMode::Monophonic),
        "poly" | "polyphonic" => Ok(VoiceMode::Polyphonic),
        "unison" => Ok(VoiceMode::Unison),
        other => Err(format!("unknown voice mode '{other}'")),
    }
}

fn parse_strategy(s: &str) -> Result<AllocationStrategy, String> {
    match s {
        "round_robin" => Ok(AllocationStrategy::RoundRobin),
        "oldest_note" => Ok(AllocationStrategy::OldestNote),
        "first_available" => Ok(AllocationStrategy::FirstAvailable),
        "release_first" => Ok(AllocationStrategy::ReleaseFirst),
        other => Err(format!("unknown allocation strategy '{other}'")),
    }
}

fn init_logging(path: Option<&PathBuf>) -> EyreResult<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path).wrap_err_with(|| format!("failed to create {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn load_config(path: Option<&PathBuf>, overrides: &Overrides) -> EyreResult<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    match cli.command {
        Commands::Play { overrides } => {
            let config = load_config(cli.config.as_ref(), &overrides)?;
            info!(?config, "starting live session");
            app::run(config)
        }
        Commands::Bounce { output, overrides } => {
            let config = load_config(cli.config.as_ref(), &overrides)?;
            info!(output = %output.display(), "bouncing demo phrase");
            bounce::run(&config, &output)
        }
    }
}
