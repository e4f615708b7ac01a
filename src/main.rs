use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskist::Config;
use taskist::session::{
    Collaborators, Console, SessionOrchestrator, SessionSettings, TerminalConsole,
};
use taskist::tasks::IntentParser;
use taskist::voice::{AudioPlayback, CpalMicrophone, HttpSpeechToText, HttpTextToSpeech};

/// Taskist - Voice-driven to-do list assistant
#[derive(Parser)]
#[command(name = "taskist", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a TOML config file
    #[arg(long, env = "TASKIST_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity; RUST_LOG wins when set
    let filter = match cli.verbose {
        0 => "info,taskist=info",
        1 => "info,taskist=debug",
        2 => "debug",
        _ => "trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    tracing::info!(
        user = %config.tasks.user_id,
        category = %config.tasks.category,
        stt = ?config.stt.provider,
        tts = ?config.tts.provider,
        "starting taskist"
    );

    // Acquire every collaborator before the first round
    let stt = HttpSpeechToText::new(&config.stt, config.stt_api_key()?)
        .context("failed to set up speech-to-text")?;
    let tts = HttpTextToSpeech::new(&config.tts, config.tts_api_key()?)
        .context("failed to set up text-to-speech")?;
    let microphone = CpalMicrophone::new().context("failed to open microphone")?;
    let playback = AudioPlayback::new().context("failed to open speakers")?;

    let console = Arc::new(TerminalConsole::new());
    console.show("====TASKIST====");

    let collaborators = Collaborators {
        source: Arc::new(microphone),
        stt: Arc::new(stt),
        tts: Arc::new(tts),
        sink: Arc::new(playback),
        console,
    };

    let parser = IntentParser::new(config.commands.clone());
    let settings = SessionSettings::from(&config);
    let report = SessionOrchestrator::new(collaborators, parser, settings)
        .run()
        .await?;

    tracing::info!(
        rounds = report.rounds.len(),
        tasks = report.tasks.len(),
        final_state = ?report.final_state,
        "taskist finished"
    );

    Ok(())
}
