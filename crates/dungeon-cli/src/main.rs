mod config;
mod repl;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::DungeonConfig;
use dungeon_agent::{GenerationGateway, StoryRunner};
use dungeon_core::SessionId;
use dungeon_session::{export_file_name, LoadOutcome, SessionState};
use repl::Console;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dungeon", about = "Dungeon GPT Lite: an AI-narrated text adventure")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "dungeon.toml")]
    config: PathBuf,

    /// Session id to resume (a new one is generated when omitted)
    #[arg(short, long)]
    session: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively on stdin/stdout
    Play,
    /// Write the saved story of --session to a JSON transcript
    Export {
        /// Output file (defaults to dungeon_gpt_story_<id>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the saved story of a session with a JSON transcript
    Import {
        /// Transcript file to read
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let logs = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr);
    if cli.log_json {
        logs.json().init();
    } else {
        logs.init();
    }

    let mut config = DungeonConfig::load(&cli.config).await?;
    config.apply_env(|name| std::env::var(name).ok());

    let session_id = match cli.session.as_deref() {
        Some(raw) => {
            SessionId::parse(raw).with_context(|| format!("Invalid session id '{raw}'"))?
        }
        None => SessionId::new(),
    };
    let store = config.open_store().await?;

    match cli.command {
        Commands::Play => {
            info!(session_id = %session_id, app_id = %config.app_id, "Starting story");
            let gateway = GenerationGateway::from_config(config.model.clone());
            if !gateway.is_configured() {
                eprintln!("No API key set (config or GOOGLE_API_KEY); the story cannot advance.");
            }
            let runner = StoryRunner::new(gateway);

            let mut console = Console::new(
                SessionState::with_id(session_id.clone()),
                runner,
                store,
                std::io::stdout(),
            );
            console.resume().await?;
            console.render_log()?;
            println!("Session id: {session_id} (type /help for commands)");

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            console.run(stdin).await?;
            println!("Farewell, adventurer.");
        }
        Commands::Export { output } => {
            anyhow::ensure!(cli.session.is_some(), "export needs --session <ID>");
            let mut session = SessionState::with_id(session_id);
            if session.load(&store).await? == LoadOutcome::NothingSaved {
                anyhow::bail!("No saved story for session {}", session.id());
            }
            let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(session.id())));
            tokio::fs::write(&path, session.export().to_json()?)
                .await
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            println!("Exported {} turns to {}", session.log.len(), path.display());
        }
        Commands::Import { path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            let mut session = SessionState::with_id(session_id);
            let _ = session.import(&bytes)?;
            session.save(&store).await?;
            println!(
                "Imported {} turns into session {}",
                session.log.len(),
                session.id()
            );
        }
    }

    Ok(())
}
