//! docent CLI: the main entry point.
//!
//! Commands:
//! - `chat`: Interactive chat over a document or with tools
//! - `summarize`: Structured summary of a patient note
//! - `plan`: Multi-step travel plan
//! - `doctor`: Diagnose provider and config health
//! - `config`: Print the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "docent",
    about = "docent: document-grounded and tool-calling chat assistants",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to config.toml (defaults to ~/.docent/config.toml)
    #[arg(short, long, global = true, env = "DOCENT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ChatMode {
    /// Answer from a loaded document
    Document,
    /// Let the model call tools
    Tool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with an assistant
    Chat {
        /// Which assistant to run
        #[arg(long, value_enum, default_value_t = ChatMode::Document)]
        mode: ChatMode,

        /// Document file or directory to index (overrides retrieval.document_path)
        #[arg(short, long)]
        document: Option<PathBuf>,

        /// Start with document context turned off
        #[arg(long)]
        no_context: bool,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Summarize a patient note into a synopsis and problem list
    Summarize {
        /// Read the note from a file
        #[arg(short, long, conflicts_with = "note")]
        file: Option<PathBuf>,

        /// The note text
        #[arg(required_unless_present = "file")]
        note: Option<String>,
    },

    /// Plan a trip: brainstorm, outline, structured plan
    Plan {
        #[arg(long)]
        destination: String,

        #[arg(long)]
        days: u32,

        /// Travel style, e.g. "food-loving traveler on a moderate budget"
        #[arg(long)]
        style: String,

        #[arg(long, default_value = "None")]
        constraints: String,
    },

    /// Diagnose provider and config health
    Doctor,

    /// Print the effective configuration (secrets redacted)
    Config {
        /// Print a default config.toml instead
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Chat {
            mode,
            document,
            no_context,
            message,
        } => {
            let options = commands::chat::ChatOptions {
                mode,
                document,
                no_context,
                message,
            };
            commands::chat::run(config_path, options).await?
        }
        Commands::Summarize { file, note } => {
            commands::summarize::run(config_path, file.as_deref(), note).await?
        }
        Commands::Plan {
            destination,
            days,
            style,
            constraints,
        } => {
            let request = docent_agent::TripRequest {
                destination,
                days,
                style,
                constraints,
            };
            commands::plan::run(config_path, request).await?
        }
        Commands::Doctor => commands::doctor::run(config_path).await?,
        Commands::Config { default } => commands::config_cmd::show(config_path, default)?,
    }

    Ok(())
}
