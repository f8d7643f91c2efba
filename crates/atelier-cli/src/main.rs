use anyhow::Result;
use clap::{Parser, Subcommand};

mod app;
mod commands;

use app::AppContext;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(about = "Atelier CLI - project-scoped AI agent conversations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an auth token and bootstrap the session
    Login {
        /// Bearer token issued by the backend
        token: String,
    },
    /// Clear the session and all cached state
    Logout,
    /// Show the current user and active selections
    Status,
    /// List projects or switch the active one
    Projects {
        #[command(subcommand)]
        action: Option<commands::projects::ProjectAction>,
    },
    /// List agents or switch the active one
    Agents {
        #[command(subcommand)]
        action: Option<commands::agents::AgentAction>,
    },
    /// Converse with the active agent
    Chat {
        #[command(subcommand)]
        action: commands::chat::ChatAction,
    },
    /// Manage the active project's documents
    Docs {
        #[command(subcommand)]
        action: Option<commands::docs::DocAction>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = AppContext::build()?;

    match cli.command {
        Commands::Login { token } => commands::session::login(&app, &token).await?,
        Commands::Logout => commands::session::logout(&app).await,
        Commands::Status => {
            app.bootstrap().await?;
            commands::session::status(&app).await;
        }
        Commands::Projects { action } => {
            app.bootstrap().await?;
            commands::projects::run(&app, action).await?;
        }
        Commands::Agents { action } => {
            app.bootstrap().await?;
            commands::agents::run(&app, action).await?;
        }
        Commands::Chat { action } => {
            app.bootstrap().await?;
            commands::chat::run(&app, action).await?;
        }
        Commands::Docs { action } => {
            app.bootstrap().await?;
            commands::docs::run(&app, action).await?;
        }
    }

    Ok(())
}
