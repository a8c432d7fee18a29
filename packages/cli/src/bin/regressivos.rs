use clap::{Parser, Subcommand};
use colored::*;
use std::process;

mod cli;

use cli::admin::{handle_admin_command, AdminCommands};
use cli::quality::{handle_quality_command, QualityCommands};
use cli::Context;
use regressivos_cli::init_tracing;

#[derive(Parser)]
#[command(name = "regressivos")]
#[command(about = "Regressivos console - regression test cycles for mobile releases")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides REGRESSIVOS_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session
    Login {
        #[arg(short, long)]
        name: Option<String>,
        /// admin or quality
        #[arg(short, long)]
        role: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show the current session and server
    Whoami,
    /// Check that the backend is up
    Health,
    /// Landing view for the logged-in role
    Home,
    /// Cycle administration
    #[command(subcommand)]
    Admin(AdminCommands),
    /// Test execution
    #[command(subcommand)]
    Quality(QualityCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::load(cli.api_url).await?;

    match cli.command {
        Commands::Login { name, role } => cli::session::login(&ctx, name, role).await,
        Commands::Logout => cli::session::logout(&ctx).await,
        Commands::Whoami => cli::session::whoami(&ctx).await,
        Commands::Health => cli::session::health(&ctx).await,
        Commands::Home => {
            let session = ctx.session().await?;
            if session.is_admin() {
                cli::admin::list_cycles(&ctx).await
            } else {
                cli::quality::list_active(&ctx).await
            }
        }
        Commands::Admin(command) => handle_admin_command(&ctx, command).await,
        Commands::Quality(command) => handle_quality_command(&ctx, command).await,
    }
}
