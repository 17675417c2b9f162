use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;
mod store;

#[derive(Parser)]
#[command(name = "lifeline-cli", version, about = "LifeLine safety monitor CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive monitoring session
    Run(commands::run::RunArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Emergency contact management
    Contact {
        #[command(subcommand)]
        action: commands::contact::ContactAction,
    },
    /// Print a safety tip
    Tip,
    /// Generate shell completions
    Completions { shell: Shell },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Contact { action } => commands::contact::run(action),
        Commands::Tip => commands::tip::run().await,
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "lifeline-cli",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };
    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
