use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "focusgate-cli", version, about = "Focusgate CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Blocklist management
    Block {
        #[command(subcommand)]
        action: commands::rules::RuleAction,
    },
    /// Whitelist management
    Allow {
        #[command(subcommand)]
        action: commands::rules::RuleAction,
    },
    /// Check whether a URL would be blocked right now
    Check {
        url: String,
    },
    /// Request an emergency unlock
    Unlock {
        /// Password, when password protection is enabled
        #[arg(long)]
        password: Option<String>,
    },
    /// Usage statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a random blocked-page quote
    Quote,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Block { action } => commands::rules::run(action, commands::rules::List::Block),
        Commands::Allow { action } => commands::rules::run(action, commands::rules::List::Allow),
        Commands::Check { url } => commands::check::run_check(&url),
        Commands::Unlock { password } => commands::check::run_unlock(password),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Quote => commands::check::run_quote(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
