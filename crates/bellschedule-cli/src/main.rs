use bellschedule_core::Config;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bellschedule", version, about = "Bell schedule CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the cached dataset
    Sync,
    /// Show the period in progress
    Now(commands::now::NowArgs),
    /// Show one day's schedule
    Day(commands::day::DayArgs),
    /// Show which schedule runs on each day of a month
    Month(commands::month::MonthArgs),
    /// Symbol overrides
    Symbols {
        #[command(subcommand)]
        action: commands::symbols::SymbolsAction,
    },
    /// Period-ending reminders
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = Config::load_or_default().log_level;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Sync => commands::sync::run(),
        Commands::Now(args) => commands::now::run(args),
        Commands::Day(args) => commands::day::run(args),
        Commands::Month(args) => commands::month::run(args),
        Commands::Symbols { action } => commands::symbols::run(action),
        Commands::Notify { action } => commands::notify::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
