use clap::{Parser, Subcommand};
use sqlcheck::HarnessConfig;
use tracing::Level;

mod commands;

use commands::config::run as run_config;
use commands::console::print_error;
use commands::output::OutputFormat;
use commands::run::RunArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.sqlcheck/sqlcheck.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Output format
    #[clap(short, long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Subcommand; the interactive menu runs when omitted
    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Run scenarios without the menu
    Run(RunArgs),

    /// List every known scenario
    List,

    /// Show the manual
    Manual,

    /// Show the effective configuration and database status
    Config,
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level TRACE or higher.
            .with_max_level(Level::INFO)
            .init();
    }

    let config = match HarnessConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => commands::menu::run(&config),
        Commands::Run(args) => {
            if !commands::run::run(&config, args, cli.format) {
                std::process::exit(1);
            }
        }
        Commands::List => commands::list::run(cli.format),
        Commands::Manual => commands::manual::run(),
        Commands::Config => run_config(&config, &cli.config, cli.format),
    }
}
