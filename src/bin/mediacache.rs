use clap::{Parser, Subcommand, ValueEnum};
use mediacache::cli as prog_cli;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Human,
    Plain,
    Json,
}

impl From<Format> for prog_cli::OutputMode {
    fn from(f: Format) -> Self {
        match f {
            Format::Human => prog_cli::OutputMode::Human,
            Format::Plain => prog_cli::OutputMode::Plain,
            Format::Json => prog_cli::OutputMode::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mediacache", version, about = "Inspect media cache indexes and configuration", long_about = None)]
struct Cli {
    #[arg(long, value_enum, default_value = "human", global = true, help = "Output format")]
    format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(name = "inspect", about = "Summarize a cache metadata index per category")]
    Inspect {
        #[arg(help = "Path to the index file (e.g., ~/.cache/mediacache/cache_index.json)")]
        index: PathBuf,
    },
    #[command(name = "check-config", about = "Validate a TOML configuration and print resolved category settings")]
    CheckConfig {
        #[arg(help = "Path to the TOML configuration file")]
        config: PathBuf,
    },
    #[command(name = "defaults", about = "Print the built-in default configuration")]
    Defaults,
}

fn main() {
    let cli = Cli::parse();
    if std::env::var_os("MEDIACACHE_LOG_DIR").is_some() {
        if let Err(e) = mediacache::utils::logger::configure_from_env() {
            eprintln!("warning: logging not configured: {e}");
        }
    }
    let cmd = match cli.command {
        Commands::Inspect { index } => prog_cli::Command::Inspect { index },
        Commands::CheckConfig { config } => prog_cli::Command::CheckConfig { config },
        Commands::Defaults => prog_cli::Command::Defaults,
    };
    let stdout = std::io::stdout();
    if let Err(e) = prog_cli::run_with_format(cmd, cli.format.into(), &mut stdout.lock()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
