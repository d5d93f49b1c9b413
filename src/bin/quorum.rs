//! quorum CLI: governance proposal analysis with an MCP server.
//!
//! Usage:
//!   quorum mcp [--config path]
//!   quorum analyze --user ID [--title T] [FILE|-] [--config path]
//!   quorum config [--config path]

use clap::{Parser, Subcommand};
use quorum::{AnalyzeError, Config, ErrorKind};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "quorum",
    version,
    about = "Governance proposal analysis: vote recommendations and history"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP (Model Context Protocol) server on stdio
    Mcp,
    /// Analyze one proposal and print the result as JSON
    Analyze {
        /// Submitting user id
        #[arg(long)]
        user: String,
        /// Optional proposal title
        #[arg(long)]
        title: Option<String>,
        /// File holding the proposal text; `-` or omitted reads stdin
        file: Option<PathBuf>,
    },
    /// Print the resolved configuration (API key redacted)
    Config,
}

fn init_logging(config: &Config, verbose: bool) -> Result<(), quorum::ConfigError> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        config.log.level()?
    };
    // stdout is reserved for MCP traffic and command output
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn read_proposal(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn exit_code(err: &AnalyzeError) -> i32 {
    match err.kind() {
        ErrorKind::Validation => 2,
        ErrorKind::Analysis | ErrorKind::Internal => 1,
    }
}

fn cmd_analyze(config: &Config, user: &str, title: Option<&str>, file: Option<&Path>) -> i32 {
    let content = match read_proposal(file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: cannot read proposal: {}", e);
            return 1;
        }
    };
    let orchestrator = match config.build_orchestrator() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    match rt.block_on(orchestrator.analyze(&content, title, user)) {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("Error ({}): {}", e.stage(), e);
            if e.is_retryable() {
                eprintln!("The analysis provider may be temporarily unavailable; try again later.");
            }
            exit_code(&e)
        }
    }
}

fn cmd_config(config: &Config) -> i32 {
    match serde_yaml::to_string(&config.redacted()) {
        Ok(yaml) => {
            print!("{}", yaml);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = init_logging(&config, cli.verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let code = match cli.command {
        Commands::Mcp => quorum::mcp::run_mcp_server(&config),
        Commands::Analyze { user, title, file } => {
            cmd_analyze(&config, &user, title.as_deref(), file.as_deref())
        }
        Commands::Config => cmd_config(&config),
    };
    std::process::exit(code);
}
