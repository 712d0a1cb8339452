//! Command-line argument parsing for sqlpeek.

use clap::Parser;
use std::path::PathBuf;

/// Browse a SQLite database and run SQL or natural-language requests,
/// with every data change held for confirmation.
#[derive(Parser, Debug)]
#[command(name = "sqlpeek")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Absolute path to the SQLite database file (must end in .db)
    #[arg(value_name = "DATABASE")]
    pub database: PathBuf,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// LLM provider to use (openai, ollama, mock); overrides the config file
    #[arg(long, value_name = "PROVIDER")]
    pub llm: Option<String>,

    /// Parse queries to catch modifications hidden behind a read-only prefix
    #[arg(long)]
    pub strict: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }
}
