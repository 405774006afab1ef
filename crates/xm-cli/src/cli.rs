//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Experimentum - schema migrations for experiment databases
#[derive(Parser, Debug)]
#[command(name = "xm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override target (database connection)
    #[arg(short, long, global = true, env = "XM_TARGET")]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new project with a config file and migrations directory
    Init(InitArgs),

    /// Inspect and run migrations
    Migrate(MigrateArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name (also the directory created)
    pub name: String,

    /// Database path written into the config
    #[arg(long, default_value = "experimentum.duckdb")]
    pub database_path: String,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommands,
}

/// Migrate subcommands
#[derive(Subcommand, Debug)]
pub enum MigrateCommands {
    /// Show which migrations are applied and which are pending
    Status(StatusArgs),

    /// Apply the next pending migration, or the one given
    Up(StepArgs),

    /// Revert the last applied migration, or the one given
    Down(StepArgs),

    /// Revert every applied migration, then apply all of them again
    Refresh,

    /// Create a new migration file
    Make(MakeArgs),
}

/// Arguments for migrate status
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,

    /// Exit with code 1 when migrations are pending
    #[arg(long)]
    pub check: bool,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for migrate up / down
#[derive(Args, Debug)]
pub struct StepArgs {
    /// Migration id (`<revision>_<name>`) or bare revision
    #[arg(short, long)]
    pub migration: Option<String>,
}

/// Arguments for migrate make
#[derive(Args, Debug)]
pub struct MakeArgs {
    /// Migration name, e.g. "create users table"
    pub name: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
