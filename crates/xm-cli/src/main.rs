//! Experimentum CLI - schema migrations for experiment databases

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, GlobalArgs};
use commands::common::ExitCode;
use commands::{init, migrate};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let result = match &cli.command {
        cli::Commands::Init(args) => init::execute(args),
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(code) => std::process::ExitCode::from(code.0),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::ExitCode::FAILURE
            }
        },
    }
}

/// `warn` by default, `debug` for our crates with `--verbose`; `RUST_LOG` wins
fn init_logging(global: &GlobalArgs) {
    let default = if global.verbose {
        "warn,xm_core=debug,xm_db=debug,xm_schema=debug,xm_migrate=debug,xm=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
