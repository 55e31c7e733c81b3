//! Custody CLI: drive the staged custody workflow from a shell.
//!
//! Two modes:
//! - **Shell mode**: `custody [flags] COMMAND`: one invocation, exit
//! - **Pipe mode**: `custody [flags] < script`: one invocation per stdin line
//!
//! Logging goes to stderr and is controlled by `CUSTODY_LOG` (default `warn`).

mod commands;
mod format;
mod parse;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use custody_core::{AccountId, Scope, Variant};
use custody_engine::{Config, Database};
use custody_executor::{Executor, Program};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_output, format_paths, format_record, OutputMode};
use parse::{matches_to_action, parse_line, CliAction};

/// Snapshot file used when neither `--db`, `--ephemeral` nor a config file is given
const DEFAULT_DB: &str = "custody.snap";

fn main() {
    init_logging();

    let matches = build_cli().get_matches();
    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let executor = match open_executor(&matches) {
        Ok(exec) => exec,
        Err(e) => {
            error!(error = %e, "cannot start");
            process::exit(1);
        }
    };

    let exit_code = if matches.subcommand().is_some() {
        match matches_to_action(&matches) {
            Ok(action) => run_action(&executor, action, mode),
            Err(e) => {
                eprintln!("(error) {}", e);
                1
            }
        }
    } else {
        run_pipe(&executor, mode)
    };
    process::exit(exit_code);
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("CUSTODY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn load_config(matches: &clap::ArgMatches) -> Result<Config, String> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load(path).map_err(|e| e.to_string())?,
        None => Config::new().snapshot(DEFAULT_DB),
    };

    if let Some(variant) = matches.get_one::<String>("variant") {
        config = config.variant(variant.parse().map_err(|e: custody_core::Error| e.to_string())?);
    }
    if let Some(path) = matches.get_one::<String>("db") {
        config = config.snapshot(PathBuf::from(path));
    }
    if matches.get_flag("ephemeral") {
        config = config.ephemeral();
    }
    Ok(config)
}

fn open_executor(matches: &clap::ArgMatches) -> Result<Executor, String> {
    let config = load_config(matches)?;
    let db = Database::open(config).map_err(|e| format!("Failed to open database: {}", e))?;
    debug!(variant = %db.variant(), version = db.version(), "opened database");
    Ok(Executor::new(Arc::new(db)))
}

fn run_action(executor: &Executor, action: CliAction, mode: OutputMode) -> i32 {
    let variant = executor.variant();
    match action {
        CliAction::Invoke(invocation) => match executor.execute(&invocation) {
            Ok(output) => {
                println!("{}", format_output(&output, variant, mode));
                0
            }
            Err(e) => {
                eprintln!("{}", format_error(&e, mode));
                1
            }
        },
        CliAction::State { account } => {
            let scope = match (account, variant) {
                (Some(account), _) => variant.scope_for(&AccountId::new(account)),
                (None, Variant::Global) => Scope::Global,
                (None, Variant::PerAccount) => {
                    eprintln!("(error) state requires --account under the per-account variant");
                    return 1;
                }
            };
            match executor.record(&scope) {
                Ok(record) => {
                    println!("{}", format_record(&scope, &record, variant, mode));
                    0
                }
                Err(e) => {
                    eprintln!("{}", format_error(&e, mode));
                    1
                }
            }
        }
        CliAction::Compile { out } => match Program::compile(variant).write_to(&out) {
            Ok(paths) => {
                println!("{}", format_paths(&paths, mode));
                0
            }
            Err(e) => {
                eprintln!("{}", format_error(&e, mode));
                1
            }
        },
    }
}

fn run_pipe(executor: &Executor, mode: OutputMode) -> i32 {
    let mut exit_code = 0;
    for (number, line) in io::stdin().lock().lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("(error) {}", e);
                return 1;
            }
        };
        debug!(line = number + 1, input = %line, "pipe input");
        match parse_line(&line) {
            Ok(Some(action)) => {
                if run_action(executor, action, mode) != 0 {
                    exit_code = 1;
                }
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("(error) {}", e);
                exit_code = 1;
            }
        }
    }
    exit_code
}
