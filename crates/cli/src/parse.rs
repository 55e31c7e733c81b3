//! ArgMatches → invocation/query conversion.
//!
//! Shell mode parses one subcommand. Pipe mode parses each stdin line the
//! same way; `;` joins several operations into one invocation, which the
//! executor then rejects as malformed.

use std::path::PathBuf;

use clap::ArgMatches;
use custody_core::Action;
use custody_executor::{Invocation, Operation};

use crate::commands::{build_line_cli, DEFAULT_SENDER};

/// What one parsed input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Submit an invocation
    Invoke(Invocation),
    /// Print a record
    State {
        /// Account for per-account lookups
        account: Option<String>,
    },
    /// Write program artifacts
    Compile {
        /// Output directory
        out: PathBuf,
    },
}

fn sender(m: &ArgMatches) -> String {
    m.get_one::<String>("as")
        .cloned()
        .unwrap_or_else(|| DEFAULT_SENDER.to_string())
}

fn lifecycle_action(name: &str) -> Option<Action> {
    match name {
        "create" => Some(Action::Create),
        "opt-in" => Some(Action::OptIn),
        "close-out" => Some(Action::CloseOut),
        "clear" => Some(Action::ClearState),
        "update" => Some(Action::UpdateApplication),
        "delete" => Some(Action::DeleteApplication),
        _ => None,
    }
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, m) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    if let Some(action) = lifecycle_action(sub_name) {
        return Ok(CliAction::Invoke(Invocation::lifecycle(sender(m), action)));
    }

    match sub_name {
        "call" => {
            let command = m
                .get_one::<String>("command")
                .cloned()
                .ok_or("call requires a COMMAND")?;
            Ok(CliAction::Invoke(Invocation::call(sender(m), command)))
        }
        "state" => Ok(CliAction::State {
            account: m.get_one::<String>("account").cloned(),
        }),
        "compile" => Ok(CliAction::Compile {
            out: m
                .get_one::<String>("out")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("build")),
        }),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn parse_segment(segment: &str) -> Result<CliAction, String> {
    let words = shlex::split(segment).ok_or_else(|| format!("Unbalanced quotes: {}", segment))?;
    let matches = build_line_cli()
        .try_get_matches_from(words)
        .map_err(|e| e.to_string().trim_end().to_string())?;
    matches_to_action(&matches)
}

/// Parse one pipe-mode line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<CliAction>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let segments: Vec<&str> = trimmed.split(';').map(str::trim).collect();
    if segments.len() == 1 {
        return parse_segment(segments[0]).map(Some);
    }

    let mut sender = None;
    let mut operations: Vec<Operation> = Vec::with_capacity(segments.len());
    for segment in segments.iter().filter(|s| !s.is_empty()) {
        match parse_segment(segment)? {
            CliAction::Invoke(inv) => {
                let inv_sender = inv.sender.clone();
                if *sender.get_or_insert_with(|| inv_sender.clone()) != inv_sender {
                    return Err("Operations joined with ';' must share one sender".to_string());
                }
                operations.extend(inv.operations);
            }
            _ => return Err("Only invocations can be joined with ';'".to_string()),
        }
    }

    let sender = sender.ok_or("No operation in line")?;
    Ok(Some(CliAction::Invoke(Invocation::new(sender, operations))))
}
