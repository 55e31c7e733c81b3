//! clap command tree
//!
//! The same operation subcommands serve shell mode (after the global flags)
//! and pipe mode (one stdin line at a time, no binary name).

use clap::{Arg, ArgAction, Command};

/// Default sender for lifecycle subcommands
pub const DEFAULT_SENDER: &str = "creator";

fn sender_arg() -> Arg {
    Arg::new("as")
        .long("as")
        .value_name("ACCOUNT")
        .help("Submitting account")
}

fn lifecycle(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(sender_arg().default_value(DEFAULT_SENDER))
}

/// Subcommands that map to invocations or queries
pub fn operation_subcommands() -> Vec<Command> {
    vec![
        lifecycle("create", "Create the application (once)"),
        lifecycle("opt-in", "Register an account"),
        lifecycle("close-out", "Deregister an account"),
        lifecycle("clear", "Force-deregister an account"),
        lifecycle("update", "Request an application update (always denied)"),
        lifecycle("delete", "Request application deletion (always denied)"),
        Command::new("call")
            .about("Submit a workflow command")
            .arg(
                Arg::new("command")
                    .required(true)
                    .value_name("COMMAND")
                    .help("ItemInCart, ItemDropped, ItemDelivered, ItemReceived or Reset"),
            )
            .arg(sender_arg().required(true)),
        Command::new("state")
            .about("Show the current record")
            .arg(
                Arg::new("account")
                    .long("account")
                    .value_name("ACCOUNT")
                    .help("Account whose record to show (per-account variant)"),
            ),
        Command::new("compile")
            .about("Write the approval and clear artifacts")
            .arg(
                Arg::new("out")
                    .long("out")
                    .value_name("DIR")
                    .default_value("build")
                    .help("Output directory"),
            ),
    ]
}

/// Top-level command with global flags
pub fn build_cli() -> Command {
    Command::new("custody")
        .about("Staged custody workflow")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("variant")
                .long("variant")
                .value_name("VARIANT")
                .global(true)
                .help("global or per-account"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .global(true)
                .conflicts_with("ephemeral")
                .help("Snapshot file"),
        )
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Keep state in memory only"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Print JSON output"),
        )
        .subcommands(operation_subcommands())
}

/// Command used to parse one pipe-mode line
pub fn build_line_cli() -> Command {
    Command::new("line")
        .no_binary_name(true)
        .subcommand_required(true)
        .disable_help_subcommand(true)
        .subcommands(operation_subcommands())
}
