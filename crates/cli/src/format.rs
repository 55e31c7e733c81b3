//! Output formatting: human-readable or JSON.

use std::path::PathBuf;

use custody_core::{Error, Scope, StateRecord, Variant};
use custody_executor::Output;
use serde_json::json;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable
    Human,
    /// One JSON document per result
    Json,
}

fn stage_label(variant: Variant, record: &StateRecord) -> String {
    match variant.stage_name(record.stage) {
        Some(name) => format!("{} ({})", record.stage, name),
        None => record.stage.to_string(),
    }
}

/// Format an accepted invocation
pub fn format_output(output: &Output, variant: Variant, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string(output).unwrap_or_default(),
        OutputMode::Human => match output {
            Output::Accepted { action } => format!("OK {}", action),
            Output::Transitioned {
                scope,
                command,
                previous,
                record,
            } => format!(
                "OK {} [{}] stage {} -> {}, payment released: {}",
                command,
                scope,
                stage_label(variant, previous),
                stage_label(variant, record),
                record.payment_released
            ),
        },
    }
}

/// Format a record lookup
pub fn format_record(
    scope: &Scope,
    record: &StateRecord,
    variant: Variant,
    mode: OutputMode,
) -> String {
    match mode {
        OutputMode::Json => json!({
            "scope": scope,
            "Stage": record.stage,
            "PaymentReleased": record.payment_released,
        })
        .to_string(),
        OutputMode::Human => format!(
            "[{}] stage {}, payment released: {}",
            scope,
            stage_label(variant, record),
            record.payment_released
        ),
    }
}

/// Format the paths of written artifacts
pub fn format_paths(paths: &[PathBuf], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json!({ "written": paths }).to_string(),
        OutputMode::Human => paths
            .iter()
            .map(|p| format!("wrote {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Format a rejected or failed invocation
pub fn format_error(error: &Error, mode: OutputMode) -> String {
    let kind = match error {
        Error::InvalidTransition { .. } => "invalid_transition",
        Error::MalformedInvocation { .. } => "malformed_invocation",
        _ => "internal",
    };
    match mode {
        OutputMode::Json => json!({ "error": kind, "message": error.to_string() }).to_string(),
        OutputMode::Human => format!("(error) {}", error),
    }
}
