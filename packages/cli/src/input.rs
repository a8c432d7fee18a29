// ABOUTME: Turns command-line arguments and files into request inputs
// ABOUTME: Status parsing, record updates, squad selections and catalogue files

use anyhow::{bail, Context, Result};
use std::path::Path;

use regressivos_core::{CoreError, RecordUpdateInput, SquadsConfig, TestStatus, ValidationError};

/// Accepts only the four known statuses.
pub fn parse_status(raw: &str) -> Result<TestStatus> {
    let status = TestStatus::parse(raw);
    if !status.is_known() {
        let known = TestStatus::KNOWN;
        let allowed: Vec<&str> = known.iter().map(|s| s.as_str()).collect();
        bail!(
            "Unknown status '{}' (expected one of: {})",
            raw.trim(),
            allowed.join(", ")
        );
    }
    Ok(status)
}

/// Builds a record update from flags. Empty strings are kept so a field can be
/// cleared.
pub fn record_update(
    status: Option<&str>,
    responsible: Option<String>,
    detail: Option<String>,
    bug: Option<String>,
) -> Result<RecordUpdateInput> {
    Ok(RecordUpdateInput {
        status: status.map(parse_status).transpose()?,
        delivery_detail: detail,
        responsible,
        bug_report: bug,
    })
}

/// Flattens `--squad a --squad b,c` into distinct trimmed names, in order.
pub fn split_squads(values: &[String]) -> Vec<String> {
    let mut squads: Vec<String> = Vec::new();
    for name in values.iter().flat_map(|v| v.split(',')) {
        let name = name.trim();
        if !name.is_empty() && !squads.iter().any(|s| s == name) {
            squads.push(name.to_string());
        }
    }
    squads
}

/// Fails with every validation message when the list is non-empty.
pub fn ensure_valid(errors: Vec<ValidationError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(errors).into())
    }
}

/// Reads a squad catalogue from JSON, either `{"squads": [...]}` or a bare array.
pub async fn load_squads_file(path: &Path) -> Result<SquadsConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_squads(&content).with_context(|| format!("Invalid squads file {}", path.display()))
}

pub fn parse_squads(content: &str) -> Result<SquadsConfig> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let config: SquadsConfig = if value.is_array() {
        SquadsConfig {
            squads: serde_json::from_value(value)?,
        }
    } else {
        serde_json::from_value(value)?
    };

    let mut errors = Vec::new();
    for (index, entry) in config.squads.iter().enumerate() {
        if entry.squad.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("squads[{}]", index),
                "Squad name is required",
            ));
        }
    }
    ensure_valid(errors)?;
    Ok(config)
}
