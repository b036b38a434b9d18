//! Loads the identifier list (ISINs or tickers) that drives a run.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::EtfError;

/// Read a JSON array of identifier strings.
///
/// Elements are trimmed and upper-cased. Duplicates are dropped (first one
/// wins) so every identifier ends up in exactly one outcome.
///
/// # Errors
///
/// Returns [`EtfError::InputFormat`] if the file is missing or unreadable, is
/// not valid JSON, is not an array, or holds an element that is not a
/// non-empty string.
pub fn load_identifiers(path: &Path) -> Result<Vec<String>, EtfError> {
    let raw = fs::read_to_string(path).map_err(|e| EtfError::input(path, e.to_string()))?;
    let text = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

    let value: Value =
        serde_json::from_str(text).map_err(|e| EtfError::input(path, format!("not valid JSON: {e}")))?;
    let Value::Array(items) = value else {
        return Err(EtfError::input(path, "expected a JSON array of strings"));
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut ids = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let Value::String(s) = item else {
            return Err(EtfError::input(
                path,
                format!("element {idx} is not a string: {item}"),
            ));
        };
        let id = s.trim().to_uppercase();
        if id.is_empty() {
            return Err(EtfError::input(path, format!("element {idx} is an empty string")));
        }
        if !seen.insert(id.clone()) {
            warn!(identifier = %id, "duplicate identifier in input, keeping the first occurrence");
            continue;
        }
        ids.push(id);
    }

    Ok(ids)
}
