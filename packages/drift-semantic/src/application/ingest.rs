//! `ingest-purposes` / `ingest-findings`: validate an externally-produced
//! file and copy it into the output directory verbatim.
//!
//! Validation aggregates every per-entry error before failing, rather
//! than stopping at the first one, so a single run surfaces the whole
//! list of problems in the input file.

use serde_json::Value;
use tracing::info;

use crate::errors::{DriftError, Result};
use crate::infrastructure::artifact_store::ArtifactStore;

const VALID_VERDICTS: [&str; 4] = ["DUPLICATE", "OVERLAPPING", "RELATED", "FALSE_POSITIVE"];

fn validate_purpose_statements(raw: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let Some(entries) = raw.as_array() else {
        return vec!["purpose-statements.json must be a JSON array".to_string()];
    };
    for (idx, entry) in entries.iter().enumerate() {
        let unit_id = entry.get("unitId").and_then(Value::as_str);
        let purpose = entry.get("purpose").and_then(Value::as_str);
        if unit_id.is_none() {
            errors.push(format!("entry {idx}: missing string field 'unitId'"));
        }
        if purpose.is_none() {
            errors.push(format!("entry {idx}: missing string field 'purpose'"));
        }
    }
    errors
}

fn validate_findings(raw: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let Some(entries) = raw.as_array() else {
        return vec!["findings.json must be a JSON array".to_string()];
    };
    for (idx, entry) in entries.iter().enumerate() {
        if entry.get("clusterId").and_then(Value::as_str).is_none() {
            errors.push(format!("entry {idx}: missing string field 'clusterId'"));
        }
        match entry.get("verdict").and_then(Value::as_str) {
            Some(v) if VALID_VERDICTS.contains(&v) => {}
            Some(v) => errors.push(format!(
                "entry {idx}: verdict '{v}' is not one of {VALID_VERDICTS:?}"
            )),
            None => errors.push(format!("entry {idx}: missing string field 'verdict'")),
        }
    }
    errors
}

fn ingest(
    store: &ArtifactStore,
    source_path: &std::path::Path,
    artifact: &str,
    validate: impl Fn(&Value) -> Vec<String>,
) -> Result<()> {
    let bytes = std::fs::read(source_path)?;
    let raw: Value = serde_json::from_slice(&bytes).map_err(|source| DriftError::MalformedArtifact {
        path: source_path.display().to_string(),
        source,
    })?;

    let errors = validate(&raw);
    if !errors.is_empty() {
        return Err(DriftError::Validation {
            file: source_path.display().to_string(),
            errors,
        });
    }

    store.write(artifact, &raw)?;
    info!(artifact, source = %source_path.display(), "ingested and validated");
    Ok(())
}

pub fn ingest_purposes(store: &ArtifactStore, source_path: &std::path::Path) -> Result<()> {
    ingest(store, source_path, "purpose-statements", validate_purpose_statements)
}

pub fn ingest_findings(store: &ArtifactStore, source_path: &std::path::Path) -> Result<()> {
    ingest(store, source_path, "findings", validate_findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn purpose_statements_reports_all_missing_fields_across_entries() {
        let raw = json!([
            {"unitId": "a"},
            {"purpose": "does a thing"},
        ]);
        let errors = validate_purpose_statements(&raw);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn findings_rejects_unknown_verdict() {
        let raw = json!([{"clusterId": "cluster-001", "verdict": "MAYBE"}]);
        let errors = validate_findings(&raw);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn findings_accepts_all_four_verdicts() {
        for v in VALID_VERDICTS {
            let raw = json!([{"clusterId": "cluster-001", "verdict": v}]);
            assert!(validate_findings(&raw).is_empty());
        }
    }

    #[test]
    fn non_array_top_level_is_rejected() {
        let raw = json!({"not": "an array"});
        assert_eq!(validate_findings(&raw).len(), 1);
        assert_eq!(validate_purpose_statements(&raw).len(), 1);
    }
}
