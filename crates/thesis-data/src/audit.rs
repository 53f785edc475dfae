//! Append-only audit trail of dataset transformations

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;

pub const DEFAULT_ACTOR: &str = "system";

/// One recorded action. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entry_number: usize,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub details: Value,
    #[serde(rename = "user")]
    pub actor: String,
}

/// Counts per action plus first and last timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub dataset_id: String,
    pub total_transformations: usize,
    pub transformation_counts: BTreeMap<String, usize>,
    pub first_transformation: Option<DateTime<Utc>>,
    pub last_transformation: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditTrail {
    dataset_id: String,
    created_at: DateTime<Utc>,
    entries: Vec<AuditEntry>,
}

#[derive(Serialize)]
struct AuditLog<'a> {
    dataset_id: &'a str,
    created_at: DateTime<Utc>,
    total_entries: usize,
    entries: &'a [AuditEntry],
}

impl AuditTrail {
    pub fn new(dataset_id: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append an entry; `actor` defaults to `"system"`
    pub fn log(&mut self, action: &str, details: Value, actor: Option<&str>) -> &AuditEntry {
        let entry = AuditEntry {
            entry_number: self.entries.len() + 1,
            timestamp: Utc::now(),
            action: action.to_string(),
            details,
            actor: actor.unwrap_or(DEFAULT_ACTOR).to_string(),
        };
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> AuditSummary {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.action.clone()).or_insert(0) += 1;
        }
        AuditSummary {
            dataset_id: self.dataset_id.clone(),
            total_transformations: self.entries.len(),
            transformation_counts: counts,
            first_transformation: self.entries.first().map(|e| e.timestamp),
            last_transformation: self.entries.last().map(|e| e.timestamp),
        }
    }

    /// Render the trail as a Markdown document
    pub fn export_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Data Transformation Audit Trail\n");
        let _ = writeln!(out, "**Dataset ID:** {}", self.dataset_id);
        let _ = writeln!(
            out,
            "**Created:** {}",
            self.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(out, "**Total Transformations:** {}\n", self.entries.len());
        let _ = writeln!(out, "---\n");

        for entry in &self.entries {
            let _ = writeln!(
                out,
                "## Transformation {}: {}\n",
                entry.entry_number, entry.action
            );
            let _ = writeln!(
                out,
                "**Timestamp:** {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S")
            );
            let _ = writeln!(out, "**Performed by:** {}\n", entry.actor);
            if let Value::Object(map) = &entry.details {
                if !map.is_empty() {
                    let _ = writeln!(out, "**Details:**");
                    for (key, value) in map {
                        let rendered = match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        let _ = writeln!(out, "- {}: {}", key, rendered);
                    }
                    out.push('\n');
                }
            }
            let _ = writeln!(out, "---\n");
        }
        out
    }

    /// Pretty-printed JSON of the whole log
    pub fn export_json(&self) -> Result<String> {
        let log = AuditLog {
            dataset_id: &self.dataset_id,
            created_at: self.created_at,
            total_entries: self.entries.len(),
            entries: &self.entries,
        };
        Ok(serde_json::to_string_pretty(&log)?)
    }

    /// Remove every entry at once
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entries_are_numbered_in_order() {
        let mut trail = AuditTrail::new("dataset_1");
        trail.log("import", json!({"rows": 10}), None);
        trail.log("winsorize", json!({"column": "age"}), Some("alice"));
        trail.log("import", json!({}), None);

        let entries = trail.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].entry_number, 1);
        assert_eq!(entries[2].entry_number, 3);
        assert_eq!(entries[0].actor, "system");
        assert_eq!(entries[1].actor, "alice");
        assert!(entries[0].timestamp <= entries[2].timestamp);
    }

    #[test]
    fn test_summary_counts_actions() {
        let mut trail = AuditTrail::new("dataset_1");
        assert!(trail.summary().first_transformation.is_none());
        trail.log("import", json!({}), None);
        trail.log("recode", json!({}), None);
        trail.log("recode", json!({}), None);

        let summary = trail.summary();
        assert_eq!(summary.total_transformations, 3);
        assert_eq!(summary.transformation_counts["recode"], 2);
        assert_eq!(summary.transformation_counts["import"], 1);
        assert!(summary.first_transformation.is_some());
    }

    #[test]
    fn test_markdown_layout() {
        let mut trail = AuditTrail::new("dataset_7");
        trail.log("handle_missing", json!({"method": "mean", "imputed": 3}), None);
        let md = trail.export_markdown();
        assert!(md.starts_with("# Data Transformation Audit Trail"));
        assert!(md.contains("**Dataset ID:** dataset_7"));
        assert!(md.contains("**Total Transformations:** 1"));
        assert!(md.contains("## Transformation 1: handle_missing"));
        assert!(md.contains("- method: mean"));
        assert!(md.contains("- imputed: 3"));
        assert!(md.contains("**Performed by:** system"));
    }

    #[test]
    fn test_json_export_and_clear() {
        let mut trail = AuditTrail::new("dataset_2");
        trail.log("import", json!({"file": "a.csv"}), None);
        let parsed: Value = serde_json::from_str(&trail.export_json().unwrap()).unwrap();
        assert_eq!(parsed["total_entries"], 1);
        assert_eq!(parsed["entries"][0]["user"], "system");
        assert_eq!(parsed["entries"][0]["details"]["file"], "a.csv");

        trail.clear();
        assert!(trail.is_empty());
    }
}
