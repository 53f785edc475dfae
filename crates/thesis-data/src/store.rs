//! Versioned dataset storage
//!
//! Every mutation appends a full snapshot under a new version name; existing
//! versions are never overwritten. Each dataset sits behind its own lock so
//! at most one writer mutates a given dataset at a time while readers of
//! other datasets proceed independently.

use crate::audit::{AuditEntry, AuditTrail};
use crate::{Dataset, Error, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument};

/// Version name given to freshly imported data
pub const INITIAL_VERSION: &str = "v1_raw";

/// Opaque dataset identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DatasetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: DatasetId,
    pub name: String,
    pub version: String,
    pub rows: usize,
    pub columns: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub rows: usize,
    pub columns: usize,
    pub is_current: bool,
}

/// Shape and column differences between two versions (second minus first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionComparison {
    pub version1: String,
    pub version2: String,
    pub row_diff: i64,
    pub col_diff: i64,
    pub columns_added: Vec<String>,
    pub columns_removed: Vec<String>,
}

/// Operation applied under the dataset's write lock; returns the new frame
/// and a JSON report that is written to the audit trail
pub type ModifyOp<'a> = dyn FnMut(&Dataset) -> Result<(DataFrame, Value)> + 'a;

/// Dataset lifecycle: create, read, versioned update, delete, audit
pub trait DatasetStore: Send + Sync {
    /// Store a new dataset under version [`INITIAL_VERSION`]
    fn create(&self, name: Option<&str>, frame: DataFrame) -> Result<DatasetId>;

    /// Current version
    fn get(&self, id: &DatasetId) -> Result<Dataset>;

    fn get_version(&self, id: &DatasetId, version: &str) -> Result<Dataset>;

    /// Append a snapshot; fails if `version` already exists
    fn update(&self, id: &DatasetId, frame: DataFrame, version: &str) -> Result<()>;

    /// Read, transform and append a version as one step
    ///
    /// The new version is named `v{n}_{label}` where `n` is the next version
    /// number. On success an audit entry is logged with the operation's
    /// report and the version name is returned together with the report.
    fn modify(
        &self,
        id: &DatasetId,
        label: &str,
        action: &str,
        op: &mut ModifyOp<'_>,
    ) -> Result<(String, Value)>;

    fn list(&self) -> Vec<DatasetSummary>;

    fn versions(&self, id: &DatasetId) -> Result<Vec<VersionInfo>>;

    fn compare_versions(
        &self,
        id: &DatasetId,
        version1: &str,
        version2: &str,
    ) -> Result<VersionComparison>;

    fn delete(&self, id: &DatasetId) -> Result<()>;

    fn log_action(
        &self,
        id: &DatasetId,
        action: &str,
        details: Value,
        actor: Option<&str>,
    ) -> Result<AuditEntry>;

    /// Snapshot of the audit trail
    fn audit(&self, id: &DatasetId) -> Result<AuditTrail>;

    fn clear_audit(&self, id: &DatasetId) -> Result<()>;
}

#[derive(Debug)]
struct Version {
    name: String,
    frame: DataFrame,
    saved_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Entry {
    name: String,
    created_at: DateTime<Utc>,
    versions: Vec<Version>,
    /// Number of the last generated `v{n}_{label}` name
    sequence: usize,
    audit: AuditTrail,
}

impl Entry {
    fn current(&self) -> &Version {
        // never empty: created with one version and versions are only appended
        &self.versions[self.versions.len() - 1]
    }

    fn find(&self, version: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.name == version)
    }

    /// Next free `v{n}_{label}` name; `n` only ever grows
    fn next_version(&mut self, label: &str) -> String {
        loop {
            self.sequence += 1;
            let name = format!("v{}_{}", self.sequence, label);
            if self.find(&name).is_none() {
                return name;
            }
        }
    }

    fn push(&mut self, id: &DatasetId, frame: DataFrame, version: &str) -> Result<()> {
        if self.find(version).is_some() {
            return Err(Error::VersionExists {
                dataset: id.to_string(),
                version: version.to_string(),
            });
        }
        self.versions.push(Version {
            name: version.to_string(),
            frame,
            saved_at: Utc::now(),
        });
        Ok(())
    }
}

/// Process-local store; contents vanish when the store is dropped
#[derive(Debug, Default)]
pub struct InMemoryStore {
    datasets: DashMap<DatasetId, Arc<RwLock<Entry>>>,
    counter: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    fn entry(&self, id: &DatasetId) -> Result<Arc<RwLock<Entry>>> {
        self.datasets
            .get(id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| Error::DatasetNotFound(id.to_string()))
    }

    fn read<T>(&self, id: &DatasetId, f: impl FnOnce(&Entry) -> Result<T>) -> Result<T> {
        let entry = self.entry(id)?;
        let guard = entry
            .read()
            .map_err(|_| Error::Poisoned(id.to_string()))?;
        f(&guard)
    }

    fn write<T>(&self, id: &DatasetId, f: impl FnOnce(&mut Entry) -> Result<T>) -> Result<T> {
        let entry = self.entry(id)?;
        let mut guard = entry
            .write()
            .map_err(|_| Error::Poisoned(id.to_string()))?;
        f(&mut guard)
    }
}

impl DatasetStore for InMemoryStore {
    #[instrument(skip(self, frame), fields(rows = frame.height()))]
    fn create(&self, name: Option<&str>, frame: DataFrame) -> Result<DatasetId> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = DatasetId(format!("dataset_{}", n));
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("Dataset {}", n));
        let now = Utc::now();
        let entry = Entry {
            name,
            created_at: now,
            versions: vec![Version {
                name: INITIAL_VERSION.to_string(),
                frame,
                saved_at: now,
            }],
            sequence: 1,
            audit: AuditTrail::new(id.as_str()),
        };
        self.datasets.insert(id.clone(), Arc::new(RwLock::new(entry)));
        debug!(%id, "dataset created");
        Ok(id)
    }

    fn get(&self, id: &DatasetId) -> Result<Dataset> {
        self.read(id, |e| Ok(Dataset::new(e.name.clone(), e.current().frame.clone())))
    }

    fn get_version(&self, id: &DatasetId, version: &str) -> Result<Dataset> {
        self.read(id, |e| {
            e.find(version)
                .map(|v| Dataset::new(e.name.clone(), v.frame.clone()))
                .ok_or_else(|| Error::VersionNotFound {
                    dataset: id.to_string(),
                    version: version.to_string(),
                })
        })
    }

    #[instrument(skip(self, frame))]
    fn update(&self, id: &DatasetId, frame: DataFrame, version: &str) -> Result<()> {
        self.write(id, |e| e.push(id, frame, version))?;
        debug!("version appended");
        Ok(())
    }

    #[instrument(skip(self, op))]
    fn modify(
        &self,
        id: &DatasetId,
        label: &str,
        action: &str,
        op: &mut ModifyOp<'_>,
    ) -> Result<(String, Value)> {
        self.write(id, |e| {
            let current = Dataset::new(e.name.clone(), e.current().frame.clone());
            let (frame, report) = op(&current)?;
            let version = e.next_version(label);
            e.push(id, frame, &version)?;
            e.audit.log(action, report.clone(), None);
            debug!(%version, "dataset modified");
            Ok((version, report))
        })
    }

    fn list(&self) -> Vec<DatasetSummary> {
        let mut out: Vec<DatasetSummary> = self
            .datasets
            .iter()
            .filter_map(|item| {
                let guard = item.value().read().ok()?;
                let current = guard.current();
                Some(DatasetSummary {
                    id: item.key().clone(),
                    name: guard.name.clone(),
                    version: current.name.clone(),
                    rows: current.frame.height(),
                    columns: current.frame.width(),
                    created_at: guard.created_at,
                })
            })
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        out
    }

    fn versions(&self, id: &DatasetId) -> Result<Vec<VersionInfo>> {
        self.read(id, |e| {
            let current = e.current().name.as_str();
            Ok(e.versions
                .iter()
                .map(|v| VersionInfo {
                    version: v.name.clone(),
                    saved_at: v.saved_at,
                    rows: v.frame.height(),
                    columns: v.frame.width(),
                    is_current: v.name == current,
                })
                .collect())
        })
    }

    fn compare_versions(
        &self,
        id: &DatasetId,
        version1: &str,
        version2: &str,
    ) -> Result<VersionComparison> {
        let first = self.get_version(id, version1)?;
        let second = self.get_version(id, version2)?;
        let cols1: BTreeSet<String> = first.column_names().into_iter().collect();
        let cols2: BTreeSet<String> = second.column_names().into_iter().collect();
        Ok(VersionComparison {
            version1: version1.to_string(),
            version2: version2.to_string(),
            row_diff: second.height() as i64 - first.height() as i64,
            col_diff: second.width() as i64 - first.width() as i64,
            columns_added: cols2.difference(&cols1).cloned().collect(),
            columns_removed: cols1.difference(&cols2).cloned().collect(),
        })
    }

    #[instrument(skip(self))]
    fn delete(&self, id: &DatasetId) -> Result<()> {
        self.datasets
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::DatasetNotFound(id.to_string()))
    }

    fn log_action(
        &self,
        id: &DatasetId,
        action: &str,
        details: Value,
        actor: Option<&str>,
    ) -> Result<AuditEntry> {
        self.write(id, |e| Ok(e.audit.log(action, details, actor).clone()))
    }

    fn audit(&self, id: &DatasetId) -> Result<AuditTrail> {
        self.read(id, |e| Ok(e.audit.clone()))
    }

    fn clear_audit(&self, id: &DatasetId) -> Result<()> {
        self.write(id, |e| {
            e.audit.clear();
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use serde_json::json;

    fn frame(values: &[f64]) -> DataFrame {
        DataFrame::new(vec![Series::new("x".into(), values.to_vec()).into()]).unwrap()
    }

    #[test]
    fn test_ids_are_sequential() {
        let store = InMemoryStore::new();
        let a = store.create(None, frame(&[1.0])).unwrap();
        let b = store.create(Some("survey.csv"), frame(&[1.0])).unwrap();
        assert_eq!(a.as_str(), "dataset_1");
        assert_eq!(b.as_str(), "dataset_2");
        assert_eq!(store.get(&a).unwrap().name(), "Dataset 1");
        assert_eq!(store.get(&b).unwrap().name(), "survey.csv");
    }

    #[test]
    fn test_versions_are_never_overwritten() {
        let store = InMemoryStore::new();
        let id = store.create(None, frame(&[1.0, 2.0])).unwrap();
        store.update(&id, frame(&[1.0]), "v2_cleaned").unwrap();

        let err = store.update(&id, frame(&[5.0]), "v2_cleaned").unwrap_err();
        assert!(matches!(err, Error::VersionExists { .. }));

        assert_eq!(store.get(&id).unwrap().height(), 1);
        assert_eq!(store.get_version(&id, INITIAL_VERSION).unwrap().height(), 2);
        let versions = store.versions(&id).unwrap();
        assert_eq!(versions.len(), 2);
        assert!(versions[1].is_current);
        assert!(!versions[0].is_current);
    }

    #[test]
    fn test_modify_logs_and_names_version() {
        let store = InMemoryStore::new();
        let id = store.create(None, frame(&[1.0, 2.0, 3.0])).unwrap();
        let (version, report) = store
            .modify(&id, "cleaned", "drop_first", &mut |ds: &Dataset| {
                let frame = ds.filter_rows(&[false, true, true])?;
                Ok((frame, json!({"rows_removed": 1})))
            })
            .unwrap();
        assert_eq!(version, "v2_cleaned");
        assert_eq!(report["rows_removed"], 1);

        let trail = store.audit(&id).unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.entries()[0].action, "drop_first");

        let cmp = store.compare_versions(&id, INITIAL_VERSION, &version).unwrap();
        assert_eq!(cmp.row_diff, -1);
        assert_eq!(cmp.col_diff, 0);
    }

    #[test]
    fn test_modify_skips_names_taken_by_update() {
        let store = InMemoryStore::new();
        let id = store.create(None, frame(&[1.0, 2.0, 3.0])).unwrap();
        store.update(&id, frame(&[1.0, 2.0]), "v2_cleaned").unwrap();
        store.update(&id, frame(&[1.0]), "v4_cleaned").unwrap();

        let mut keep = |ds: &Dataset| -> crate::Result<(DataFrame, serde_json::Value)> {
            Ok((ds.frame().clone(), json!({})))
        };
        let (first, _) = store.modify(&id, "cleaned", "noop", &mut keep).unwrap();
        let (second, _) = store.modify(&id, "cleaned", "noop", &mut keep).unwrap();
        assert_eq!(first, "v3_cleaned");
        assert_eq!(second, "v5_cleaned");
        assert_eq!(store.versions(&id).unwrap().len(), 5);
    }

    #[test]
    fn test_failed_modify_leaves_dataset_untouched() {
        let store = InMemoryStore::new();
        let id = store.create(None, frame(&[1.0])).unwrap();
        let result = store.modify(&id, "cleaned", "noop", &mut |_ds: &Dataset| {
            Err(Error::InvalidParameter("bad".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.versions(&id).unwrap().len(), 1);
        assert!(store.audit(&id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_and_missing() {
        let store = InMemoryStore::new();
        let id = store.create(None, frame(&[1.0])).unwrap();
        assert_eq!(store.list().len(), 1);
        store.delete(&id).unwrap();
        assert!(matches!(store.get(&id), Err(Error::DatasetNotFound(_))));
        assert!(store.delete(&id).is_err());
        assert!(store.list().is_empty());
    }
}
