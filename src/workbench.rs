//! Dataset-level dispatch: import, analyse, check, package

use crate::config::WorkbenchConfig;
use crate::Result;
use serde::Serialize;
use serde_json::json;
use std::io::Read;
use std::path::Path;
use thesis_assumptions::{AssumptionChecker, AssumptionReport, AssumptionRequest};
use thesis_data::{import, AuditTrail, DatasetId, DatasetStore, InMemoryStore};
use thesis_engine::{ResultRecord, TestEngine, TestParameters, TestSelector, TestSpecification};
use thesis_narrative::{Interpretation, NarrativeRequestor};
use thesis_report::{build_tables, sample_characteristics, ReportTables};
use tracing::{info, instrument, warn};

/// Research objective used when a request names none
pub const DEFAULT_OBJECTIVE: &str = "Examine the relationship between variables";

/// One analysis with everything produced from its record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub record: ResultRecord,
    /// Absent for error-only records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<ReportTables>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<Interpretation>,
}

impl AnalysisOutcome {
    pub fn is_complete(&self) -> bool {
        self.record.is_complete()
    }
}

/// Everything a results chapter needs for one dataset
#[derive(Debug, Clone, Serialize)]
pub struct ResultsPackage {
    pub dataset_id: DatasetId,
    pub sample_size: usize,
    pub objectives: Vec<String>,
    pub sample: ReportTables,
    pub analyses: Vec<AnalysisOutcome>,
    pub methods: Interpretation,
    pub audit_trail: AuditTrail,
}

impl ResultsPackage {
    /// Sample table, every analysis table and interpretation, then the
    /// methods narrative and audit log
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Results\n\n");
        out.push_str(&self.sample.to_markdown());
        for (i, analysis) in self.analyses.iter().enumerate() {
            let heading = analysis
                .record
                .result()
                .map(|r| r.test_type.clone())
                .unwrap_or_else(|| format!("Analysis {}", i + 1));
            out.push_str(&format!("\n\n## {heading}\n\n"));
            match (&analysis.tables, analysis.record.error()) {
                (Some(tables), _) => out.push_str(&tables.to_markdown()),
                (None, Some(error)) => out.push_str(&format!("Analysis failed: {error}")),
                (None, None) => {}
            }
            if let Some(interpretation) = &analysis.interpretation {
                if !interpretation.text.is_empty() {
                    out.push_str("\n\n");
                    out.push_str(&interpretation.text);
                }
            }
        }
        out.push_str("\n\n## Methods\n\n");
        out.push_str(&self.methods.text);
        out.push_str("\n\n");
        out.push_str(&self.audit_trail.export_markdown());
        out
    }
}

/// Facade over a dataset store, the test engine, the assumption checker
/// and the narrative requestor
pub struct Workbench<S = InMemoryStore> {
    config: WorkbenchConfig,
    store: S,
    engine: TestEngine,
    checker: AssumptionChecker,
    narrator: NarrativeRequestor,
}

impl Workbench<InMemoryStore> {
    pub fn in_memory(config: WorkbenchConfig) -> Result<Self> {
        Self::new(config, InMemoryStore::new())
    }
}

impl<S: DatasetStore> Workbench<S> {
    pub fn new(config: WorkbenchConfig, store: S) -> Result<Self> {
        let engine = TestEngine::new(config.alpha)?;
        let checker = AssumptionChecker::new(config.alpha)?;
        let narrator = NarrativeRequestor::from_config(&config.narrative);
        Ok(Self {
            config,
            store,
            engine,
            checker,
            narrator,
        })
    }

    /// Replace the providers built from configuration
    pub fn with_narrator(mut self, narrator: NarrativeRequestor) -> Self {
        self.narrator = narrator;
        self
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &TestEngine {
        &self.engine
    }

    /// Import CSV and store it as a new dataset with an `import` audit entry
    #[instrument(skip(self, reader))]
    pub fn import_csv<R: Read>(&self, name: &str, reader: R) -> Result<DatasetId> {
        let imported = import::from_reader(name, reader)?;
        let metadata = imported.metadata;
        let id = self
            .store
            .create(Some(name), imported.dataset.into_frame())?;
        self.store.log_action(
            &id,
            "import",
            json!({
                "filename": name,
                "file_type": "csv",
                "rows": metadata.rows,
                "columns": metadata.columns,
            }),
            None,
        )?;
        info!(%id, rows = metadata.rows, columns = metadata.columns, "dataset imported");
        Ok(id)
    }

    pub fn import_path(&self, path: impl AsRef<Path>) -> Result<DatasetId> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.import_csv(&name, std::fs::File::open(path)?)
    }

    /// Run one test on the current version of a dataset
    ///
    /// Test failures come back inside the outcome's record; `Err` is only
    /// returned when the dataset itself cannot be read or logged to.
    #[instrument(skip(self, params, objective))]
    pub fn run_analysis(
        &self,
        id: &DatasetId,
        selector: TestSelector,
        params: &TestParameters,
        objective: Option<&str>,
        interpret: bool,
    ) -> Result<AnalysisOutcome> {
        let dataset = self.store.get(id)?;
        let record = self.engine.run(&dataset, selector, params);

        let tables = match build_tables(&record) {
            Ok(tables) => Some(tables),
            Err(thesis_report::Error::ErrorRecord(_)) => None,
            Err(e) => {
                warn!(error = %e, "tables could not be built");
                None
            }
        };
        let interpretation = interpret.then(|| {
            self.narrator
                .interpret(&record, objective.unwrap_or(DEFAULT_OBJECTIVE))
        });

        self.store.log_action(
            id,
            "analysis",
            json!({
                "type": selector.name(),
                "params": params,
                "significant": record.result().map(|r| r.significant),
                "error": record.error(),
            }),
            None,
        )?;

        Ok(AnalysisOutcome {
            record,
            tables,
            interpretation,
        })
    }

    pub fn run_spec(
        &self,
        id: &DatasetId,
        spec: &TestSpecification,
        objective: Option<&str>,
        interpret: bool,
    ) -> Result<AnalysisOutcome> {
        self.run_analysis(id, spec.selector, &spec.parameters, objective, interpret)
    }

    #[instrument(skip(self))]
    pub fn check_assumption(
        &self,
        id: &DatasetId,
        request: &AssumptionRequest,
    ) -> Result<AssumptionReport> {
        let dataset = self.store.get(id)?;
        let report = self.checker.check(&dataset, request);
        self.store.log_action(
            id,
            "assumption_check",
            serde_json::to_value(request)?,
            None,
        )?;
        Ok(report)
    }

    /// Run every analysis, pairing it with the objective at the same
    /// position, and collect the sample table, methods narrative and
    /// audit trail
    #[instrument(skip_all, fields(%id, analyses = analyses.len()))]
    pub fn results_package(
        &self,
        id: &DatasetId,
        analyses: &[TestSpecification],
        objectives: &[String],
    ) -> Result<ResultsPackage> {
        let dataset = self.store.get(id)?;
        let descriptives = self.engine.describe(&dataset, None)?;
        let sample = sample_characteristics(&descriptives);

        let outcomes = analyses
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                self.run_spec(id, spec, objectives.get(i).map(String::as_str), true)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut tests_used: Vec<String> = Vec::new();
        for spec in analyses {
            let description = spec.selector.description().to_string();
            if !tests_used.contains(&description) {
                tests_used.push(description);
            }
        }
        let methods = self.narrator.methods_section(
            &tests_used,
            &dataset.column_names(),
            self.engine.alpha(),
        );

        Ok(ResultsPackage {
            dataset_id: id.clone(),
            sample_size: dataset.height(),
            objectives: objectives.to_vec(),
            sample,
            analyses: outcomes,
            methods,
            audit_trail: self.store.audit(id)?,
        })
    }
}
