//! Common fixtures for workbench tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use thesis_stats::thesis_narrative::{NarrativeProvider, NarrativeRequest, ProviderError};
use thesis_stats::{NarrativeRequestor, Workbench, WorkbenchConfig};

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness; honours `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Twelve participants: treatment scores sit well above control
pub const STUDY_CSV: &str = "\
participant,group,score,hours,gender
1,control,10,1,female
2,control,12,2,male
3,control,11,3,female
4,control,13,4,male
5,control,9,5,female
6,control,12,6,male
7,treatment,15,7,female
8,treatment,17,8,male
9,treatment,16,9,female
10,treatment,18,10,male
11,treatment,14,11,female
12,treatment,17,12,male
";

/// Provider that records every request and answers with a fixed text
#[derive(Clone, Default)]
pub struct Recorder {
    pub requests: Arc<Mutex<Vec<NarrativeRequest>>>,
}

impl Recorder {
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl NarrativeProvider for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn attempt(&self, request: &NarrativeRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok("Recorded narrative.".to_string())
    }
}

pub fn quiet_config() -> WorkbenchConfig {
    let mut config = WorkbenchConfig::default();
    config.narrative.enabled = false;
    config
}

/// In-memory workbench whose only narrative provider is `recorder`
pub fn workbench(recorder: &Recorder) -> Workbench {
    init_tracing();
    Workbench::in_memory(quiet_config())
        .unwrap()
        .with_narrator(NarrativeRequestor::with_providers(vec![Box::new(
            recorder.clone(),
        )]))
}
