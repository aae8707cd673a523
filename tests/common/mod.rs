// Shared test helpers for integration tests
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use adaptavist_reporter::core::config::{CliOptions, EffectiveConfig, FileOptions, resolve};
use adaptavist_reporter::core::models::{
    CompletedTest, Marker, RawTestResult, RunIdentity, StepStatus, TestStatus,
};
use adaptavist_reporter::infra::api::AdaptavistApi;
use anyhow::Result;

/// One recorded call against the fake remote system.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CreateTestRun {
        project_key: String,
        run_name: String,
    },
    GetTestRun {
        run_key: String,
    },
    ExecuteTestResult {
        test_run_key: String,
        test_case_key: String,
        environment: String,
        status: TestStatus,
        comment: Option<String>,
    },
    ExecuteTestStep {
        test_run_key: String,
        test_case_key: String,
        step_index: usize,
        status: StepStatus,
        comment: Option<String>,
    },
    AddAttachment {
        test_run_key: String,
        test_case_key: String,
        attachment: Vec<u8>,
        filename: String,
    },
    UserIsValid {
        user_id: String,
    },
}

/// An in-memory stand-in for the remote system that records every call and
/// answers with configurable canned data.
#[derive(Clone, Default)]
pub struct RecordingApi {
    calls: Arc<Mutex<Vec<ApiCall>>>,
    user_invalid: Arc<AtomicBool>,
    known_runs: Arc<Mutex<HashMap<String, RunIdentity>>>,
    created_runs: Arc<Mutex<usize>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `user_is_valid` answer `false` from now on.
    pub fn with_invalid_user(self) -> Self {
        self.user_invalid.store(true, Ordering::SeqCst);
        self
    }

    /// Registers a run the fake system already knows about.
    pub fn with_known_run(self, identity: RunIdentity) -> Self {
        self.known_runs
            .lock()
            .unwrap()
            .insert(identity.run_key.clone(), identity);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_run_count(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::CreateTestRun { .. }))
    }

    pub fn result_count(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::ExecuteTestResult { .. }))
    }

    pub fn step_count(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::ExecuteTestStep { .. }))
    }

    pub fn attachment_count(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::AddAttachment { .. }))
    }

    pub fn user_check_count(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::UserIsValid { .. }))
    }

    /// The most recent result call, if any.
    pub fn last_result(&self) -> Option<ApiCall> {
        self.calls()
            .into_iter()
            .rev()
            .find(|call| matches!(call, ApiCall::ExecuteTestResult { .. }))
    }

    fn count(&self, predicate: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|&call| predicate(call))
            .count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AdaptavistApi for RecordingApi {
    async fn create_test_run(&self, project_key: &str, run_name: &str) -> Result<String> {
        self.record(ApiCall::CreateTestRun {
            project_key: project_key.to_string(),
            run_name: run_name.to_string(),
        });
        let mut created = self.created_runs.lock().unwrap();
        *created += 1;
        Ok(format!("{project_key}-C{}", 40 + *created))
    }

    async fn get_test_run(&self, run_key: &str) -> Result<Option<RunIdentity>> {
        self.record(ApiCall::GetTestRun {
            run_key: run_key.to_string(),
        });
        Ok(self.known_runs.lock().unwrap().get(run_key).cloned())
    }

    async fn execute_test_result(
        &self,
        test_run_key: &str,
        test_case_key: &str,
        environment: &str,
        status: TestStatus,
        comment: Option<&str>,
    ) -> Result<()> {
        self.record(ApiCall::ExecuteTestResult {
            test_run_key: test_run_key.to_string(),
            test_case_key: test_case_key.to_string(),
            environment: environment.to_string(),
            status,
            comment: comment.map(str::to_string),
        });
        Ok(())
    }

    async fn execute_test_step(
        &self,
        test_run_key: &str,
        test_case_key: &str,
        step_index: usize,
        status: StepStatus,
        comment: Option<&str>,
    ) -> Result<()> {
        self.record(ApiCall::ExecuteTestStep {
            test_run_key: test_run_key.to_string(),
            test_case_key: test_case_key.to_string(),
            step_index,
            status,
            comment: comment.map(str::to_string),
        });
        Ok(())
    }

    async fn add_test_result_attachment(
        &self,
        test_run_key: &str,
        test_case_key: &str,
        attachment: &[u8],
        filename: &str,
    ) -> Result<()> {
        self.record(ApiCall::AddAttachment {
            test_run_key: test_run_key.to_string(),
            test_case_key: test_case_key.to_string(),
            attachment: attachment.to_vec(),
            filename: filename.to_string(),
        });
        Ok(())
    }

    async fn user_is_valid(&self, user_id: &str) -> Result<bool> {
        self.record(ApiCall::UserIsValid {
            user_id: user_id.to_string(),
        });
        Ok(!self.user_invalid.load(Ordering::SeqCst))
    }
}

/// Resolves an effective configuration from a JSON document with reporting
/// enabled on the command line, the way a host runner would.
pub fn enabled_config_from_json(json: &str) -> EffectiveConfig {
    let file: FileOptions = serde_json::from_str(json).expect("test JSON must parse");
    let cli = CliOptions {
        adaptavist: true,
        user: Some("jenkins".to_string()),
        ..CliOptions::default()
    };
    resolve(&cli, &Default::default(), &file)
}

/// A finished test without markers or steps.
pub fn completed(name: &str, result: RawTestResult) -> CompletedTest {
    CompletedTest::new(name, Vec::new(), result, Vec::new())
}

/// A finished test with markers.
pub fn completed_with_markers(
    name: &str,
    markers: Vec<Marker>,
    result: RawTestResult,
) -> CompletedTest {
    CompletedTest::new(name, markers, result, Vec::new())
}

/// Writes a JSON config file into `dir/config/global_config.json` and
/// returns its path.
pub fn write_json_config(dir: &Path, content: &str) -> PathBuf {
    let config_dir = dir.join("config");
    fs::create_dir_all(&config_dir).expect("Failed to create config directory");
    let path = config_dir.join("global_config.json");
    fs::write(&path, content).expect("Failed to write config file");
    path
}
