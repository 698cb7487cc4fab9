//! In-memory command runner (testing only)
//!
//! `ScriptedRunner` answers every invocation with a canned stdout or a canned
//! failure and records what it was asked to run, including the contents of
//! the args file as they were at call time.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::NixError;
use crate::runner::{CommandRunner, Invocation};
use crate::Result;

/// One recorded call to [`ScriptedRunner`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub invocation: Invocation,
    /// Path passed as `--arg args`
    pub args_file: PathBuf,
    /// Contents of the args file when the runner was called
    pub args_content: String,
}

#[derive(Debug, Clone)]
enum Outcome {
    Stdout(String),
    Failure { code: i32, stderr: String },
}

/// Command runner with a fixed answer. Clones share the call log.
#[derive(Debug, Clone)]
pub struct ScriptedRunner {
    outcome: Outcome,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedRunner {
    /// Succeed with the given stdout
    pub fn succeeding(stdout: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Stdout(stdout.into()))
    }

    /// Fail as if the evaluator exited with `code`
    pub fn failing(code: i32, stderr: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Failure {
            code,
            stderr: stderr.into(),
        })
    }

    fn with_outcome(outcome: Outcome) -> Self {
        ScriptedRunner {
            outcome,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Calls recorded so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<String> {
        let args_file = invocation
            .args
            .windows(2)
            .find(|pair| pair[0] == "args")
            .map(|pair| PathBuf::from(&pair[1]))
            .unwrap_or_default();
        let args_content = std::fs::read_to_string(&args_file).unwrap_or_default();

        self.calls.lock().unwrap().push(RecordedCall {
            invocation: invocation.clone(),
            args_file,
            args_content,
        });

        match &self.outcome {
            Outcome::Stdout(stdout) => Ok(stdout.clone()),
            Outcome::Failure { code, stderr } => Err(NixError::NixCommandFailed {
                code: Some(*code),
                stderr: stderr.clone(),
            }),
        }
    }
}
