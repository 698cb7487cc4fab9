//! Deployment evaluation
//!
//! Evaluates a deployment with `nix-build` and feeds the resulting store path
//! back into the deployment:
//!
//! 1. merge stored args with overrides (shallow)
//! 2. write the merged args to a temporary JSON file
//! 3. run `nix-build --arg configuration <file> --arg args <tmp> --no-out-link <workdir>/default.nix`
//! 4. trim stdout into the result path
//! 5. `Deployment::load_spec(result_path)`
//!
//! The argument file is removed on every exit path, including when the
//! evaluation future is dropped.

use crate::args::{merge_args, to_args, Args};
use crate::config::BuilderConfig;
use crate::deployment::Deployment;
use crate::runner::{CommandRunner, Invocation, ProcessRunner};
use crate::Result;
use serde::Serialize;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Evaluates one deployment with an external Nix evaluator
pub struct Evaluator<D, R = ProcessRunner> {
    deployment: D,
    runner: R,
    config: BuilderConfig,
}

impl<D: Deployment> Evaluator<D> {
    /// Create an evaluator that runs `nix-build` as a child process
    pub fn new(deployment: D, config: BuilderConfig) -> Self {
        Self::with_runner(deployment, config, ProcessRunner)
    }
}

impl<D: Deployment, R: CommandRunner> Evaluator<D, R> {
    /// Create an evaluator with a custom command runner
    pub fn with_runner(deployment: D, config: BuilderConfig, runner: R) -> Self {
        Evaluator {
            deployment,
            runner,
            config,
        }
    }

    pub fn deployment(&self) -> &D {
        &self.deployment
    }

    pub fn deployment_mut(&mut self) -> &mut D {
        &mut self.deployment
    }

    pub fn into_deployment(self) -> D {
        self.deployment
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Evaluate the deployment and load the resulting spec into it.
    ///
    /// `overrides` are shallow-merged over the deployment's stored args for
    /// this call only; `None` is the same as an empty map. On failure the
    /// deployment's spec state is left as it was.
    pub async fn eval(&mut self, overrides: Option<Args>) -> Result<&D> {
        let merged = merge_args(self.deployment.args(), overrides.unwrap_or_default());
        let payload = serde_json::to_vec(&merged)?;

        let args_file = write_args_file(&payload)?;
        debug!("Wrote evaluation args to {:?}", args_file.path());

        let invocation = self.invocation(args_file.path());
        info!(
            "Evaluating deployment {:?} with {} arg(s)",
            self.deployment.file(),
            merged.len()
        );

        let output = self.runner.run(&invocation).await;

        let tmp_path = args_file.path().to_path_buf();
        if let Err(e) = args_file.close() {
            warn!("Failed to remove args file {:?}: {}", tmp_path, e);
        }

        let stdout = output?;
        let result_path = trim_result_path(&stdout);
        info!("Evaluated deployment to {}", result_path);

        self.deployment.load_spec(Path::new(result_path))?;
        Ok(&self.deployment)
    }

    /// Evaluate with overrides taken from any value serializing to a JSON object
    pub async fn eval_with<T: Serialize + ?Sized>(&mut self, overrides: &T) -> Result<&D> {
        let overrides = to_args(overrides)?;
        self.eval(Some(overrides)).await
    }

    /// Build the evaluator command line for a given args file
    pub fn invocation(&self, args_file: &Path) -> Invocation {
        let mut args: Vec<OsString> = self.config.extra_args.iter().map(OsString::from).collect();
        args.extend([
            OsString::from("--arg"),
            OsString::from("configuration"),
            self.deployment.file().as_os_str().to_owned(),
            OsString::from("--arg"),
            OsString::from("args"),
            args_file.as_os_str().to_owned(),
            OsString::from("--no-out-link"),
            self.config.entry_point().into_os_string(),
        ]);

        Invocation {
            program: self.config.program.clone(),
            args,
            timeout: self.config.timeout(),
        }
    }
}

/// Strip surrounding whitespace from evaluator output.
///
/// Interior whitespace is kept.
pub fn trim_result_path(stdout: &str) -> &str {
    stdout.trim()
}

fn write_args_file(payload: &[u8]) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("nix-builder-args-")
        .suffix(".json")
        .tempfile()?;
    file.write_all(payload)?;
    file.flush()?;
    Ok(file)
}
