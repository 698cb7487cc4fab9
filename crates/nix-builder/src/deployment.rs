//! Deployments: what gets evaluated, and what receives the result.

use crate::args::Args;
use crate::error::NixError;
use crate::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A deployment configuration that can be evaluated by Nix.
///
/// Implementors own their specification state; the evaluator only reads
/// `args` and `file` and hands back the evaluated store path through
/// `load_spec`. A failing `load_spec` should leave the previous state intact.
pub trait Deployment {
    /// Stored evaluation arguments
    fn args(&self) -> &Args;

    /// Configuration entry point passed to Nix as `configuration`
    fn file(&self) -> &Path;

    /// Interpret an evaluated build artifact
    fn load_spec(&mut self, path: &Path) -> Result<()>;
}

/// Deployment whose evaluated artifact is a JSON document.
#[derive(Debug, Clone, Default)]
pub struct JsonDeployment {
    file: PathBuf,
    args: Args,
    spec: Option<Value>,
    spec_path: Option<PathBuf>,
}

impl JsonDeployment {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        JsonDeployment {
            file: file.into(),
            ..Self::default()
        }
    }

    /// Set the stored arguments
    pub fn with_args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }

    pub fn args_mut(&mut self) -> &mut Args {
        &mut self.args
    }

    /// Last loaded spec, if any
    pub fn spec(&self) -> Option<&Value> {
        self.spec.as_ref()
    }

    /// Store path the current spec was loaded from
    pub fn spec_path(&self) -> Option<&Path> {
        self.spec_path.as_deref()
    }
}

impl Deployment for JsonDeployment {
    fn args(&self) -> &Args {
        &self.args
    }

    fn file(&self) -> &Path {
        &self.file
    }

    fn load_spec(&mut self, path: &Path) -> Result<()> {
        let spec_err = |reason: String| NixError::SpecLoad {
            path: path.to_path_buf(),
            reason,
        };

        let content = std::fs::read(path).map_err(|e| spec_err(e.to_string()))?;
        let spec: Value = serde_json::from_slice(&content).map_err(|e| spec_err(e.to_string()))?;

        debug!("Loaded spec from {:?}", path);
        self.spec = Some(spec);
        self.spec_path = Some(path.to_path_buf());
        Ok(())
    }
}
