//! Evaluator configuration
//!
//! Where the evaluator binary lives and where the bundled Nix entry point is.
//! Nothing here is derived from the crate's own install location; the
//! working directory is always supplied by the caller or the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default evaluator executable
pub const DEFAULT_PROGRAM: &str = "nix-build";

/// Default directory holding `default.nix`
pub const DEFAULT_WORKDIR: &str = "nix";

/// File name of the entry point inside the working directory
pub const ENTRY_POINT: &str = "default.nix";

/// Evaluator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Evaluator executable
    pub program: PathBuf,
    /// Directory containing the bundled `default.nix`
    pub workdir: PathBuf,
    /// Extra flags passed ahead of the standard arguments
    pub extra_args: Vec<String>,
    /// Seconds to wait for the evaluator, 0 waits forever
    pub timeout_secs: u64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            program: PathBuf::from(DEFAULT_PROGRAM),
            workdir: PathBuf::from(DEFAULT_WORKDIR),
            extra_args: Vec::new(),
            timeout_secs: 0,
        }
    }
}

impl BuilderConfig {
    /// Create config with an explicit working directory
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        BuilderConfig {
            workdir: workdir.into(),
            ..Self::default()
        }
    }

    /// Create a config from environment variables
    ///
    /// Reads `NIX_BUILDER_PROGRAM`, `NIX_BUILDER_WORKDIR` and
    /// `NIX_BUILDER_TIMEOUT`; unset or unparsable values keep the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(program) = std::env::var("NIX_BUILDER_PROGRAM") {
            config.program = PathBuf::from(program);
        }
        if let Ok(workdir) = std::env::var("NIX_BUILDER_WORKDIR") {
            config.workdir = PathBuf::from(workdir);
        }
        if let Some(secs) = std::env::var("NIX_BUILDER_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.timeout_secs = secs;
        }
        config
    }

    /// Set the evaluator executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Add a flag placed before the standard arguments
    pub fn with_extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Set the timeout in seconds
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Path of the entry point handed to the evaluator
    pub fn entry_point(&self) -> PathBuf {
        self.workdir.join(ENTRY_POINT)
    }

    /// Timeout as a duration, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Whether the entry point exists on disk
    pub fn has_entry_point(&self) -> bool {
        self.entry_point().is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_config_default() {
        let config = BuilderConfig::default();
        assert_eq!(config.program, PathBuf::from("nix-build"));
        assert_eq!(config.entry_point(), PathBuf::from("nix/default.nix"));
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_builder_config_new() {
        let config = BuilderConfig::new("/opt/deployer/nix");
        assert_eq!(
            config.entry_point(),
            PathBuf::from("/opt/deployer/nix/default.nix")
        );
        assert_eq!(config.program, PathBuf::from("nix-build"));
    }

    #[test]
    fn test_builder_config_builders() {
        let config = BuilderConfig::default()
            .with_program("/run/current-system/sw/bin/nix-build")
            .with_extra_arg("--show-trace")
            .with_timeout_secs(30);
        assert_eq!(config.extra_args, vec!["--show-trace".to_string()]);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_has_entry_point() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuilderConfig::new(dir.path());
        assert!(!config.has_entry_point());

        std::fs::write(dir.path().join("default.nix"), "{ ... }: null").unwrap();
        assert!(config.has_entry_point());
    }
}
