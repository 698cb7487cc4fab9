//! nix-builder: evaluate deployment configurations with Nix
//!
//! Runs `nix-build` against a bundled entry point with a deployment's
//! configuration file and arguments, then loads the resulting store path
//! back into the deployment as its specification.
//!
//! ```no_run
//! use nix_builder::{BuilderConfig, Evaluator, JsonDeployment};
//!
//! # async fn run() -> nix_builder::Result<()> {
//! let deployment = JsonDeployment::new("/srv/deploy/configuration.nix");
//! let mut evaluator = Evaluator::new(deployment, BuilderConfig::new("/opt/nix-builder/nix"));
//! let deployment = evaluator.eval(None).await?;
//! println!("{:?}", deployment.spec());
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod config;
pub mod deployment;
pub mod error;
pub mod evaluator;
pub mod fakes;
pub mod runner;
pub mod telemetry;

pub use args::{merge_args, parse_arg_pair, to_args, Args};
pub use config::BuilderConfig;
pub use deployment::{Deployment, JsonDeployment};
pub use error::NixError;
pub use evaluator::{trim_result_path, Evaluator};
pub use runner::{is_nix_available, CommandRunner, Invocation, ProcessRunner};
pub use telemetry::init_tracing;

/// Result type for nix-builder operations
pub type Result<T> = std::result::Result<T, NixError>;
