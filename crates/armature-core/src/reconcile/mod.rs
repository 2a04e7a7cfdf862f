//! Deployment reconciliation: decide whether a synthesized deployment
//! differs from what is already applied, and submit it only if it does.

pub mod diagnostics;
pub mod diff;
pub mod executor;
pub mod inject;
pub mod parameters;

pub use diagnostics::render_deployment_error;
pub use diff::are_equivalent;
pub use executor::{
    ComparedDeployment, DeploymentExecutor, DeploymentOutcome, DeploymentStage, DeploymentTarget,
};
pub use inject::inject_environment;
pub use parameters::{prune_empty, resolve_defaults};
