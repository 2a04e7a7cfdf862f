//! Armature Core Library
//!
//! Declarative reconciliation of ARM deployments for serverless function
//! apps: synthesize a manifest from service configuration, inject the
//! configured environment, compare against the previously applied
//! deployment, and submit only when something changed.

pub mod config;
pub mod error;
pub mod manifest;
pub mod provider;
pub mod reconcile;
pub mod template;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ApimConfig, ArmTemplateConfig, DeploymentConfig, ProviderConfig, ServiceConfig,
        parse_service_toml,
    };

    // Errors
    pub use crate::error::{DeployError, DeployResult};

    // Manifest
    pub use crate::manifest::{
        Deployment, DeploymentErrorDetail, DeploymentRecord, Manifest, Parameter,
        ParameterDeclaration, ParameterSet, Resource,
    };

    // Provider
    pub use crate::provider::{
        ArmClient, DeploymentExtended, DeploymentProvider, DeploymentRequest, ManifestStore,
        ProviderError,
    };

    // Reconciliation
    pub use crate::reconcile::{
        ComparedDeployment, DeploymentExecutor, DeploymentOutcome, DeploymentStage,
        DeploymentTarget, are_equivalent, inject_environment, render_deployment_error,
        resolve_defaults,
    };

    // Templates
    pub use crate::template::{
        ArmResource, CompositeTemplate, TemplateGenerator, TemplateRegistry, TemplateSynthesizer,
    };
}
