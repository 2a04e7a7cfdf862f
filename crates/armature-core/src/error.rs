//! Error types for deployment reconciliation

use std::path::PathBuf;

use thiserror::Error;

use crate::provider::ProviderError;

/// Errors raised while building, comparing or submitting a deployment.
#[derive(Debug, Error)]
pub enum DeployError {
    /// No template generator is registered under the requested name.
    #[error("Unable to find template with name '{0}'")]
    UnknownTemplateType(String),

    #[error("ARM template file not found: {}", .0.display())]
    ManifestFileNotFound(PathBuf),

    #[error("Failed to read ARM template file {}: {source}", path.display())]
    ManifestFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse ARM template file {}: {source}", path.display())]
    ManifestParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The synthesized manifest lacks a structure the injector writes to.
    /// This points at a defective base template, not at user input.
    #[error("ARM template has no {0}")]
    StructuralPathNotFound(String),

    /// The configuration cannot be turned into a manifest.
    #[error("Invalid service configuration: {0}")]
    InvalidConfiguration(String),

    /// Looking up the previously applied deployment failed.
    #[error("Failed to read previous deployment: {0}")]
    Store(#[source] ProviderError),

    /// The provider rejected the deployment and no structured error detail
    /// was available to explain it. Displays the provider error as raised.
    #[error(transparent)]
    ProviderSubmission(ProviderError),

    /// The provider rejected the deployment; the text is the rendered error
    /// tree of the failed deployment.
    #[error("{0}")]
    DeploymentFailed(String),
}

pub type DeployResult<T> = Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_failure_is_displayed_verbatim() {
        let err = DeployError::DeploymentFailed("Conflict - resource locked".into());
        assert_eq!(err.to_string(), "Conflict - resource locked");
    }

    #[test]
    fn unknown_template_names_the_type() {
        let err = DeployError::UnknownTemplateType("dedicated".into());
        assert_eq!(err.to_string(), "Unable to find template with name 'dedicated'");
    }

    #[test]
    fn submission_error_shows_provider_text_unchanged() {
        let provider = ProviderError::Rejected {
            status: 409,
            error: None,
            body: "{}".to_string(),
        };
        let expected = provider.to_string();

        let err = DeployError::ProviderSubmission(provider);
        assert_eq!(err.to_string(), expected);
        assert_eq!(err.to_string(), "HTTP 409: {}");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DeployError>();
    }
}
