//! Template generation
//!
//! A named template type is a [`CompositeTemplate`] of resource fragments.
//! Each fragment contributes parameter declarations, resources and parameter
//! values; the composite unions the first two maps (later fragments win) and
//! concatenates resources in fragment order.

pub mod registry;
pub mod resources;
pub mod synthesizer;

use std::fmt::Debug;

use crate::config::ServiceConfig;
use crate::error::DeployResult;
use crate::manifest::{Manifest, ParameterSet};

pub use registry::TemplateRegistry;
pub use synthesizer::TemplateSynthesizer;

/// A single resource fragment of a generated template.
pub trait ArmResource: Debug + Send + Sync {
    /// Parameter declarations and resources this fragment contributes.
    fn template(&self, config: &ServiceConfig) -> DeployResult<Manifest>;

    /// Parameter values for this fragment's declarations.
    fn parameters(&self, config: &ServiceConfig) -> DeployResult<ParameterSet>;
}

/// A named generator producing a complete base manifest.
pub trait TemplateGenerator: Debug + Send + Sync {
    /// Identifier the generator is registered and looked up under
    fn id(&self) -> &'static str;

    fn template(&self, config: &ServiceConfig) -> DeployResult<Manifest>;

    fn parameters(&self, config: &ServiceConfig) -> DeployResult<ParameterSet>;
}

/// Generator assembled from resource fragments.
#[derive(Debug)]
pub struct CompositeTemplate {
    id: &'static str,
    resources: Vec<Box<dyn ArmResource>>,
}

impl CompositeTemplate {
    pub fn new(id: &'static str, resources: Vec<Box<dyn ArmResource>>) -> Self {
        Self { id, resources }
    }

    pub fn resources(&self) -> &[Box<dyn ArmResource>] {
        &self.resources
    }
}

impl TemplateGenerator for CompositeTemplate {
    fn id(&self) -> &'static str {
        self.id
    }

    fn template(&self, config: &ServiceConfig) -> DeployResult<Manifest> {
        let mut manifest = Manifest::default();
        for resource in &self.resources {
            manifest.merge(resource.template(config)?);
        }
        Ok(manifest)
    }

    fn parameters(&self, config: &ServiceConfig) -> DeployResult<ParameterSet> {
        let mut parameters = ParameterSet::new();
        for resource in &self.resources {
            parameters.extend(resource.parameters(config)?);
        }
        Ok(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Parameter, ParameterDeclaration, ParameterDeclarations, Resource};

    #[derive(Debug)]
    struct Fixed {
        resource: &'static str,
        location: &'static str,
    }

    impl ArmResource for Fixed {
        fn template(&self, _config: &ServiceConfig) -> DeployResult<Manifest> {
            Ok(Manifest::fragment(
                ParameterDeclarations::from([(
                    "location".to_string(),
                    ParameterDeclaration::string().with_default(self.location),
                )]),
                vec![Resource::new(self.resource, self.resource)],
            ))
        }

        fn parameters(&self, _config: &ServiceConfig) -> DeployResult<ParameterSet> {
            Ok(ParameterSet::from([(
                "location".to_string(),
                Parameter::value(self.location),
            )]))
        }
    }

    #[test]
    fn later_fragments_win_and_resources_keep_order() {
        let composite = CompositeTemplate::new(
            "pair",
            vec![
                Box::new(Fixed {
                    resource: "first",
                    location: "westus",
                }),
                Box::new(Fixed {
                    resource: "second",
                    location: "eastus",
                }),
            ],
        );
        let config = ServiceConfig::default();

        let manifest = composite.template(&config).unwrap();
        let parameters = composite.parameters(&config).unwrap();

        let types: Vec<_> = manifest
            .resources
            .iter()
            .map(|r| r.resource_type.as_str())
            .collect();
        assert_eq!(types, vec!["first", "second"]);
        assert_eq!(
            manifest.parameters["location"].default_value,
            Some(serde_json::json!("eastus"))
        );
        assert_eq!(parameters["location"], Parameter::value("eastus"));
    }
}
