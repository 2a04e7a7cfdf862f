//! Registry of named template generators.

use crate::error::{DeployError, DeployResult};

use super::resources::{
    AppInsightsResource, AppServicePlanResource, FunctionAppResource, HostingEnvironmentResource,
    HostingPlan, StorageAccountResource, VirtualNetworkResource,
};
use super::{CompositeTemplate, TemplateGenerator};

/// Function app on a dynamic consumption plan.
pub fn consumption_template() -> CompositeTemplate {
    CompositeTemplate::new(
        "consumption",
        vec![
            Box::new(AppInsightsResource),
            Box::new(StorageAccountResource),
            Box::new(FunctionAppResource::new(HostingPlan::Consumption)),
        ],
    )
}

/// Function app on an elastic premium plan.
pub fn premium_template() -> CompositeTemplate {
    CompositeTemplate::new(
        "premium",
        vec![
            Box::new(AppInsightsResource),
            Box::new(StorageAccountResource),
            Box::new(AppServicePlanResource::new(HostingPlan::Premium)),
            Box::new(FunctionAppResource::new(HostingPlan::Premium)),
        ],
    )
}

/// Function app on an isolated plan inside an app service environment.
pub fn ase_template() -> CompositeTemplate {
    CompositeTemplate::new(
        "ase",
        vec![
            Box::new(AppInsightsResource),
            Box::new(StorageAccountResource),
            Box::new(VirtualNetworkResource),
            Box::new(HostingEnvironmentResource),
            Box::new(AppServicePlanResource::new(HostingPlan::Isolated)),
            Box::new(FunctionAppResource::new(HostingPlan::Isolated)),
        ],
    )
}

/// Registry of available template generators.
#[derive(Debug)]
pub struct TemplateRegistry {
    generators: Vec<Box<dyn TemplateGenerator>>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_default_templates()
    }
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    /// Create a registry with the built-in templates.
    pub fn with_default_templates() -> Self {
        let generators: Vec<Box<dyn TemplateGenerator>> = vec![
            Box::new(consumption_template()),
            Box::new(premium_template()),
            Box::new(ase_template()),
        ];
        Self { generators }
    }

    /// Register a generator. An existing generator with the same ID is
    /// shadowed.
    pub fn register(&mut self, generator: Box<dyn TemplateGenerator>) {
        self.generators.insert(0, generator);
    }

    /// Get a generator by ID.
    pub fn get(&self, id: &str) -> Option<&dyn TemplateGenerator> {
        self.generators
            .iter()
            .find(|g| g.id() == id)
            .map(|g| g.as_ref())
    }

    /// Get a generator by ID, failing for unknown IDs.
    pub fn resolve(&self, id: &str) -> DeployResult<&dyn TemplateGenerator> {
        self.get(id)
            .ok_or_else(|| DeployError::UnknownTemplateType(id.to_string()))
    }

    /// List all generator IDs.
    pub fn template_ids(&self) -> Vec<&'static str> {
        self.generators.iter().map(|g| g.id()).collect()
    }
}
