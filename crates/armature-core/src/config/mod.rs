//! Service configuration
//!
//! Loads `armature.toml`, applies defaults, and derives the names the
//! template generators and the deployment target rely on.

pub mod naming;
pub mod parser;
pub mod schema;

pub use parser::{parse_service_toml, parse_service_toml_str};
pub use schema::{
    ApimConfig, ArmTemplateConfig, DEFAULT_TEMPLATE_TYPE, DeploymentConfig, FunctionAppConfig,
    PRODUCTION_SLOT_ALIASES, ProviderConfig, ResourceConfig, ServiceConfig, SkuConfig,
};
