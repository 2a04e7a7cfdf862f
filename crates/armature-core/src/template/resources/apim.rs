//! API Management gateway merged into generated templates when configured.

use serde_json::json;

use super::{LOCATION, insert_configured, location_declaration, location_parameter, param};
use crate::config::{ServiceConfig, naming};
use crate::error::DeployResult;
use crate::manifest::{
    Manifest, Parameter, ParameterDeclaration, ParameterDeclarations, ParameterSet, Resource,
};
use crate::template::ArmResource;

const APIM_TYPE: &str = "Microsoft.ApiManagement/service";

#[derive(Debug, Default)]
pub struct ApimResource;

impl ArmResource for ApimResource {
    fn template(&self, _config: &ServiceConfig) -> DeployResult<Manifest> {
        let declarations = ParameterDeclarations::from([
            location_declaration(),
            ("apimServiceName".to_string(), ParameterDeclaration::string()),
            (
                "apimSkuName".to_string(),
                ParameterDeclaration::string().with_default("Consumption"),
            ),
            (
                "apimSkuCapacity".to_string(),
                ParameterDeclaration::int().with_default(0),
            ),
            (
                "apimPublisherEmail".to_string(),
                ParameterDeclaration::string().with_default("contact@contoso.com"),
            ),
            (
                "apimPublisherName".to_string(),
                ParameterDeclaration::string().with_default("Contoso"),
            ),
        ]);

        let service = Resource::new(APIM_TYPE, param("apimServiceName"))
            .with_api_version("2019-01-01")
            .with_location(LOCATION)
            .with_field(
                "sku",
                json!({
                    "name": param("apimSkuName"),
                    "capacity": param("apimSkuCapacity"),
                }),
            )
            .with_properties(json!({
                "publisherEmail": param("apimPublisherEmail"),
                "publisherName": param("apimPublisherName"),
            }));

        Ok(Manifest::fragment(declarations, vec![service]))
    }

    fn parameters(&self, config: &ServiceConfig) -> DeployResult<ParameterSet> {
        let apim = config.provider.apim.clone().unwrap_or_default();

        let mut parameters = ParameterSet::from([
            location_parameter(config),
            (
                "apimServiceName".to_string(),
                Parameter::value(naming::resource_name(
                    config,
                    apim.name.as_deref(),
                    "apim",
                    false,
                )),
            ),
        ]);
        insert_configured(&mut parameters, "apimPublisherEmail", apim.publisher_email);
        insert_configured(&mut parameters, "apimPublisherName", apim.publisher_name);
        if let Some(sku) = apim.sku {
            insert_configured(&mut parameters, "apimSkuName", sku.name);
            insert_configured(&mut parameters, "apimSkuCapacity", sku.capacity);
        }
        Ok(parameters)
    }
}
