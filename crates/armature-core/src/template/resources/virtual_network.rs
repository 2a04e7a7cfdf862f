use serde_json::json;

use super::{LOCATION, location_declaration, location_parameter, param, virtual_network_name};
use crate::config::ServiceConfig;
use crate::error::DeployResult;
use crate::manifest::{
    Manifest, Parameter, ParameterDeclaration, ParameterDeclarations, ParameterSet, Resource,
};
use crate::template::ArmResource;

pub(crate) const VIRTUAL_NETWORK_TYPE: &str = "Microsoft.Network/virtualNetworks";

/// Subnet the hosting environment is placed in.
pub(crate) const DEFAULT_SUBNET: &str = "default";

/// Virtual network hosting an app service environment.
#[derive(Debug, Default)]
pub struct VirtualNetworkResource;

impl ArmResource for VirtualNetworkResource {
    fn template(&self, _config: &ServiceConfig) -> DeployResult<Manifest> {
        let declarations = ParameterDeclarations::from([
            location_declaration(),
            ("virtualNetworkName".to_string(), ParameterDeclaration::string()),
            (
                "virtualNetworkAddressPrefix".to_string(),
                ParameterDeclaration::string().with_default("172.17.0.0/16"),
            ),
            (
                "virtualNetworkSubnetPrefix".to_string(),
                ParameterDeclaration::string().with_default("172.17.0.0/24"),
            ),
        ]);

        let network = Resource::new(VIRTUAL_NETWORK_TYPE, param("virtualNetworkName"))
            .with_api_version("2019-11-01")
            .with_location(LOCATION)
            .with_properties(json!({
                "addressSpace": {
                    "addressPrefixes": [param("virtualNetworkAddressPrefix")]
                },
                "subnets": [{
                    "name": DEFAULT_SUBNET,
                    "properties": { "addressPrefix": param("virtualNetworkSubnetPrefix") }
                }]
            }));

        Ok(Manifest::fragment(declarations, vec![network]))
    }

    fn parameters(&self, config: &ServiceConfig) -> DeployResult<ParameterSet> {
        Ok(ParameterSet::from([
            location_parameter(config),
            (
                "virtualNetworkName".to_string(),
                Parameter::value(virtual_network_name(config)),
            ),
        ]))
    }
}
