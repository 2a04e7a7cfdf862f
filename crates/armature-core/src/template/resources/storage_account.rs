use serde_json::json;

use super::{LOCATION, insert_configured, location_declaration, location_parameter, param};
use crate::config::{ServiceConfig, naming};
use crate::error::DeployResult;
use crate::manifest::{
    Manifest, Parameter, ParameterDeclaration, ParameterDeclarations, ParameterSet, Resource,
};
use crate::template::ArmResource;

const STORAGE_ACCOUNT_TYPE: &str = "Microsoft.Storage/storageAccounts";

/// Storage account backing the function app's triggers and content share.
#[derive(Debug, Default)]
pub struct StorageAccountResource;

impl ArmResource for StorageAccountResource {
    fn template(&self, _config: &ServiceConfig) -> DeployResult<Manifest> {
        let declarations = ParameterDeclarations::from([
            location_declaration(),
            ("storageAccountName".to_string(), ParameterDeclaration::string()),
            (
                "storageAccountSkuName".to_string(),
                ParameterDeclaration::string().with_default("Standard_LRS"),
            ),
            (
                "storageAccountSkuTier".to_string(),
                ParameterDeclaration::string().with_default("Standard"),
            ),
        ]);

        let account = Resource::new(STORAGE_ACCOUNT_TYPE, param("storageAccountName"))
            .with_api_version("2019-06-01")
            .with_location(LOCATION)
            .with_kind("StorageV2")
            .with_field(
                "sku",
                json!({
                    "name": param("storageAccountSkuName"),
                    "tier": param("storageAccountSkuTier"),
                }),
            )
            .with_properties(json!({
                "supportsHttpsTrafficOnly": true,
                "minimumTlsVersion": "TLS1_2",
            }));

        Ok(Manifest::fragment(declarations, vec![account]))
    }

    fn parameters(&self, config: &ServiceConfig) -> DeployResult<ParameterSet> {
        let mut parameters = ParameterSet::from([
            location_parameter(config),
            (
                "storageAccountName".to_string(),
                Parameter::value(naming::storage_account_name(config)),
            ),
        ]);

        let sku = config
            .provider
            .storage_account
            .as_ref()
            .and_then(|s| s.sku.as_ref());
        insert_configured(
            &mut parameters,
            "storageAccountSkuName",
            sku.and_then(|s| s.name.clone()),
        );
        insert_configured(
            &mut parameters,
            "storageAccountSkuTier",
            sku.and_then(|s| s.tier.clone()),
        );
        Ok(parameters)
    }
}
