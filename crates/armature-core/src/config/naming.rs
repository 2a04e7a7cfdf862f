//! Derived resource names.
//!
//! Names follow `<prefix>-<region>-<stage>[-<hash>]-<suffix>`, where the
//! region is shortened (`eastus2` -> `eus2`) and the hash is derived from the
//! resource group so names stay unique across groups.

use super::schema::ServiceConfig;

/// Number of hex characters of the resource group hash kept in names.
pub const RESOURCE_GROUP_HASH_LENGTH: usize = 6;

/// Azure caps storage account names at 24 characters.
const STORAGE_ACCOUNT_NAME_MAX: usize = 24;

const REGION_ABBREVIATIONS: [(&str, &str); 6] = [
    ("north", "n"),
    ("south", "s"),
    ("east", "e"),
    ("west", "w"),
    ("central", "c"),
    ("europe", "eu"),
];

/// Shorten an Azure region name: "West Europe" -> "weu".
pub fn short_region_name(region: &str) -> String {
    let mut short: String = region
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    for (long, abbreviation) in REGION_ABBREVIATIONS {
        short = short.replace(long, abbreviation);
    }
    short
}

/// Stable short hash of the resource group name.
pub fn resource_group_hash(resource_group: &str) -> String {
    let digest = blake3::hash(resource_group.as_bytes()).to_hex();
    digest.as_str()[..RESOURCE_GROUP_HASH_LENGTH].to_string()
}

/// Default resource group: `<prefix>-<region>-<stage>-<service>-rg`.
pub fn resource_group_name(config: &ServiceConfig) -> String {
    format!("{}-{}-rg", base_name(config), config.service)
}

/// Resource name, honoring a name set explicitly in configuration.
pub fn resource_name(
    config: &ServiceConfig,
    configured: Option<&str>,
    suffix: &str,
    include_hash: bool,
) -> String {
    if let Some(name) = configured {
        return name.to_string();
    }

    let mut name = base_name(config);
    if include_hash {
        name.push('-');
        name.push_str(&resource_group_hash(&config.resource_group()));
    }
    name.push('-');
    name.push_str(suffix);
    name
}

/// Storage account name: lower-case alphanumerics, at most 24 characters,
/// keeping the resource group hash at the end.
pub fn storage_account_name(config: &ServiceConfig) -> String {
    if let Some(name) = config
        .provider
        .storage_account
        .as_ref()
        .and_then(|r| r.name.clone())
    {
        return name;
    }

    let hash = resource_group_hash(&config.resource_group());
    let mut head: String = format!(
        "{}{}{}",
        config.provider.prefix,
        short_region_name(&config.provider.region),
        config.provider.stage
    )
    .chars()
    .filter(char::is_ascii_alphanumeric)
    .collect::<String>()
    .to_lowercase();
    head.truncate(STORAGE_ACCOUNT_NAME_MAX - RESOURCE_GROUP_HASH_LENGTH);
    head + &hash
}

fn base_name(config: &ServiceConfig) -> String {
    format!(
        "{}-{}-{}",
        config.provider.prefix,
        short_region_name(&config.provider.region),
        config.provider.stage
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServiceConfig {
        let mut config = ServiceConfig {
            service: "orders".to_string(),
            ..ServiceConfig::default()
        };
        config.provider.prefix = "prefix".to_string();
        config.provider.region = "eastus2".to_string();
        config.provider.stage = "prod".to_string();
        config.provider.resource_group = Some("myResourceGroup".to_string());
        config
    }

    #[test]
    fn shortens_region_names() {
        assert_eq!(short_region_name("eastus2"), "eus2");
        assert_eq!(short_region_name("West Europe"), "weu");
        assert_eq!(short_region_name("southcentralus"), "scus");
        assert_eq!(short_region_name("North Europe"), "neu");
    }

    #[test]
    fn hash_is_stable_and_short() {
        let hash = resource_group_hash("myResourceGroup");
        assert_eq!(hash.len(), RESOURCE_GROUP_HASH_LENGTH);
        assert_eq!(hash, resource_group_hash("myResourceGroup"));
        assert_ne!(hash, resource_group_hash("otherGroup"));
    }

    #[test]
    fn hosting_environment_name_includes_hash() {
        let config = config();
        let hash = resource_group_hash("myResourceGroup");
        assert_eq!(
            resource_name(&config, None, "ase", true),
            format!("prefix-eus2-prod-{hash}-ase")
        );
    }

    #[test]
    fn configured_name_wins() {
        let config = config();
        assert_eq!(
            resource_name(&config, Some("myHostingEnv"), "ase", true),
            "myHostingEnv"
        );
    }

    #[test]
    fn default_resource_group_name() {
        let mut config = config();
        config.provider.resource_group = None;
        assert_eq!(resource_group_name(&config), "prefix-eus2-prod-orders-rg");
        assert_eq!(config.resource_group(), "prefix-eus2-prod-orders-rg");
    }

    #[test]
    fn storage_account_name_is_safe() {
        let mut config = config();
        config.provider.prefix = "Very-Long-Prefix".to_string();
        config.provider.stage = "production-stage".to_string();

        let name = storage_account_name(&config);
        assert!(name.len() <= 24);
        assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert!(name.ends_with(&resource_group_hash("myResourceGroup")));
    }
}
