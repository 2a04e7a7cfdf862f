//! Typed ARM manifest tree.
//!
//! Only the fields the reconciliation engine reads or rewrites are typed.
//! Everything else is captured in `extra` so a manifest round-trips through
//! these types without losing authored content.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource type of the function app compute resource.
pub const SITE_RESOURCE_TYPE: &str = "Microsoft.Web/sites";

/// Resource type of a function app deployment slot.
pub const SLOT_RESOURCE_TYPE: &str = "Microsoft.Web/sites/slots";

/// Name of the child config resource declaring slot-sticky settings.
pub const SLOT_CONFIG_NAMES: &str = "slotconfignames";

pub const DEFAULT_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2015-01-01/deploymentTemplate.json#";

pub const DEFAULT_CONTENT_VERSION: &str = "1.0.0.0";

/// Parameter name -> declaration, as found in a manifest's `parameters`.
pub type ParameterDeclarations = BTreeMap<String, ParameterDeclaration>;

/// Parameter name -> supplied value.
pub type ParameterSet = BTreeMap<String, Parameter>;

/// An ARM deployment template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(
        rename = "contentVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_version: Option<String>,

    #[serde(default)]
    pub parameters: ParameterDeclarations,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,

    #[serde(default)]
    pub resources: Vec<Resource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            schema: Some(DEFAULT_SCHEMA.to_string()),
            content_version: Some(DEFAULT_CONTENT_VERSION.to_string()),
            parameters: ParameterDeclarations::new(),
            variables: None,
            resources: Vec::new(),
            outputs: None,
            extra: Map::new(),
        }
    }
}

impl Manifest {
    /// Build a manifest fragment from declarations and resources.
    pub fn fragment(parameters: ParameterDeclarations, resources: Vec<Resource>) -> Self {
        Self {
            parameters,
            resources,
            ..Self::default()
        }
    }

    /// Union another manifest's declarations into this one (the other side
    /// wins on collision) and append its resources.
    pub fn merge(&mut self, other: Manifest) {
        self.parameters.extend(other.parameters);
        self.resources.extend(other.resources);
    }
}

/// A single resource node. Nested child resources live in `resources`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,

    #[serde(rename = "dependsOn", default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: Some(name.into()),
            api_version: None,
            location: None,
            kind: None,
            identity: None,
            tags: None,
            depends_on: None,
            properties: None,
            resources: None,
            extra: Map::new(),
        }
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = Some(api_version.to_string());
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    pub fn with_identity(mut self, identity: Value) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_depends_on(mut self, depends_on: Vec<String>) -> Self {
        self.depends_on = Some(depends_on);
        self
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_child(mut self, child: Resource) -> Self {
        self.resources.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Set an untyped top-level field such as `sku`.
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn is_type(&self, resource_type: &str) -> bool {
        self.resource_type == resource_type
    }

    pub fn children(&self) -> &[Resource] {
        self.resources.as_deref().unwrap_or_default()
    }
}

/// A parameter declaration inside a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDeclaration {
    #[serde(rename = "type")]
    pub param_type: String,

    #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Inline value carried by some hand-authored templates; takes precedence
    /// over `defaultValue` when resolving defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParameterDeclaration {
    pub fn new(param_type: &str) -> Self {
        Self {
            param_type: param_type.to_string(),
            default_value: None,
            value: None,
            extra: Map::new(),
        }
    }

    pub fn string() -> Self {
        Self::new("String")
    }

    pub fn int() -> Self {
        Self::new("Int")
    }

    pub fn with_default(mut self, default_value: impl Into<Value>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

/// A supplied parameter value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Parameter {
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn typed(param_type: &str, value: impl Into<Value>) -> Self {
        Self {
            param_type: Some(param_type.to_string()),
            value: Some(value.into()),
            extra: Map::new(),
        }
    }

    /// True when the value is absent, null or an empty string.
    pub fn is_empty(&self) -> bool {
        self.value.as_ref().is_none_or(is_empty_value)
    }
}

pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// A manifest paired with its parameter values: the unit of comparison and
/// of submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(rename = "template")]
    pub manifest: Manifest,

    #[serde(default)]
    pub parameters: ParameterSet,
}

impl Deployment {
    pub fn new(manifest: Manifest, parameters: ParameterSet) -> Self {
        Self {
            manifest,
            parameters,
        }
    }
}

/// The provider's account of a previous deployment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeploymentRecord {
    pub name: String,
    pub provisioning_state: Option<String>,
    pub deployment: Option<Deployment>,
    pub error: Option<DeploymentErrorDetail>,
}

/// Recursive ARM error detail.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<DeploymentErrorDetail>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeploymentErrorDetail {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            message: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_detail(mut self, detail: DeploymentErrorDetail) -> Self {
        self.details.push(detail);
        self
    }
}
