//! Semantic comparison of a candidate deployment against the previous one.
//!
//! Both sides are first projected into owned, comparison-safe JSON values,
//! then compared structurally. The projection removes differences the
//! provider introduces on read-back: the `identity` block it injects into
//! resources and the casing of parameter types.

use serde_json::{Map, Value};

use super::parameters::resolve_defaults;
use crate::manifest::{Deployment, Manifest, ParameterSet};

/// True when submitting `candidate` would not change what `previous`
/// already applied. A missing previous deployment is never equivalent.
///
/// Both parameter sets are resolved against their own manifest's
/// declarations, so a default left implicit on one side matches the value
/// the provider materialized on the other.
pub fn are_equivalent(candidate: Option<&Deployment>, previous: Option<&Deployment>) -> bool {
    let (Some(candidate), Some(previous)) = (candidate, previous) else {
        return false;
    };

    let candidate_parameters =
        resolve_defaults(&candidate.parameters, &candidate.manifest.parameters);
    let previous_parameters =
        resolve_defaults(&previous.parameters, &previous.manifest.parameters);

    values_equal(
        &normalize_parameters(&candidate_parameters),
        &normalize_parameters(&previous_parameters),
    ) && values_equal(
        &normalize_manifest(&candidate.manifest),
        &normalize_manifest(&previous.manifest),
    )
}

/// Parameters with their `type` lower-cased; all other fields untouched.
pub fn normalize_parameters(parameters: &ParameterSet) -> Value {
    let normalized: Map<String, Value> = parameters
        .iter()
        .map(|(name, parameter)| {
            let mut parameter = parameter.clone();
            parameter.param_type = parameter.param_type.map(|t| t.to_lowercase());
            (name.clone(), to_value(&parameter))
        })
        .collect();
    Value::Object(normalized)
}

/// Manifest with `identity` removed from every resource, nested ones
/// included.
pub fn normalize_manifest(manifest: &Manifest) -> Value {
    let mut manifest = manifest.clone();
    for resource in &mut manifest.resources {
        strip_identity(resource);
    }
    to_value(&manifest)
}

fn strip_identity(resource: &mut crate::manifest::Resource) {
    resource.identity = None;
    for child in resource.resources.iter_mut().flatten() {
        strip_identity(child);
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    // Manifest types only hold strings and JSON values, which always serialize.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Deep structural equality. Object keys compare order-insensitively,
/// arrays element by element. Numbers compare by value, so `1` and `1.0`
/// are equal.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, lv)| r.get(key).is_some_and(|rv| values_equal(lv, rv)))
        }
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(lv, rv)| values_equal(lv, rv))
        }
        (Value::Number(l), Value::Number(r)) => {
            l == r || matches!((l.as_f64(), r.as_f64()), (Some(a), Some(b)) if a == b)
        }
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Parameter, ParameterDeclaration, Resource};
    use serde_json::json;

    fn deployment() -> Deployment {
        let mut manifest = Manifest::default();
        manifest.parameters.insert(
            "location".to_string(),
            ParameterDeclaration::string().with_default("westus"),
        );
        manifest.parameters.insert(
            "functionAppName".to_string(),
            ParameterDeclaration::string(),
        );
        manifest.resources.push(
            Resource::new("Microsoft.Web/sites", "[parameters('functionAppName')]")
                .with_identity(json!({"type": "SystemAssigned"}))
                .with_properties(json!({"siteConfig": {"appSettings": []}})),
        );

        Deployment::new(
            manifest,
            ParameterSet::from([("functionAppName".to_string(), Parameter::value("orders"))]),
        )
    }

    fn previous_of(candidate: &Deployment) -> Deployment {
        let mut previous = candidate.clone();
        previous.parameters =
            resolve_defaults(&candidate.parameters, &candidate.manifest.parameters);
        previous
    }

    /// The candidate as the provider reports it back: every declared
    /// parameter materialized, types lower-cased, identity assigned.
    fn provider_view() -> Deployment {
        let mut previous = deployment();
        previous.parameters = ParameterSet::from([
            ("location".to_string(), Parameter::typed("string", "westus")),
            ("functionAppName".to_string(), Parameter::typed("string", "orders")),
        ]);
        previous.manifest.resources[0].identity = Some(json!({
            "type": "SystemAssigned",
            "principalId": "00000000-0000-0000-0000-000000000000",
            "tenantId": "11111111-1111-1111-1111-111111111111"
        }));
        previous
    }

    #[test]
    fn deployment_is_equivalent_to_itself() {
        let d = deployment();
        assert!(are_equivalent(Some(&d), Some(&d)));
    }

    #[test]
    fn synthesized_deployment_is_equivalent_to_itself() {
        let config = crate::config::ServiceConfig {
            service: "orders".to_string(),
            ..Default::default()
        };
        let d = crate::template::TemplateSynthesizer::default()
            .synthesize("consumption", &config)
            .unwrap();
        assert!(are_equivalent(Some(&d), Some(&d)));
    }

    #[test]
    fn materialized_default_matches_omitted_value() {
        let candidate = deployment();
        let mut previous = deployment();
        previous.parameters = ParameterSet::from([
            ("location".to_string(), Parameter::typed("String", "westus")),
            ("functionAppName".to_string(), Parameter::typed("String", "orders")),
        ]);

        assert!(!candidate.parameters.contains_key("location"));
        assert!(are_equivalent(Some(&candidate), Some(&previous)));
    }

    #[test]
    fn parameter_type_case_is_ignored() {
        let mut candidate = deployment();
        candidate
            .parameters
            .insert("location".to_string(), Parameter::typed("String", "westus"));
        let mut previous = deployment();
        previous
            .parameters
            .insert("location".to_string(), Parameter::typed("string", "westus"));
        previous
            .parameters
            .insert("functionAppName".to_string(), Parameter::typed("string", "orders"));

        assert!(are_equivalent(Some(&candidate), Some(&previous)));
    }

    #[test]
    fn identity_only_difference_is_ignored() {
        let mut candidate = deployment();
        candidate.manifest.resources[0].identity = None;
        let mut previous = deployment();
        previous.manifest.resources[0].identity = Some(json!({
            "type": "SystemAssigned",
            "principalId": "00000000-0000-0000-0000-000000000000"
        }));

        assert!(are_equivalent(Some(&candidate), Some(&previous)));
    }

    #[test]
    fn provider_view_of_candidate_is_equivalent() {
        assert!(are_equivalent(Some(&deployment()), Some(&provider_view())));
    }

    #[test]
    fn normalization_is_idempotent() {
        let previous = provider_view();

        let once = normalize_manifest(&previous.manifest);
        let reparsed: Manifest = serde_json::from_value(once.clone()).unwrap();
        assert_eq!(normalize_manifest(&reparsed), once);

        let parameters = normalize_parameters(&previous.parameters);
        let reparsed: ParameterSet = serde_json::from_value(parameters.clone()).unwrap();
        assert_eq!(normalize_parameters(&reparsed), parameters);
    }

    #[test]
    fn absent_sides_are_never_equivalent() {
        let d = deployment();
        assert!(!are_equivalent(None, Some(&d)));
        assert!(!are_equivalent(Some(&d), None));
        assert!(!are_equivalent(None, None));
    }

    #[test]
    fn changed_resource_is_detected() {
        let candidate = deployment();
        let mut previous = previous_of(&candidate);
        previous.manifest.resources[0].properties = Some(json!({"siteConfig": {
            "appSettings": [{"name": "A", "value": "1"}]
        }}));

        assert!(!are_equivalent(Some(&candidate), Some(&previous)));
    }

    #[test]
    fn changed_parameter_value_is_detected() {
        let candidate = deployment();
        let mut previous = previous_of(&candidate);
        previous
            .parameters
            .insert("functionAppName".to_string(), Parameter::typed("String", "other"));

        assert!(!are_equivalent(Some(&candidate), Some(&previous)));
    }

    #[test]
    fn nested_identity_is_stripped() {
        let mut manifest = Manifest::default();
        manifest.resources.push(
            Resource::new("Microsoft.Web/sites", "site").with_child(
                Resource::new("config", "slotconfignames").with_identity(json!({"type": "x"})),
            ),
        );

        let normalized = normalize_manifest(&manifest);
        assert!(normalized["resources"][0]["resources"][0].get("identity").is_none());
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(values_equal(&json!({"a": 1}), &json!({"a": 1.0})));
        assert!(!values_equal(&json!({"a": 1}), &json!({"a": 2})));
        assert!(!values_equal(&json!({"a": 1}), &json!({"a": "1"})));
    }

    #[test]
    fn arrays_are_order_sensitive_and_objects_are_not() {
        assert!(values_equal(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1})));
        assert!(!values_equal(&json!([1, 2]), &json!([2, 1])));
        assert!(!values_equal(&json!({"a": 1}), &json!({"a": 1, "b": null})));
    }
}
