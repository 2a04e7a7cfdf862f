//! Parameter default resolution and submission pruning.

use crate::manifest::types::is_empty_value;
use crate::manifest::{Parameter, ParameterDeclarations, ParameterSet};

/// Merge supplied parameter values with the manifest's declarations.
///
/// Every declared parameter yields exactly one entry typed with its declared
/// type. Its value is the supplied one when present and non-empty, else the
/// declaration's inline value, else its `defaultValue`. Supplied parameters
/// the manifest does not declare are left out.
pub fn resolve_defaults(
    parameters: &ParameterSet,
    declarations: &ParameterDeclarations,
) -> ParameterSet {
    declarations
        .iter()
        .map(|(name, declaration)| {
            let supplied = parameters
                .get(name)
                .and_then(|p| p.value.as_ref())
                .filter(|v| !is_empty_value(v));
            let inline = declaration.value.as_ref().filter(|v| !is_empty_value(v));
            let value = supplied
                .or(inline)
                .or(declaration.default_value.as_ref())
                .cloned();

            let resolved = Parameter {
                param_type: Some(declaration.param_type.clone()),
                value,
                ..Parameter::default()
            };
            (name.clone(), resolved)
        })
        .collect()
}

/// Drop parameters whose value is absent or empty so they are never sent
/// to the provider as null.
pub fn prune_empty(parameters: &mut ParameterSet) {
    parameters.retain(|_, parameter| !parameter.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ParameterDeclaration;
    use serde_json::json;

    fn declarations() -> ParameterDeclarations {
        ParameterDeclarations::from([
            (
                "location".to_string(),
                ParameterDeclaration::string().with_default("westus"),
            ),
            (
                "capacity".to_string(),
                ParameterDeclaration::int().with_default(1),
            ),
            ("publisher".to_string(), ParameterDeclaration::string()),
        ])
    }

    #[test]
    fn supplied_values_win_over_defaults() {
        let parameters = ParameterSet::from([(
            "location".to_string(),
            Parameter::value("eastus"),
        )]);

        let resolved = resolve_defaults(&parameters, &declarations());

        assert_eq!(resolved["location"], Parameter::typed("String", "eastus"));
        assert_eq!(resolved["capacity"], Parameter::typed("Int", 1));
    }

    #[test]
    fn empty_supplied_value_falls_back_to_default() {
        let parameters = ParameterSet::from([("location".to_string(), Parameter::value(""))]);

        let resolved = resolve_defaults(&parameters, &declarations());

        assert_eq!(resolved["location"].value, Some(json!("westus")));
    }

    #[test]
    fn inline_declaration_value_precedes_default() {
        let mut declarations = declarations();
        declarations.get_mut("location").unwrap().value = Some(json!("northeurope"));

        let resolved = resolve_defaults(&ParameterSet::new(), &declarations);

        assert_eq!(resolved["location"].value, Some(json!("northeurope")));
    }

    #[test]
    fn undeclared_parameters_are_excluded() {
        let parameters = ParameterSet::from([("stray".to_string(), Parameter::value("x"))]);

        let resolved = resolve_defaults(&parameters, &declarations());

        assert!(!resolved.contains_key("stray"));
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved["publisher"].value, None);
    }

    #[test]
    fn prune_drops_empty_values_only() {
        let mut parameters = ParameterSet::from([
            ("a".to_string(), Parameter::value("x")),
            ("b".to_string(), Parameter::value("")),
            ("c".to_string(), Parameter::default()),
            ("d".to_string(), Parameter::value(0)),
            ("e".to_string(), Parameter::value(false)),
        ]);

        prune_empty(&mut parameters);

        let names: Vec<_> = parameters.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "d", "e"]);
    }
}
