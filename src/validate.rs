//! Eager validation of the declared parameter list.
//!
//! Runs over the whole list at surface-build time, before any parsing, so a
//! misconfigured script fails immediately and deterministically rather than
//! only when a user happens to supply the offending parameter.
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::spec::{ParameterSpec, PromptText};
use crate::types::{TypeParser, TypeRegistry};

/// Flag names the surface reserves for itself.
const RESERVED_NAMES: [&str; 2] = ["help", "verbose"];

/// A parameter spec paired with its resolved parser.
#[derive(Debug, Clone)]
pub(crate) struct CheckedParam {
    pub(crate) spec: ParameterSpec,
    pub(crate) parser: Option<TypeParser>,
}

/// Validate every declared parameter and resolve its type once.
pub(crate) fn check_specs(
    registry: &TypeRegistry,
    parameters: &[ParameterSpec],
) -> Result<Vec<CheckedParam>> {
    let mut names = HashSet::new();
    let mut shorts = HashSet::new();
    let mut checked = Vec::with_capacity(parameters.len());

    for param in parameters {
        if RESERVED_NAMES.contains(&param.name.as_str()) {
            return Err(Error::Spec(format!(
                "parameter name {:?} is reserved by the surface",
                param.name
            )));
        }
        if !names.insert(param.name.clone()) {
            return Err(Error::Spec(format!(
                "duplicate parameter name {:?}",
                param.name
            )));
        }
        if param.positional && param.short.is_some() {
            return Err(Error::Spec(format!(
                "positional parameter {:?} cannot carry a short flag",
                param.name
            )));
        }
        if !param.positional && param.short.is_none() {
            return Err(Error::Spec(format!(
                "parameter {:?} needs a short flag or positional placement",
                param.name
            )));
        }
        if let Some(short) = param.short {
            if !shorts.insert(short) {
                return Err(Error::Spec(format!(
                    "duplicate short flag -{short} on {:?}",
                    param.name
                )));
            }
        }

        let promptable = param.prompt.as_ref().is_some_and(PromptText::is_enabled);
        if promptable && (param.required || param.positional) {
            return Err(Error::Spec(format!(
                "'--{}' is required and can't be combined with prompt",
                param.name
            )));
        }
        if promptable && !param.action.takes_value() {
            return Err(Error::Spec(format!(
                "parameter {:?} cannot prompt for a no-value action",
                param.name
            )));
        }

        if let Some(dependency) = &param.depends_on {
            if !parameters.iter().any(|other| &other.name == dependency) {
                return Err(Error::Spec(format!(
                    "parameter {:?} depends on unknown parameter {dependency:?}",
                    param.name
                )));
            }
        }

        let parser = resolve_parser(registry, param)?;
        checked.push(CheckedParam {
            spec: param.clone(),
            parser,
        });
    }

    Ok(checked)
}

/// Resolve the declared type and enforce the restricted-text policy.
///
/// Accepting unvalidated free text in a privilege-elevated tool is a hard
/// failure, never a warning.
fn resolve_parser(registry: &TypeRegistry, param: &ParameterSpec) -> Result<Option<TypeParser>> {
    let parser = match (&param.parser, &param.type_spec) {
        (Some(parser), _) => Some(parser.clone()),
        (None, Some(spec)) => Some(registry.resolve(spec)?),
        (None, None) => None,
    };

    if !param.action.takes_value() {
        // a type on a no-value action is tolerated and ignored
        return Ok(parser);
    }

    let Some(parser) = parser else {
        return Err(Error::Spec(format!(
            "a type must be specified for user-supplied argument {:?}",
            param.name
        )));
    };
    if parser.is_raw_text() {
        return Err(Error::Spec(format!(
            "parameter {:?} accepts unrestricted text; a restricted type must be used for all string arguments",
            param.name
        )));
    }
    Ok(Some(parser))
}
