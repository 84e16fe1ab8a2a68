//! Cross-parameter dependency enforcement.
//!
//! Runs after prompting, once every value is known. Pure over its inputs,
//! so checking an already-valid map twice is a no-op.
use crate::error::Result;
use crate::spec::ParsedArguments;
use crate::surface::Surface;

/// Enforce every `depends_on` constraint.
///
/// A parameter that was supplied while its named dependency was not is a
/// usage error naming both flags, reported through the surface's own error
/// path.
pub(crate) fn check(surface: &mut Surface, parsed: &ParsedArguments) -> Result<()> {
    let violation = surface.params().iter().find_map(|param| {
        let dependency = param.spec.depends_on.as_ref()?;
        let violated = parsed.is_supplied(&param.spec.name) && !parsed.is_supplied(dependency);
        violated.then(|| (param.spec.name.clone(), dependency.clone()))
    });

    match violation {
        Some((name, dependency)) => Err(surface.usage_error(format!(
            "argument --{name} requires --{dependency} to be present."
        ))),
        None => Ok(()),
    }
}
