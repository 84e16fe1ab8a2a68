//! The framework facade: sequences the pipeline and owns the exit boundary.
use std::ffi::OsString;
use std::path::Path;
use std::process;

use tracing_subscriber::EnvFilter;

use crate::depends;
use crate::error::{Error, Result, EXIT_FAILURE, EXIT_INPUT, EXIT_SUCCESS};
use crate::privilege;
use crate::prompt::{self, PromptSource, TerminalPrompt};
use crate::runner::{self, Runner};
use crate::spec::{ParameterSpec, ParsedArguments};
use crate::surface::Surface;
use crate::types::TypeRegistry;
use crate::validate;

/// A declarative privileged script: parameter list, policy, and backend.
///
/// Built once at startup; [`Script::auto`] runs the whole pipeline and
/// exits.
pub struct Script<R: Runner> {
    description: Option<String>,
    parameters: Vec<ParameterSpec>,
    check_user: Option<String>,
    become_user: Option<String>,
    success_msg: Option<String>,
    registry: TypeRegistry,
    runner: R,
    sudo_user: Option<String>,
}

impl<R: Runner> Script<R> {
    pub fn new(runner: R) -> Self {
        Self {
            description: None,
            parameters: Vec::new(),
            check_user: None,
            become_user: None,
            success_msg: None,
            registry: TypeRegistry::with_builtins(),
            runner,
            sudo_user: None,
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Append one parameter declaration.
    pub fn parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Replace the declared parameter list.
    pub fn parameters(mut self, parameters: Vec<ParameterSpec>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Only this user may run the script.
    pub fn check_user(mut self, user: impl Into<String>) -> Self {
        self.check_user = Some(user.into());
        self
    }

    /// Switch to this user before parsing. Composes with `check_user`; the
    /// check runs first.
    pub fn become_user(mut self, user: impl Into<String>) -> Self {
        self.become_user = Some(user.into());
        self
    }

    /// Printed when the runner reports success.
    pub fn success_msg(mut self, text: impl Into<String>) -> Self {
        self.success_msg = Some(text.into());
        self
    }

    /// Replace the default type registry.
    pub fn type_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Run the pipeline: check identity, switch identity, validate specs,
    /// build the surface, parse, fill prompts, check dependencies, bridge
    /// to the runner. The runner's boolean comes back unchanged.
    pub fn run(&mut self, argv: &[OsString], source: &mut dyn PromptSource) -> Result<bool> {
        if let Some(required) = self.check_user.clone() {
            privilege::check_identity(&required)?;
        }
        if let Some(target) = self.become_user.clone() {
            self.sudo_user = Some(privilege::switch_identity(&target)?);
        }

        let script_name = script_name_from(argv);
        let checked = validate::check_specs(&self.registry, &self.parameters)?;
        let mut surface = Surface::build(&script_name, self.description.as_deref(), checked);
        let mut parsed = surface.parse(argv)?;
        init_logging(parsed.verbose());
        prompt::fill_missing(surface.params(), &mut parsed, source)?;
        depends::check(&mut surface, &parsed)?;
        let parsed = parsed; // immutable once dependency checking completes

        Ok(self.execute(&script_name, &parsed))
    }

    fn execute(&mut self, script_name: &str, parsed: &ParsedArguments) -> bool {
        let variables = runner::build_variables(script_name, self.sudo_user.as_deref(), parsed);
        tracing::debug!(variables = variables.len(), "handing off to runner");
        let status = self.runner.run(&variables, parsed.verbose());
        if status {
            if let Some(message) = &self.success_msg {
                println!("{message}");
            }
        }
        status
    }

    /// Run the pipeline against the process's own arguments and exit.
    ///
    /// The only process-exit call in the crate lives here; every outcome
    /// maps to exactly one exit status.
    pub fn auto(mut self) -> ! {
        let argv: Vec<OsString> = std::env::args_os().collect();
        match self.run(&argv, &mut TerminalPrompt) {
            Ok(true) => process::exit(EXIT_SUCCESS),
            Ok(false) => process::exit(EXIT_FAILURE),
            // the surface prints its own report (help included)
            Err(Error::Usage(err)) => err.exit(),
            // a deliberate abort; nothing to report
            Err(Error::Interrupted) => process::exit(EXIT_INPUT),
            Err(err) => {
                eprintln!("{err}");
                process::exit(err.exit_code());
            }
        }
    }
}

/// Stderr logging, filter from `RUST_LOG` or the verbosity count.
fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// The invoking script's base name, read from the argument vector.
fn script_name_from(argv: &[OsString]) -> String {
    argv.first()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "script".to_string())
}
