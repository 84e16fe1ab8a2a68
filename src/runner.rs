//! Runner contract, variable projection, and the shipped command backend.
use anyhow::Context;
use serde_json::{Map, Value};
use std::io::Write;
use std::process::Command;

use crate::spec::ParsedArguments;

/// A named variable handed to the runner backend.
pub type RunnerVariable = (String, Value);

/// External backend that performs the actual privileged action.
///
/// The boolean is a legitimate outcome, not an error: the orchestrator maps
/// `true` to exit 0 and `false` to exit 1.
pub trait Runner {
    fn run(&mut self, variables: &[RunnerVariable], verbosity: u8) -> bool;
}

/// Project the final values into the runner-variable sequence.
///
/// Order: `sudo_user` when a switch occurred, `script_name`, then every
/// resolved value (the synthetic `verbose` count included) as
/// `param_<name>` in declaration order.
pub(crate) fn build_variables(
    script_name: &str,
    sudo_user: Option<&str>,
    parsed: &ParsedArguments,
) -> Vec<RunnerVariable> {
    let mut variables = Vec::new();
    if let Some(sudo_user) = sudo_user {
        variables.push((
            "sudo_user".to_string(),
            Value::String(sudo_user.to_string()),
        ));
    }
    variables.push((
        "script_name".to_string(),
        Value::String(script_name.to_string()),
    ));
    for (name, value) in parsed.iter() {
        variables.push((format!("param_{name}"), value.clone()));
    }
    variables
}

/// Runner that shells out to a configured orchestration command.
///
/// Variables are written to a temporary JSON file and passed as
/// `--extra-vars @<path>`; secret values must never appear on the child's
/// argument vector.
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
}

impl CommandRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse a full command line, e.g. `"ansible-playbook site.yml"`.
    pub fn from_command_line(command_line: &str) -> anyhow::Result<Self> {
        let mut words =
            shell_words::split(command_line).context("parse runner command line")?;
        if words.is_empty() {
            anyhow::bail!("runner command line is empty");
        }
        let program = words.remove(0);
        Ok(Self::new(program, words))
    }

    fn invoke(&self, variables: &[RunnerVariable], verbosity: u8) -> anyhow::Result<bool> {
        let program = which::which(&self.program)
            .with_context(|| format!("runner command {:?} not found", self.program))?;

        let vars: Map<String, Value> = variables.iter().cloned().collect();
        let mut vars_file = tempfile::NamedTempFile::new().context("create vars file")?;
        serde_json::to_writer(&mut vars_file, &Value::Object(vars)).context("write vars file")?;
        vars_file.flush().context("flush vars file")?;

        let mut command = Command::new(&program);
        command.args(&self.args);
        command
            .arg("--extra-vars")
            .arg(format!("@{}", vars_file.path().display()));
        if verbosity > 0 {
            command.arg(format!("-{}", "v".repeat(verbosity as usize)));
        }

        tracing::info!(program = %program.display(), "invoking runner");
        let status = command.status().context("spawn runner")?;
        Ok(status.success())
    }
}

impl Runner for CommandRunner {
    fn run(&mut self, variables: &[RunnerVariable], verbosity: u8) -> bool {
        match self.invoke(variables, verbosity) {
            Ok(success) => success,
            Err(err) => {
                tracing::error!("runner failed: {err:#}");
                false
            }
        }
    }
}
