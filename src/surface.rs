//! CLI surface construction from the checked parameter list.
//!
//! The surface is a dynamically built `clap` command: required and optional
//! parameters land in separate help groups, the default help flag is
//! re-added manually so its placement is controlled, and every
//! value-consuming parameter parses through its resolved `TypeParser` so
//! CLI type errors report through the surface's own error path.
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;
use std::ffi::OsString;
use std::fmt::Display;

use crate::error::{Error, Result};
use crate::spec::{ParamAction, ParsedArguments};
use crate::validate::CheckedParam;

const REQUIRED_HEADING: &str = "required arguments";
const OPTIONAL_HEADING: &str = "optional arguments";

pub(crate) struct Surface {
    command: Command,
    params: Vec<CheckedParam>,
}

impl Surface {
    pub(crate) fn build(
        script_name: &str,
        description: Option<&str>,
        params: Vec<CheckedParam>,
    ) -> Self {
        let mut command = Command::new(script_name.to_string())
            .disable_help_flag(true)
            .arg(
                Arg::new("help")
                    .short('h')
                    .long("help")
                    .action(ArgAction::Help)
                    .help("show this help message and exit")
                    .help_heading(OPTIONAL_HEADING),
            );
        if let Some(description) = description {
            command = command.about(description.to_string());
        }
        for param in &params {
            command = command.arg(build_arg(param));
        }
        command = command.arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("run with a lot of debugging output")
                .help_heading(OPTIONAL_HEADING),
        );
        Self { command, params }
    }

    pub(crate) fn params(&self) -> &[CheckedParam] {
        &self.params
    }

    /// Parse the invocation and project the matches into named values.
    pub(crate) fn parse(&mut self, argv: &[OsString]) -> Result<ParsedArguments> {
        let matches = self.command.clone().try_get_matches_from(argv.iter())?;
        Ok(self.extract(&matches))
    }

    /// A usage error reported through the surface's own error path.
    pub(crate) fn usage_error(&mut self, message: impl Display) -> Error {
        Error::Usage(
            self.command
                .error(clap::error::ErrorKind::MissingRequiredArgument, message),
        )
    }

    fn extract(&self, matches: &ArgMatches) -> ParsedArguments {
        let mut parsed = ParsedArguments::new();
        for param in &self.params {
            let name = param.spec.name.as_str();
            let value = match &param.spec.action {
                ParamAction::Store => matches
                    .get_one::<Value>(name)
                    .cloned()
                    .unwrap_or(Value::Null),
                ParamAction::StoreTrue | ParamAction::StoreFalse => {
                    Value::Bool(matches.get_flag(name))
                }
                ParamAction::Count => Value::from(matches.get_count(name)),
                ParamAction::Const(constant) => {
                    if matches.get_flag(name) {
                        constant.clone()
                    } else {
                        Value::Null
                    }
                }
            };
            parsed.insert(name, value);
        }
        parsed.insert("verbose", Value::from(matches.get_count("verbose")));
        parsed
    }
}

fn build_arg(param: &CheckedParam) -> Arg {
    let spec = &param.spec;
    let mut arg = Arg::new(spec.name.clone());
    if spec.positional {
        arg = arg.required(true).help_heading(REQUIRED_HEADING);
    } else {
        arg = arg.long(spec.name.clone());
        if let Some(short) = spec.short {
            arg = arg.short(short);
        }
        if spec.required {
            arg = arg.required(true).help_heading(REQUIRED_HEADING);
        } else {
            arg = arg.help_heading(OPTIONAL_HEADING);
        }
    }
    if let Some(help) = &spec.help {
        arg = arg.help(help.clone());
    }
    match &spec.action {
        ParamAction::Store => {
            arg = arg
                .action(ArgAction::Set)
                .value_name(spec.name.to_uppercase());
            if let Some(parser) = param.parser.clone() {
                arg = arg.value_parser(move |raw: &str| parser.parse(raw));
            }
        }
        ParamAction::StoreTrue => arg = arg.action(ArgAction::SetTrue),
        ParamAction::StoreFalse => arg = arg.action(ArgAction::SetFalse),
        ParamAction::Count => arg = arg.action(ArgAction::Count),
        // presence only; the constant is materialized during extraction
        ParamAction::Const(_) => arg = arg.action(ArgAction::SetTrue),
    }
    arg
}
