//! Interactive collection of values still missing after parsing.
//!
//! The fill step is a single explicit pipeline: select unset promptable
//! parameters, collect each through the prompting protocol, validate the
//! collected text with the same resolved parser the CLI path used, and
//! merge into the value map. Nothing is reparsed.
use dialoguer::{Input, Password};
use serde_json::Value;
use std::io::ErrorKind;

use crate::error::{Error, Result};
use crate::spec::{ParameterSpec, ParsedArguments, PromptText};
use crate::validate::CheckedParam;

const DEFAULT_CONFIRM_PROMPT: &str = "Please confirm";
const DEFAULT_CONFIRM_ERROR: &str = "ERROR: input does not match its confirmation";

/// One line of interactive input.
///
/// The terminal implementation talks to the tty; tests substitute a
/// scripted source.
pub trait PromptSource {
    /// Display `text` and read one line. With `no_echo`, input is not
    /// displayed as typed.
    fn read_line(&mut self, text: &str, no_echo: bool) -> Result<String>;
}

/// `PromptSource` backed by the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl PromptSource for TerminalPrompt {
    fn read_line(&mut self, text: &str, no_echo: bool) -> Result<String> {
        let result = if no_echo {
            Password::new()
                .with_prompt(text)
                .allow_empty_password(true)
                .interact()
        } else {
            Input::<String>::new()
                .with_prompt(text)
                .allow_empty(true)
                .interact_text()
        };
        result.map_err(map_prompt_error)
    }
}

/// A keyboard interrupt during input is a deliberate abort, distinct from
/// every other read failure.
fn map_prompt_error(err: dialoguer::Error) -> Error {
    match err {
        dialoguer::Error::IO(io_err) if io_err.kind() == ErrorKind::Interrupted => {
            Error::Interrupted
        }
        other => Error::Input(format!("failed to read input: {other}")),
    }
}

/// Collect one value for a promptable parameter.
///
/// Loops until the input is non-empty unless `accept_empty` is set; applies
/// `strip`; on confirmation, prompts a second time and compares the two
/// values exactly.
pub(crate) fn collect(spec: &ParameterSpec, source: &mut dyn PromptSource) -> Result<String> {
    let options = &spec.prompt_options;
    let prompt_text = spec
        .prompt
        .as_ref()
        .and_then(PromptText::text)
        .map(str::to_string)
        .unwrap_or_else(|| spec.default_prompt_text());

    let value = loop {
        let mut line = source.read_line(&prompt_text, options.no_echo)?;
        if options.strip {
            line = line.trim().to_string();
        }
        if !line.is_empty() || options.accept_empty {
            break line;
        }
    };

    if options.confirm_enabled() {
        let confirm_text = options
            .confirm
            .as_ref()
            .and_then(PromptText::text)
            .unwrap_or(DEFAULT_CONFIRM_PROMPT);
        let confirmation = source.read_line(confirm_text, options.no_echo)?;
        if confirmation != value {
            let message = options
                .confirm_error
                .clone()
                .unwrap_or_else(|| DEFAULT_CONFIRM_ERROR.to_string());
            return Err(Error::Input(message));
        }
    }

    Ok(value)
}

/// Fill parameters whose prompt is enabled and whose value is still unset
/// (null, not merely empty).
pub(crate) fn fill_missing(
    params: &[CheckedParam],
    parsed: &mut ParsedArguments,
    source: &mut dyn PromptSource,
) -> Result<()> {
    for param in params {
        let promptable = param
            .spec
            .prompt
            .as_ref()
            .is_some_and(PromptText::is_enabled);
        if !promptable || !matches!(parsed.get(&param.spec.name), Some(Value::Null)) {
            continue;
        }
        let raw = collect(&param.spec, source)?;
        let value = match &param.parser {
            Some(parser) => parser.parse(&raw).map_err(|message| {
                Error::Input(format!("invalid value for {:?}: {message}", param.spec.name))
            })?,
            None => Value::String(raw),
        };
        parsed.insert(&param.spec.name, value);
        tracing::debug!(parameter = %param.spec.name, "filled from prompt");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::PromptOptions;
    use crate::types::{TypeRegistry, TypeSpec};
    use crate::validate::check_specs;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Scripted prompt source recording what was asked.
    #[derive(Default)]
    struct Scripted {
        lines: VecDeque<&'static str>,
        asked: Vec<(String, bool)>,
    }

    impl Scripted {
        fn with_lines(lines: &[&'static str]) -> Self {
            Self {
                lines: lines.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl PromptSource for Scripted {
        fn read_line(&mut self, text: &str, no_echo: bool) -> Result<String> {
            self.asked.push((text.to_string(), no_echo));
            Ok(self.lines.pop_front().expect("scripted input").to_string())
        }
    }

    fn promptable(options: PromptOptions) -> ParameterSpec {
        ParameterSpec::new("mailbox")
            .short('m')
            .type_spec(TypeSpec::named("restricted_str", Default::default()))
            .prompt(true)
            .prompt_options(options)
    }

    #[test]
    fn loops_until_non_empty() {
        let mut source = Scripted::with_lines(&["", "", "box1"]);
        let value = collect(&promptable(PromptOptions::default()), &mut source).expect("value");
        assert_eq!(value, "box1");
        assert_eq!(source.asked.len(), 3);
    }

    #[test]
    fn accept_empty_takes_a_single_attempt() {
        let mut source = Scripted::with_lines(&[""]);
        let options = PromptOptions {
            accept_empty: true,
            ..Default::default()
        };
        let value = collect(&promptable(options), &mut source).expect("value");
        assert_eq!(value, "");
        assert_eq!(source.asked.len(), 1);
    }

    #[test]
    fn strip_trims_before_the_empty_check() {
        let mut source = Scripted::with_lines(&["   ", " box1 "]);
        let options = PromptOptions {
            strip: true,
            ..Default::default()
        };
        let value = collect(&promptable(options), &mut source).expect("value");
        assert_eq!(value, "box1");
    }

    #[test]
    fn confirmation_match_returns_the_value() {
        let mut source = Scripted::with_lines(&["abc", "abc"]);
        let options = PromptOptions {
            confirm: Some(true.into()),
            ..Default::default()
        };
        let value = collect(&promptable(options), &mut source).expect("value");
        assert_eq!(value, "abc");
        assert_eq!(source.asked[1].0, DEFAULT_CONFIRM_PROMPT);
    }

    #[test]
    fn confirmation_mismatch_raises_the_default_message() {
        let mut source = Scripted::with_lines(&["abc", "xyz"]);
        let options = PromptOptions {
            confirm: Some(true.into()),
            ..Default::default()
        };
        let err = collect(&promptable(options), &mut source).expect_err("mismatch");
        assert!(matches!(err, Error::Input(message) if message == DEFAULT_CONFIRM_ERROR));
    }

    #[test]
    fn confirmation_mismatch_uses_the_configured_message() {
        let mut source = Scripted::with_lines(&["abc", "xyz"]);
        let options = PromptOptions {
            confirm: Some("Repeat the mailbox".into()),
            confirm_error: Some("mailboxes do not match".to_string()),
            ..Default::default()
        };
        let err = collect(&promptable(options), &mut source).expect_err("mismatch");
        assert_eq!(source.asked[1].0, "Repeat the mailbox");
        assert!(matches!(err, Error::Input(message) if message == "mailboxes do not match"));
    }

    #[test]
    fn no_echo_reaches_the_source() {
        let mut source = Scripted::with_lines(&["secret"]);
        let options = PromptOptions {
            no_echo: true,
            ..Default::default()
        };
        collect(&promptable(options), &mut source).expect("value");
        assert_eq!(source.asked[0], ("Mailbox".to_string(), true));
    }

    #[test]
    fn fill_validates_through_the_shared_parser() {
        let params = [ParameterSpec::new("port")
            .short('p')
            .type_spec(TypeSpec::named("restricted_int", Default::default()))
            .prompt(true)];
        let checked = check_specs(&TypeRegistry::with_builtins(), &params).expect("valid");

        let mut parsed = ParsedArguments::new();
        parsed.insert("port", Value::Null);
        let mut source = Scripted::with_lines(&["8080"]);
        fill_missing(&checked, &mut parsed, &mut source).expect("filled");
        assert_eq!(parsed.get("port"), Some(&json!(8080)));

        let mut parsed = ParsedArguments::new();
        parsed.insert("port", Value::Null);
        let mut source = Scripted::with_lines(&["eighty"]);
        let err = fill_missing(&checked, &mut parsed, &mut source).expect_err("invalid");
        assert!(matches!(err, Error::Input(message) if message.contains("port")));
    }

    #[test]
    fn fill_skips_supplied_and_unpromptable_parameters() {
        let params = [
            ParameterSpec::new("mailbox")
                .short('m')
                .type_spec(TypeSpec::named("restricted_str", Default::default()))
                .prompt(true),
            ParameterSpec::new("namespace")
                .short('n')
                .type_spec(TypeSpec::named("restricted_str", Default::default())),
        ];
        let checked = check_specs(&TypeRegistry::with_builtins(), &params).expect("valid");

        let mut parsed = ParsedArguments::new();
        parsed.insert("mailbox", json!("box1"));
        parsed.insert("namespace", Value::Null);
        let mut source = Scripted::default();
        fill_missing(&checked, &mut parsed, &mut source).expect("nothing to fill");
        assert!(source.asked.is_empty());
        assert_eq!(parsed.get("namespace"), Some(&Value::Null));
    }

    #[test]
    fn interrupt_short_circuits() {
        struct Interrupting;
        impl PromptSource for Interrupting {
            fn read_line(&mut self, _text: &str, _no_echo: bool) -> Result<String> {
                Err(Error::Interrupted)
            }
        }

        let err = collect(&promptable(PromptOptions::default()), &mut Interrupting)
            .expect_err("interrupted");
        assert!(matches!(err, Error::Interrupted));
    }
}
