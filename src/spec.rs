//! Declarative parameter specifications and the per-invocation value map.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{TypeParser, TypeSpec};

/// Parsing action for one parameter.
///
/// `Store` consumes a value from the command line; the remaining actions
/// form the no-value whitelist and never consume one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamAction {
    /// Consume and validate one value.
    #[default]
    Store,
    /// Boolean flag, default `false`.
    StoreTrue,
    /// Boolean flag, default `true`.
    StoreFalse,
    /// Repeatable counting flag.
    Count,
    /// Store a fixed value when the flag is present.
    Const(Value),
}

impl ParamAction {
    /// Whether this action consumes a value from the command line.
    pub fn takes_value(&self) -> bool {
        matches!(self, ParamAction::Store)
    }

    fn is_store(&self) -> bool {
        matches!(self, ParamAction::Store)
    }
}

/// A boolean toggle or custom text, as accepted by `prompt` and `confirm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptText {
    Toggle(bool),
    Text(String),
}

impl PromptText {
    /// Enabled means `true` or non-empty text.
    pub fn is_enabled(&self) -> bool {
        match self {
            PromptText::Toggle(enabled) => *enabled,
            PromptText::Text(text) => !text.is_empty(),
        }
    }

    /// The custom text, if one was given.
    pub fn text(&self) -> Option<&str> {
        match self {
            PromptText::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

impl From<bool> for PromptText {
    fn from(enabled: bool) -> Self {
        PromptText::Toggle(enabled)
    }
}

impl From<&str> for PromptText {
    fn from(text: &str) -> Self {
        PromptText::Text(text.to_string())
    }
}

impl From<String> for PromptText {
    fn from(text: String) -> Self {
        PromptText::Text(text)
    }
}

/// Input-shaping options for interactive prompting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptOptions {
    /// Allow blank input; a single attempt suffices.
    pub accept_empty: bool,
    /// Prompt a second time and require both inputs to match exactly.
    pub confirm: Option<PromptText>,
    /// Message reported when the confirmation does not match.
    pub confirm_error: Option<String>,
    /// Suppress terminal echo while typing (secret entry).
    pub no_echo: bool,
    /// Trim surrounding whitespace before validation.
    pub strip: bool,
}

impl PromptOptions {
    pub(crate) fn confirm_enabled(&self) -> bool {
        self.confirm.as_ref().is_some_and(PromptText::is_enabled)
    }

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// One entry in the declared parameter list.
///
/// Instances are built once by the script author at startup and are
/// read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Unique identifier; doubles as the long flag and the runner-variable
    /// suffix.
    pub name: String,

    /// Single-letter flag alias; unique among non-positional parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,

    /// Positional parameters are registered by name only and are implicitly
    /// required.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub positional: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    /// Help text shown on the generated surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// How the raw text is parsed and validated.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_spec: Option<TypeSpec>,

    #[serde(default, skip_serializing_if = "ParamAction::is_store")]
    pub action: ParamAction,

    /// Interactive fallback for values still unset after parsing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PromptText>,

    #[serde(default, skip_serializing_if = "PromptOptions::is_default")]
    pub prompt_options: PromptOptions,

    /// Name of another parameter that must also be supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,

    /// Pre-resolved parser; passes through the registry unchanged.
    #[serde(skip)]
    pub parser: Option<TypeParser>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            positional: false,
            required: false,
            help: None,
            type_spec: None,
            action: ParamAction::Store,
            prompt: None,
            prompt_options: PromptOptions::default(),
            depends_on: None,
            parser: None,
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn positional(mut self, positional: bool) -> Self {
        self.positional = positional;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    pub fn type_spec(mut self, spec: TypeSpec) -> Self {
        self.type_spec = Some(spec);
        self
    }

    pub fn action(mut self, action: ParamAction) -> Self {
        self.action = action;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<PromptText>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn prompt_options(mut self, options: PromptOptions) -> Self {
        self.prompt_options = options;
        self
    }

    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on = Some(name.into());
        self
    }

    /// Attach an already-resolved parsing callable.
    pub fn parser(mut self, parser: TypeParser) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Prompt text used when the author enabled prompting without custom
    /// text: the name with its first letter capitalized.
    pub(crate) fn default_prompt_text(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

/// Named values resolved for one invocation, in declaration order.
///
/// Includes the synthetic `verbose` count; immutable once dependency
/// checking completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArguments {
    entries: Vec<(String, Value)>,
}

impl ParsedArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    /// Whether the parameter was supplied. Null, `false`, zero and the
    /// empty string all count as unset.
    pub fn is_supplied(&self, name: &str) -> bool {
        self.get(name).is_some_and(value_is_supplied)
    }

    /// The `-v/--verbose` count for this invocation.
    pub fn verbose(&self) -> u8 {
        self.get("verbose")
            .and_then(Value::as_u64)
            .unwrap_or(0)
            .min(u8::MAX as u64) as u8
    }

    pub(crate) fn insert(&mut self, name: &str, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(entry, _)| entry == name) {
            entry.1 = value;
        } else {
            self.entries.push((name.to_string(), value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

pub(crate) fn value_is_supplied(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
