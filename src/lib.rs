//! Declarative framework for small privileged command-line utilities.
//!
//! A script author declares a list of [`ParameterSpec`]s; the framework
//! derives a validated CLI surface, optionally prompts for missing values,
//! enforces cross-parameter dependencies, verifies or switches the
//! executing user, and hands the validated named values to a [`Runner`]
//! backend that performs the actual privileged work.
//!
//! ```no_run
//! use acolyte::{CommandRunner, ParamAction, ParameterSpec, Script, TypeSpec};
//!
//! let runner = CommandRunner::from_command_line("ansible-playbook add_mailbox.yml")
//!     .expect("runner command line");
//! Script::new(runner)
//!     .description("add a mailbox to the local mail server")
//!     .check_user("root")
//!     .success_msg("mailbox created")
//!     .parameter(
//!         ParameterSpec::new("mailbox")
//!             .positional(true)
//!             .help("name of the new mailbox")
//!             .type_spec(TypeSpec::named("restricted_str", Default::default())),
//!     )
//!     .parameter(
//!         ParameterSpec::new("force")
//!             .short('f')
//!             .help("overwrite an existing mailbox")
//!             .action(ParamAction::StoreTrue),
//!     )
//!     .auto();
//! ```
mod depends;
mod error;
mod privilege;
mod prompt;
mod runner;
mod script;
mod spec;
mod surface;
mod types;
mod validate;

pub use error::{Error, Result, EXIT_FAILURE, EXIT_INPUT, EXIT_SUCCESS, EXIT_USAGE};
pub use privilege::{check_identity, switch_identity};
pub use prompt::{PromptSource, TerminalPrompt};
pub use runner::{CommandRunner, Runner, RunnerVariable};
pub use script::Script;
pub use spec::{ParamAction, ParameterSpec, ParsedArguments, PromptOptions, PromptText};
pub use types::{TypeConstructor, TypeParser, TypeRegistry, TypeSpec};
