//! Pipeline outcome taxonomy and exit-status mapping.
//!
//! Every failure mode in the pipeline is a tagged variant here; the single
//! process-exit call lives in `Script::auto`, which maps each variant to
//! exactly one terminal action.
use thiserror::Error;

/// The runner reported success.
pub const EXIT_SUCCESS: i32 = 0;
/// The runner reported failure, or the identity check/switch refused.
pub const EXIT_FAILURE: i32 = 1;
/// CLI usage error or bad parameter specification.
pub const EXIT_USAGE: i32 = 2;
/// Interactive input failed validation, or the user interrupted a prompt.
pub const EXIT_INPUT: i32 = 3;

#[derive(Debug, Error)]
pub enum Error {
    /// A parameter declaration is internally inconsistent or violates the
    /// restricted-text policy. Fatal before any argument is parsed.
    #[error("parameter specification error: {0}")]
    Spec(String),

    /// The command line failed to parse, or a dependency constraint was
    /// violated. Carries the surface's own error report.
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// Interactive input failed validation (confirmation mismatch, value
    /// rejected by its type).
    #[error("{0}")]
    Input(String),

    /// The user interrupted a prompt.
    #[error("interrupted")]
    Interrupted,

    /// The identity check or switch refused to continue.
    #[error("{0}")]
    Policy(String),
}

impl Error {
    /// The exit status this outcome maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Spec(_) => EXIT_USAGE,
            Error::Usage(err) => err.exit_code(),
            Error::Input(_) | Error::Interrupted => EXIT_INPUT,
            Error::Policy(_) => EXIT_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
