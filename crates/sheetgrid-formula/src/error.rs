use thiserror::Error;

/// Why a formula could not be evaluated.
///
/// The public evaluator reports every one of these as "no result"; the
/// variants exist for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("syntax error in formula: {0}")]
    Syntax(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{name} expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error("invalid argument to {0}")]
    InvalidArgument(String),

    #[error("{0} has no values to work on")]
    Empty(String),
}
