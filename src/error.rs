//! Crate-wide error hierarchy.
//!
//! The parser, the catalog, and the scheduler each raise their own narrow
//! error enum; [`DaffyError`] unifies them at the interpreter boundary so the
//! CLI has one type to match on when deciding an exit code.

use thiserror::Error;

/// A failure while parsing a single instruction line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The character-driven state machine hit a character with no legal
    /// transition out of its current state.
    #[error("{instruction}\n{caret}\nat char {column}: expecting {expected}")]
    Syntax {
        /// The offending instruction, verbatim.
        instruction: String,
        /// A `"-" * column + "^"` line pointing at the offending character.
        caret: String,
        /// The 0-based column of the offending character.
        column: usize,
        /// What the parser would have accepted instead.
        expected: String,
    },

    /// The state machine reached a state outside its declared transition
    /// table. Unreachable in this implementation (the state enum's `match`
    /// is exhaustive), kept only so the error taxonomy matches the
    /// original design's distinct `UndefinedState` kind.
    #[error("parser reached an undefined state: {0}")]
    UndefinedState(String),
}

impl ParseError {
    pub(crate) fn syntax(instruction: &str, column: usize, expected: &str) -> Self {
        Self::Syntax {
            instruction: instruction.to_string(),
            caret: "-".repeat(column) + "^",
            column,
            expected: expected.to_string(),
        }
    }
}

/// A failure registering or looking up an [`crate::catalog::OperationType`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// No operation type is registered under this name.
    #[error("operation type not found: {0}")]
    OperationTypeNotFound(String),

    /// A type with this name is already registered.
    #[error("operation type already exists: {0}")]
    OperationTypeAlreadyExists(String),
}

/// A failure while submitting an instruction's operation into the scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    /// `submit` was given a type name absent from the catalog.
    #[error("operation type not found: {0}")]
    OperationTypeNotFound(String),

    /// Two operations in the same scheduler were declared with the same
    /// name.
    #[error("operation already exists: {0}")]
    OperationAlreadyExists(String),

    /// An argument referenced an operation name that is not (yet, or ever)
    /// in the table -- forward references are rejected by construction.
    #[error("operation not found: {0}")]
    OperationNotFound(String),

    /// An argument had the wrong shape for the operation type being
    /// constructed (e.g. a literal where `value` requires exactly one
    /// literal argument named `value`, or an arity mismatch).
    #[error("wrong argument: {0}")]
    WrongArgument(String),

    /// One or more operations returned an error from their `execfunc`
    /// during this run. The barrier still drained -- independent siblings
    /// ran to completion -- but the run as a whole is considered failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

/// The unified, crate-level error surfaced at the interpreter/CLI boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DaffyError {
    /// A parse failure. Per the CLI contract, these are logged and the
    /// offending instruction is skipped rather than aborting the run.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A submission failure. Also logged and skipped rather than aborting
    /// the run.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
