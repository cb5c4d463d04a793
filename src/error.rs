//! Error handling
//!
use thiserror;

use crate::ident::Identifier;

/// Public error enumeration
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid formula - '{expression}', reason: {reason}")]
    InvalidFormula {
        expression: String,
        reason: FormulaError,
    },

    #[error("Wrong argument count for '{identifier}' - expected: {expected}, actual: {actual}")]
    WrongArgumentCount {
        identifier: Identifier,
        expected: usize,
        actual: usize,
    },

    #[error("Division by zero in operator '{operator}'")]
    DivideByZero { operator: char },

    #[error("Function '{0}' is referenced by other functions and cannot be removed")]
    ReferencedFunction(Identifier),

    #[error("Function '{0}' is not defined in this namespace")]
    UndefinedFunction(Identifier),
}

impl Error {
    pub(crate) fn formula<S: Into<String>>(expression: S, reason: FormulaError) -> Self {
        Error::InvalidFormula {
            expression: expression.into(),
            reason,
        }
    }
}

/// The reason a formula failed to compile
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("a space separates two alphanumeric characters")]
    InvalidSpacing,

    #[error("brackets are not paired")]
    UnpairedBrackets,

    #[error("malformed function identifier: {0}")]
    InvalidIdentifier(String),

    #[error("invalid parameter name: '{0}'")]
    InvalidParameter(String),

    #[error("conflicting variable name: '{0}'")]
    ConflictingVariable(String),

    #[error("conflicting function name: '{0}' already exists")]
    ConflictingFunction(Identifier),

    #[error("undefined variable: '{0}'")]
    UndefinedVariable(String),

    #[error("undefined function: '{name}' which should accept {arity} arguments")]
    UndefinedFunction { name: String, arity: usize },

    #[error("invalid operator sequence near '{0}'")]
    InvalidOperatorSequence(String),

    #[error("invalid conjunction of multiple unary operator '-'")]
    RepeatedNegative,

    #[error("invalid separation character ',' outside of a function input")]
    StraySeparator,

    #[error("empty argument in call to '{0}'")]
    EmptyArgument(String),

    #[error("function '{0}' may not invoke itself")]
    RecursiveReference(Identifier),

    #[error("too many parameters - limit: {limit}, actual: {actual}")]
    TooManyParameters { limit: usize, actual: usize },

    #[error("namespace is full - capacity: {0}")]
    NamespaceFull(usize),

    #[error("function calls nested deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("call chain too deep - limit: {limit}, actual: {actual}")]
    CallChainTooDeep { limit: usize, actual: usize },
}
