//! OPLAW error types.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum OplawError {
    /// Malformed directive line, or a law expression that failed to compile.
    BadDirective(String),
    /// REPLACE/ENABLE/DISABLE targeting a symbol absent from the registry.
    UnknownOperation(String),
    /// An evaluated string did not split into exactly three tokens.
    MalformedExpression(String),
    /// An outer operand token failed numeric parsing.
    NonNumericOperand(String),
    /// The resolved operator has no registry entry, or its entry is disabled.
    UndefinedOrDisabledOperation(String),
    /// Internal invariant violation: an operation spec with no usable law.
    MalformedOperationSpec(String),
    /// A provider payload that could not be normalized into a bundle.
    BadPayload(String),
}

impl fmt::Display for OplawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadDirective(msg) => write!(f, "BadDirective: {msg}"),
            Self::UnknownOperation(msg) => write!(f, "UnknownOperation: {msg}"),
            Self::MalformedExpression(msg) => write!(f, "MalformedExpression: {msg}"),
            Self::NonNumericOperand(msg) => write!(f, "NonNumericOperand: {msg}"),
            Self::UndefinedOrDisabledOperation(msg) => {
                write!(f, "UndefinedOrDisabledOperation: {msg}")
            }
            Self::MalformedOperationSpec(msg) => write!(f, "MalformedOperationSpec: {msg}"),
            Self::BadPayload(msg) => write!(f, "BadPayload: {msg}"),
        }
    }
}

impl std::error::Error for OplawError {}

pub type Result<T> = std::result::Result<T, OplawError>;
