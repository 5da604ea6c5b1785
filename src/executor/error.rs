//! Executor-specific errors.

use crate::datum::{SerializationError, Type};
use crate::storage::StorageError;

use super::compare::CompOp;

/// Reasons a predicate cannot be evaluated against an operator's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    /// Attribute-to-attribute comparison where a literal was required.
    AttributeComparison,

    /// Literal comparison where two attributes were required.
    LiteralComparison,

    /// Referenced attribute does not exist in the input schema.
    UnknownAttribute(String),

    /// Operand types differ.
    TypeMismatch {
        /// Attribute on the left-hand side.
        attribute: String,
        /// Type of the left-hand attribute.
        expected: Type,
        /// Type of the right-hand operand (`None` for a NULL literal).
        found: Option<Type>,
    },

    /// Join operator other than equality.
    UnsupportedJoinOperator(CompOp),
}

impl std::fmt::Display for ConditionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionError::AttributeComparison => {
                write!(f, "attribute comparison not supported, expected a literal")
            }
            ConditionError::LiteralComparison => {
                write!(f, "literal comparison not supported, expected an attribute")
            }
            ConditionError::UnknownAttribute(name) => {
                write!(f, "attribute \"{}\" does not exist", name)
            }
            ConditionError::TypeMismatch {
                attribute,
                expected,
                found,
            } => match found {
                Some(found) => write!(
                    f,
                    "type mismatch on \"{}\": expected {}, found {}",
                    attribute, expected, found
                ),
                None => write!(
                    f,
                    "type mismatch on \"{}\": expected {}, found NULL",
                    attribute, expected
                ),
            },
            ConditionError::UnsupportedJoinOperator(op) => {
                write!(f, "unsupported join operator {}", op)
            }
        }
    }
}

/// Errors that can occur during query execution.
///
/// End-of-stream is not an error; iterators report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorError {
    /// Predicate references a missing attribute or compares mismatched types.
    BadCondition(ConditionError),

    /// Tuple bytes could not be encoded or decoded.
    Serialization(SerializationError),

    /// Error from the underlying table or index.
    Storage(StorageError),
}

impl std::fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutorError::BadCondition(e) => write!(f, "bad condition: {}", e),
            ExecutorError::Serialization(e) => write!(f, "{}", e),
            ExecutorError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ExecutorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecutorError::Serialization(e) => Some(e),
            ExecutorError::Storage(e) => Some(e),
            ExecutorError::BadCondition(_) => None,
        }
    }
}

impl From<ConditionError> for ExecutorError {
    fn from(e: ConditionError) -> Self {
        ExecutorError::BadCondition(e)
    }
}

impl From<SerializationError> for ExecutorError {
    fn from(e: SerializationError) -> Self {
        ExecutorError::Serialization(e)
    }
}

impl From<StorageError> for ExecutorError {
    fn from(e: StorageError) -> Self {
        ExecutorError::Storage(e)
    }
}

/// Integer result codes for callers speaking the classic iterator protocol.
pub mod result_code {
    use super::ExecutorError;

    /// A tuple was produced.
    pub const SUCCESS: i32 = 0;
    /// The iterator is exhausted.
    pub const END_OF_STREAM: i32 = -1;
    /// The predicate could not be evaluated against the input.
    pub const BAD_CONDITION: i32 = -2;
    /// Any other failure (storage, codec).
    pub const OTHER_ERROR: i32 = -3;

    /// Maps a `next_tuple` result onto its result code.
    pub fn of<T>(result: &Result<Option<T>, ExecutorError>) -> i32 {
        match result {
            Ok(Some(_)) => SUCCESS,
            Ok(None) => END_OF_STREAM,
            Err(ExecutorError::BadCondition(_)) => BAD_CONDITION,
            Err(_) => OTHER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_codes() {
        let ok: Result<Option<usize>, ExecutorError> = Ok(Some(12));
        let eos: Result<Option<usize>, ExecutorError> = Ok(None);
        let bad: Result<Option<usize>, ExecutorError> =
            Err(ConditionError::AttributeComparison.into());
        let other: Result<Option<usize>, ExecutorError> =
            Err(SerializationError::InvalidFormat("x".into()).into());

        assert_eq!(result_code::of(&ok), result_code::SUCCESS);
        assert_eq!(result_code::of(&eos), result_code::END_OF_STREAM);
        assert_eq!(result_code::of(&bad), result_code::BAD_CONDITION);
        assert_eq!(result_code::of(&other), result_code::OTHER_ERROR);
    }

    #[test]
    fn test_display() {
        let err: ExecutorError = ConditionError::UnknownAttribute("x".into()).into();
        assert_eq!(err.to_string(), "bad condition: attribute \"x\" does not exist");

        let err: ExecutorError = ConditionError::TypeMismatch {
            attribute: "a".into(),
            expected: Type::Int,
            found: Some(Type::Real),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "bad condition: type mismatch on \"a\": expected integer, found real"
        );
    }

    #[test]
    fn test_source() {
        use std::error::Error;
        let err: ExecutorError = StorageError::IndexNotFound("k".into()).into();
        assert!(err.source().is_some());
        let err: ExecutorError = ConditionError::LiteralComparison.into();
        assert!(err.source().is_none());
    }
}
