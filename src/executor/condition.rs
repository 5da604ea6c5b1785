//! Predicates over named attributes.
//!
//! A [`Condition`] is built once per operator and bound against the input
//! schema(s) at construction. Binding resolves attribute names to positions
//! and checks operand types; a failed binding is kept and reported as
//! [`ExecutorError::BadCondition`](super::ExecutorError::BadCondition) when
//! the operator is pulled.

use std::fmt;

use crate::datum::{Attribute, Type, Value, position_of};

use super::compare::CompOp;
use super::error::ConditionError;

/// Right-hand side of a [`Condition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Another attribute, by name.
    Attribute(String),
    /// A constant value.
    Literal(Value),
}

/// A comparison `lhs_attr op rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Left-hand attribute name.
    pub lhs_attr: String,
    /// Comparison operator.
    pub op: CompOp,
    /// Right-hand operand.
    pub rhs: Operand,
}

impl Condition {
    /// Creates `lhs_attr op value`.
    pub fn with_literal(lhs_attr: impl Into<String>, op: CompOp, value: Value) -> Self {
        Self {
            lhs_attr: lhs_attr.into(),
            op,
            rhs: Operand::Literal(value),
        }
    }

    /// Creates `lhs_attr op rhs_attr`.
    pub fn with_attribute(
        lhs_attr: impl Into<String>,
        op: CompOp,
        rhs_attr: impl Into<String>,
    ) -> Self {
        Self {
            lhs_attr: lhs_attr.into(),
            op,
            rhs: Operand::Attribute(rhs_attr.into()),
        }
    }

    /// Resolves a literal predicate against `schema`.
    pub(crate) fn bind_literal(
        &self,
        schema: &[Attribute],
    ) -> Result<LiteralBinding, ConditionError> {
        let Operand::Literal(value) = &self.rhs else {
            return Err(ConditionError::AttributeComparison);
        };
        let (position, ty) = resolve(schema, &self.lhs_attr)?;
        check_types(&self.lhs_attr, ty, value.data_type())?;
        Ok(LiteralBinding {
            position,
            ty,
            op: self.op,
            literal: value.to_bytes(),
        })
    }

    /// Resolves an equi-join predicate: `lhs_attr` against the outer schema
    /// and the right-hand attribute against the inner schema.
    pub(crate) fn bind_join(
        &self,
        outer: &[Attribute],
        inner: &[Attribute],
    ) -> Result<JoinBinding, ConditionError> {
        let Operand::Attribute(rhs_attr) = &self.rhs else {
            return Err(ConditionError::LiteralComparison);
        };
        if self.op != CompOp::Eq {
            return Err(ConditionError::UnsupportedJoinOperator(self.op));
        }
        let (outer_position, ty) = resolve(outer, &self.lhs_attr)?;
        let (inner_position, inner_ty) = resolve(inner, rhs_attr)?;
        check_types(&self.lhs_attr, ty, Some(inner_ty))?;
        Ok(JoinBinding {
            outer_position,
            inner_position,
            ty,
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rhs {
            Operand::Attribute(name) => write!(f, "{} {} {}", self.lhs_attr, self.op, name),
            Operand::Literal(Value::VarChar(s)) => {
                write!(f, "{} {} '{}'", self.lhs_attr, self.op, s)
            }
            Operand::Literal(value) => write!(f, "{} {} {}", self.lhs_attr, self.op, value),
        }
    }
}

/// A literal predicate resolved against an input schema.
#[derive(Debug, Clone)]
pub(crate) struct LiteralBinding {
    pub position: usize,
    pub ty: Type,
    pub op: CompOp,
    /// Literal in tuple encoding.
    pub literal: Vec<u8>,
}

/// A join predicate resolved against the outer and inner schemas.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JoinBinding {
    pub outer_position: usize,
    pub inner_position: usize,
    pub ty: Type,
}

fn resolve(schema: &[Attribute], name: &str) -> Result<(usize, Type), ConditionError> {
    position_of(schema, name)
        .map(|position| (position, schema[position].ty))
        .ok_or_else(|| ConditionError::UnknownAttribute(name.to_string()))
}

fn check_types(
    attribute: &str,
    expected: Type,
    found: Option<Type>,
) -> Result<(), ConditionError> {
    if found == Some(expected) {
        Ok(())
    } else {
        Err(ConditionError::TypeMismatch {
            attribute: attribute.to_string(),
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<Attribute> {
        vec![
            Attribute::int("id"),
            Attribute::varchar("name", 10),
            Attribute::real("score"),
        ]
    }

    #[test]
    fn test_bind_literal() {
        let cond = Condition::with_literal("score", CompOp::Gt, Value::Real(1.5));
        let binding = cond.bind_literal(&schema()).unwrap();
        assert_eq!(binding.position, 2);
        assert_eq!(binding.ty, Type::Real);
        assert_eq!(binding.op, CompOp::Gt);
        assert_eq!(binding.literal, 1.5f32.to_le_bytes().to_vec());
    }

    #[test]
    fn test_bind_literal_errors() {
        let schema = schema();
        let attr_cmp = Condition::with_attribute("id", CompOp::Eq, "score");
        assert_eq!(
            attr_cmp.bind_literal(&schema).unwrap_err(),
            ConditionError::AttributeComparison
        );

        let missing = Condition::with_literal("nope", CompOp::Eq, Value::Int(1));
        assert_eq!(
            missing.bind_literal(&schema).unwrap_err(),
            ConditionError::UnknownAttribute("nope".into())
        );

        let mismatch = Condition::with_literal("id", CompOp::Eq, Value::Real(1.0));
        assert_eq!(
            mismatch.bind_literal(&schema).unwrap_err(),
            ConditionError::TypeMismatch {
                attribute: "id".into(),
                expected: Type::Int,
                found: Some(Type::Real),
            }
        );

        let null = Condition::with_literal("id", CompOp::Eq, Value::Null);
        assert!(matches!(
            null.bind_literal(&schema),
            Err(ConditionError::TypeMismatch { found: None, .. })
        ));
    }

    #[test]
    fn test_bind_join() {
        let outer = schema();
        let inner = vec![Attribute::int("rid"), Attribute::int("val")];
        let cond = Condition::with_attribute("id", CompOp::Eq, "rid");
        let binding = cond.bind_join(&outer, &inner).unwrap();
        assert_eq!(binding.outer_position, 0);
        assert_eq!(binding.inner_position, 0);
        assert_eq!(binding.ty, Type::Int);
    }

    #[test]
    fn test_bind_join_errors() {
        let outer = schema();
        let inner = vec![Attribute::int("rid"), Attribute::real("val")];

        let literal = Condition::with_literal("id", CompOp::Eq, Value::Int(1));
        assert_eq!(
            literal.bind_join(&outer, &inner).unwrap_err(),
            ConditionError::LiteralComparison
        );

        let lt = Condition::with_attribute("id", CompOp::Lt, "rid");
        assert_eq!(
            lt.bind_join(&outer, &inner).unwrap_err(),
            ConditionError::UnsupportedJoinOperator(CompOp::Lt)
        );

        // The right-hand attribute must come from the inner side.
        let wrong_side = Condition::with_attribute("id", CompOp::Eq, "name");
        assert_eq!(
            wrong_side.bind_join(&outer, &inner).unwrap_err(),
            ConditionError::UnknownAttribute("name".into())
        );

        let mismatch = Condition::with_attribute("id", CompOp::Eq, "val");
        assert!(matches!(
            mismatch.bind_join(&outer, &inner),
            Err(ConditionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Condition::with_literal("name", CompOp::Ne, Value::VarChar("x".into())).to_string(),
            "name <> 'x'"
        );
        assert_eq!(
            Condition::with_attribute("a", CompOp::Eq, "b").to_string(),
            "a = b"
        );
        assert_eq!(
            Condition::with_literal("a", CompOp::Le, Value::Int(3)).to_string(),
            "a <= 3"
        );
    }
}
