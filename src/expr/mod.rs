//! Predicate expressions for table scans.
//!
//! An [`Expr`] is a small tree of comparisons and boolean connectives
//! over record attributes and literal values. Scans evaluate the tree
//! against each candidate record and accept it iff the result is
//! `Value::Bool(true)`.

use std::cmp::Ordering;

use crate::catalog::Schema;
use crate::error::{HeapDbError, Result};
use crate::types::{Record, Value};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CmpOp {
    fn matches(self, ordering: Ordering) -> bool {
        match self {
            CmpOp::Eq => ordering == Ordering::Equal,
            CmpOp::Neq => ordering != Ordering::Equal,
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Lte => ordering != Ordering::Greater,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Gte => ordering != Ordering::Less,
        }
    }
}

/// A predicate expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Literal(Value),
    /// A record attribute, by schema index.
    Attr(usize),
    /// A comparison between two sub-expressions.
    Cmp {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Boolean negation.
    Not(Box<Expr>),
    /// Boolean conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Boolean disjunction.
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Convenience constructor for an attribute reference.
    #[must_use]
    pub fn attr(index: usize) -> Self {
        Expr::Attr(index)
    }

    /// Convenience constructor for a literal.
    #[must_use]
    pub fn literal(value: Value) -> Self {
        Expr::Literal(value)
    }

    /// Convenience constructor for a comparison.
    #[must_use]
    pub fn cmp(op: CmpOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Cmp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Convenience constructor for a negation.
    #[must_use]
    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    /// Evaluates the expression against a record.
    ///
    /// # Errors
    ///
    /// Returns an error if an attribute index is out of range, a
    /// comparison mixes types, or a boolean connective receives a
    /// non-boolean operand.
    pub fn eval(&self, record: &Record, schema: &Schema) -> Result<Value> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Attr(index) => record.get_attr(schema, *index),
            Expr::Cmp { op, lhs, rhs } => {
                let left = lhs.eval(record, schema)?;
                let right = rhs.eval(record, schema)?;
                let ordering = left.compare(&right).ok_or_else(|| {
                    HeapDbError::ExpressionError(format!(
                        "Cannot compare {} with {}",
                        left.data_type().name(),
                        right.data_type().name()
                    ))
                })?;
                Ok(Value::Bool(op.matches(ordering)))
            }
            Expr::Not(inner) => {
                let value = inner.eval(record, schema)?;
                match value {
                    Value::Bool(b) => Ok(Value::Bool(!b)),
                    other => Err(HeapDbError::ExpressionError(format!(
                        "NOT expects a boolean, got {}",
                        other.data_type().name()
                    ))),
                }
            }
            Expr::And(lhs, rhs) => {
                let (a, b) = Self::eval_bool_pair(lhs, rhs, record, schema, "AND")?;
                Ok(Value::Bool(a && b))
            }
            Expr::Or(lhs, rhs) => {
                let (a, b) = Self::eval_bool_pair(lhs, rhs, record, schema, "OR")?;
                Ok(Value::Bool(a || b))
            }
        }
    }

    fn eval_bool_pair(
        lhs: &Expr,
        rhs: &Expr,
        record: &Record,
        schema: &Schema,
        op: &str,
    ) -> Result<(bool, bool)> {
        let left = lhs.eval(record, schema)?;
        let right = rhs.eval(record, schema)?;
        match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => Ok((a, b)),
            (l, r) => Err(HeapDbError::ExpressionError(format!(
                "{op} expects booleans, got {} and {}",
                l.data_type().name(),
                r.data_type().name()
            ))),
        }
    }

    /// Evaluates the expression as a scan predicate: true iff the result
    /// is a boolean with value true.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors.
    pub fn accepts(&self, record: &Record, schema: &Schema) -> Result<bool> {
        Ok(self.eval(record, schema)? == Value::Bool(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Attribute;
    use crate::types::DataType;

    fn schema() -> Schema {
        Schema::new(
            vec![
                Attribute::new("id", DataType::Int, 0),
                Attribute::new("name", DataType::String, 6),
                Attribute::new("salary", DataType::Float, 0),
            ],
            vec![0],
        )
        .unwrap()
    }

    fn record(id: i32, name: &str, salary: f32) -> Record {
        let schema = schema();
        let mut r = Record::new(&schema);
        r.set_attr(&schema, 0, &Value::Int(id)).unwrap();
        r.set_attr(&schema, 1, &Value::String(name.into())).unwrap();
        r.set_attr(&schema, 2, &Value::Float(salary)).unwrap();
        r
    }

    #[test]
    fn test_cmp_eq_attr_literal() {
        let schema = schema();
        let r = record(7, "joe", 500.0);
        let expr = Expr::cmp(CmpOp::Eq, Expr::attr(0), Expr::literal(Value::Int(7)));
        assert!(expr.accepts(&r, &schema).unwrap());

        let expr = Expr::cmp(CmpOp::Eq, Expr::attr(0), Expr::literal(Value::Int(8)));
        assert!(!expr.accepts(&r, &schema).unwrap());
    }

    #[test]
    fn test_not_lt_predicate() {
        let schema = schema();
        let expr = Expr::not(Expr::cmp(
            CmpOp::Lt,
            Expr::attr(2),
            Expr::literal(Value::Float(800.0)),
        ));

        assert!(expr.accepts(&record(1, "a", 900.0), &schema).unwrap());
        assert!(expr.accepts(&record(2, "b", 800.0), &schema).unwrap());
        assert!(!expr.accepts(&record(3, "c", 799.0), &schema).unwrap());
    }

    #[test]
    fn test_and_or() {
        let schema = schema();
        let r = record(5, "eve", 650.0);
        let id_is_5 = Expr::cmp(CmpOp::Eq, Expr::attr(0), Expr::literal(Value::Int(5)));
        let rich = Expr::cmp(CmpOp::Gte, Expr::attr(2), Expr::literal(Value::Float(800.0)));

        let both = Expr::And(Box::new(id_is_5.clone()), Box::new(rich.clone()));
        assert!(!both.accepts(&r, &schema).unwrap());

        let either = Expr::Or(Box::new(id_is_5), Box::new(rich));
        assert!(either.accepts(&r, &schema).unwrap());
    }

    #[test]
    fn test_type_mismatch_is_error() {
        let schema = schema();
        let r = record(1, "x", 1.0);
        let expr = Expr::cmp(CmpOp::Eq, Expr::attr(0), Expr::literal(Value::Float(1.0)));
        assert!(expr.eval(&r, &schema).is_err());
    }

    #[test]
    fn test_not_of_non_bool_is_error() {
        let schema = schema();
        let r = record(1, "x", 1.0);
        let expr = Expr::not(Expr::attr(0));
        assert!(expr.eval(&r, &schema).is_err());
    }

    #[test]
    fn test_string_comparison() {
        let schema = schema();
        let r = record(1, "bob", 1.0);
        let expr = Expr::cmp(
            CmpOp::Gt,
            Expr::attr(1),
            Expr::literal(Value::String("alice".into())),
        );
        assert!(expr.accepts(&r, &schema).unwrap());
    }
}
