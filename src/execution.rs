//! Execution Adapter boundary.
//!
//! The translator ends at a [`SqlStatement`]; binding values, running the
//! statement, and mapping rows back to typed results belong to a
//! collaborator implementing [`ExecutionAdapter`]. No driver ships here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sql_generator::SqlStatement;

/// Scalar value crossing the adapter boundary in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// One result row as returned by the adapter, columns in select order.
pub type Row = Vec<Value>;

/// How the select clause shaped each result row; the adapter uses this to
/// map rows to caller-visible results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    /// Single scalar column.
    Scalar,
    /// Fixed-width tuple of scalar columns.
    Tuple { arity: usize },
    /// A full entity: identifier columns first, then mapped columns.
    Entity { entity: String },
    /// `select new C(...)`: construct `class` from `arity` column values in
    /// argument order.
    Constructor { class: String, arity: usize },
}

/// Collaborator contract: execute generated SQL with bound parameter values
/// and return rows. Retries and backoff live behind this boundary, never in
/// the translator.
pub trait ExecutionAdapter {
    type Error;

    fn execute(&self, statement: &SqlStatement, values: &[Value]) -> Result<Vec<Row>, Self::Error>;
}
