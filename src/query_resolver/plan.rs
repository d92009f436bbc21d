//! Resolved query plan: the AST annotated with schema bindings, the
//! deduplicated join set, and the ordered parameter list. Owned types only;
//! the plan outlives the borrowed parser AST.

use serde::Serialize;

use crate::entity_catalog::SqlType;
use crate::execution::ResultShape;
use crate::hql_parser::ast::{Operator, Quantifier};

/// One bound parameter, in placeholder order. `sql_type` is the inferred
/// expected type; `source` preserves the query-text form for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterBinding {
    pub label: ParamLabel,
    pub sql_type: Option<SqlType>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamLabel {
    Named(String),
    /// Explicit position (`?1`) or occurrence-ordered (`?`).
    Positional(Option<u32>),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlOperator {
    Or,
    And,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Neg,
    IsNull,
    IsNotNull,
    Like,
    NotLike,
}

impl From<Operator> for SqlOperator {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Or => SqlOperator::Or,
            Operator::And => SqlOperator::And,
            Operator::Not => SqlOperator::Not,
            Operator::Equal => SqlOperator::Eq,
            Operator::NotEqual => SqlOperator::Ne,
            Operator::LessThan => SqlOperator::Lt,
            Operator::LessThanEqual => SqlOperator::Le,
            Operator::GreaterThan => SqlOperator::Gt,
            Operator::GreaterThanEqual => SqlOperator::Ge,
            Operator::Addition => SqlOperator::Add,
            Operator::Subtraction => SqlOperator::Sub,
            Operator::Multiplication => SqlOperator::Mul,
            Operator::Division => SqlOperator::Div,
            Operator::Modulo => SqlOperator::Mod,
            Operator::Concat => SqlOperator::Concat,
            Operator::Negate => SqlOperator::Neg,
            Operator::IsNull => SqlOperator::IsNull,
            Operator::IsNotNull => SqlOperator::IsNotNull,
            Operator::Like => SqlOperator::Like,
            Operator::NotLike => SqlOperator::NotLike,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl LiteralValue {
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            LiteralValue::String(_) => Some(SqlType::String),
            LiteralValue::Integer(_) => Some(SqlType::Long),
            LiteralValue::Float(_) => Some(SqlType::Double),
            LiteralValue::Boolean(_) => Some(SqlType::Boolean),
            LiteralValue::Null => None,
        }
    }
}

/// A physical column reference through a query alias.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub alias: String,
    pub column: String,
    pub sql_type: Option<SqlType>,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedExpr {
    Column(ColumnRef),
    /// Multi-column value: embedded property, composite identifier, or a
    /// whole-entity reference (identifier columns). Decomposed in declared
    /// order by the generator.
    Composite {
        alias: String,
        columns: Vec<ColumnRef>,
    },
    Literal(LiteralValue),
    /// Index into the plan's parameter list.
    Parameter(usize),
    Op {
        operator: SqlOperator,
        operands: Vec<ResolvedExpr>,
    },
    Function {
        name: String,
        distinct: bool,
        args: Vec<ResolvedExpr>,
    },
    Case {
        operand: Option<Box<ResolvedExpr>>,
        when_then: Vec<(ResolvedExpr, ResolvedExpr)>,
        else_expr: Option<Box<ResolvedExpr>>,
    },
    Cast {
        expr: Box<ResolvedExpr>,
        target: SqlType,
    },
    In {
        negated: bool,
        expr: Box<ResolvedExpr>,
        list: ResolvedInList,
    },
    Exists {
        negated: bool,
        subquery: Box<ResolvedQuery>,
    },
    Quantified {
        quantifier: Quantifier,
        subquery: Box<ResolvedQuery>,
    },
    Subquery(Box<ResolvedQuery>),
    Star,
}

impl ResolvedExpr {
    /// Static type anchor used by parameter inference. `None` means the
    /// expression cannot anchor an untyped parameter.
    pub fn type_anchor(&self, params: &[ParameterBinding]) -> Option<SqlType> {
        match self {
            ResolvedExpr::Column(c) => c.sql_type,
            ResolvedExpr::Composite { .. } => None,
            ResolvedExpr::Literal(l) => l.sql_type(),
            ResolvedExpr::Parameter(i) => params.get(*i).and_then(|p| p.sql_type),
            ResolvedExpr::Cast { target, .. } => Some(*target),
            ResolvedExpr::Case {
                when_then,
                else_expr,
                ..
            } => when_then
                .iter()
                .find_map(|(_, then)| then.type_anchor(params))
                .or_else(|| else_expr.as_ref().and_then(|e| e.type_anchor(params))),
            ResolvedExpr::Op { operator, operands } => match operator {
                SqlOperator::Concat => Some(SqlType::String),
                SqlOperator::Add
                | SqlOperator::Sub
                | SqlOperator::Mul
                | SqlOperator::Div
                | SqlOperator::Mod
                | SqlOperator::Neg => operands.iter().find_map(|o| o.type_anchor(params)),
                _ => Some(SqlType::Boolean),
            },
            ResolvedExpr::Function { name, .. } => match name.as_str() {
                "count" => Some(SqlType::Long),
                "upper" | "lower" | "concat" | "substring" | "trim" => Some(SqlType::String),
                "length" | "locate" | "size" | "bitand" | "bitor" => Some(SqlType::Long),
                "abs" | "sqrt" | "mod" => None,
                _ => None,
            },
            _ => None,
        }
    }

    /// Bare untyped parameters reachable without crossing a cast (a cast
    /// fixes the type, anchoring everything beneath it).
    pub fn untyped_params(&self, params: &[ParameterBinding], out: &mut Vec<usize>) {
        match self {
            ResolvedExpr::Parameter(i) => {
                if params.get(*i).map(|p| p.sql_type.is_none()).unwrap_or(false) {
                    out.push(*i);
                }
            }
            ResolvedExpr::Op { operands, .. } => {
                for op in operands {
                    op.untyped_params(params, out);
                }
            }
            ResolvedExpr::Cast { .. } => {}
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedInList {
    Items(Vec<ResolvedExpr>),
    Subquery(Box<ResolvedQuery>),
}

/// A from-clause source: a plain table or, for polymorphic table-per-class
/// roots, a union-all over the concrete subclass tables.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Table(String),
    UnionAll { branches: Vec<UnionBranch> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionBranch {
    pub entity: String,
    pub table: String,
    /// Shared columns, projected identically by every branch.
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// Joins are kept in dependency order: an on-condition references only
/// aliases introduced earlier.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJoin {
    pub kind: JoinKind,
    pub source: TableSource,
    pub alias: String,
    pub on: ResolvedExpr,
    /// Extra user restriction from a `with` clause; ANDed into the
    /// on-condition at generation time.
    pub with: Option<ResolvedExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromTable {
    pub source: TableSource,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expr: ResolvedExpr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub distinct: bool,
    pub select: Vec<SelectColumn>,
    pub from: Vec<FromTable>,
    pub joins: Vec<ResolvedJoin>,
    pub predicate: Option<ResolvedExpr>,
    pub group_by: Vec<ResolvedExpr>,
    pub having: Option<ResolvedExpr>,
    pub order_by: Vec<(ResolvedExpr, bool)>,
    pub result_shape: ResultShape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedUpdate {
    pub entity: String,
    pub table: String,
    /// Alias used during resolution; the generator renders the statement
    /// alias-free and requalifies references through this name.
    pub alias: String,
    pub assignments: Vec<(String, ResolvedExpr)>,
    pub predicate: Option<ResolvedExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDelete {
    pub entity: String,
    pub table: String,
    /// Synthetic when the statement had no explicit alias; correlated
    /// subqueries still bind through it.
    pub alias: String,
    pub predicate: Option<ResolvedExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStatement {
    Select(ResolvedQuery),
    Update(ResolvedUpdate),
    Delete(ResolvedDelete),
}

/// The full resolution result handed to the SQL generator.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlan {
    pub statement: ResolvedStatement,
    pub parameters: Vec<ParameterBinding>,
}
