//! Rendering of resolved plans into SQL text plus the ordered parameter
//! list matching the emitted placeholders.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::config::SqlDialectKind;
use crate::hql_parser::ast::Quantifier;
use crate::query_resolver::{
    ColumnRef, JoinKind, LiteralValue, ParameterBinding, ResolvedDelete, ResolvedExpr,
    ResolvedInList, ResolvedJoin, ResolvedPlan, ResolvedQuery, ResolvedStatement, ResolvedUpdate,
    SqlOperator, TableSource,
};

use super::dialect::{dialect_for, Dialect};
use super::errors::SqlGeneratorError;
use super::function_registry::get_function_mapping;

/// Final translation product: SQL text and its parameters in placeholder
/// order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlStatement {
    pub sql: String,
    /// One entry per placeholder, in emission order. A named parameter
    /// used twice appears twice.
    pub parameters: Vec<ParameterBinding>,
}

pub fn generate(
    plan: &ResolvedPlan,
    dialect: SqlDialectKind,
) -> Result<SqlStatement, SqlGeneratorError> {
    static NO_OVERRIDES: OnceLock<HashMap<String, String>> = OnceLock::new();
    generate_with(
        plan,
        dialect,
        NO_OVERRIDES.get_or_init(HashMap::new),
    )
}

/// Like [`generate`], with per-deployment function renames consulted before
/// the built-in registry.
pub fn generate_with(
    plan: &ResolvedPlan,
    dialect: SqlDialectKind,
    function_overrides: &HashMap<String, String>,
) -> Result<SqlStatement, SqlGeneratorError> {
    let mut writer = SqlWriter {
        dialect: dialect_for(dialect),
        kind: dialect,
        plan_params: &plan.parameters,
        ordered: Vec::new(),
        rename: None,
        function_overrides,
    };
    let sql = match &plan.statement {
        ResolvedStatement::Select(query) => writer.render_query(query, true)?,
        ResolvedStatement::Update(update) => writer.render_update(update)?,
        ResolvedStatement::Delete(delete) => writer.render_delete(delete)?,
    };
    Ok(SqlStatement {
        sql,
        parameters: writer.ordered,
    })
}

struct SqlWriter<'a> {
    dialect: &'static dyn Dialect,
    kind: SqlDialectKind,
    plan_params: &'a [ParameterBinding],
    /// Parameters in placeholder emission order.
    ordered: Vec<ParameterBinding>,
    /// Bulk statements render alias-free; references through the statement
    /// alias requalify to the table name.
    rename: Option<(String, String)>,
    function_overrides: &'a HashMap<String, String>,
}

impl<'a> SqlWriter<'a> {
    fn render_query(
        &mut self,
        query: &ResolvedQuery,
        alias_columns: bool,
    ) -> Result<String, SqlGeneratorError> {
        if query.select.is_empty() {
            return Err(SqlGeneratorError::EmptySelect);
        }

        let mut sql = String::from("select ");
        if query.distinct {
            sql.push_str("distinct ");
        }
        for (i, col) in query.select.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&self.render_expr(&col.expr)?);
            match (&col.alias, alias_columns) {
                (Some(alias), _) => {
                    sql.push_str(" as ");
                    sql.push_str(alias);
                }
                (None, true) => {
                    sql.push_str(&format!(" as c{}", i));
                }
                (None, false) => {}
            }
        }

        sql.push_str(" from ");
        for (i, from) in query.from.iter().enumerate() {
            if i > 0 {
                sql.push_str(" cross join ");
            }
            sql.push_str(&self.render_source(&from.source)?);
            sql.push(' ');
            sql.push_str(&from.alias);
        }

        for join in &query.joins {
            sql.push_str(&self.render_join(join)?);
        }

        if let Some(predicate) = &query.predicate {
            sql.push_str(" where ");
            sql.push_str(&self.render_expr(predicate)?);
        }

        if !query.group_by.is_empty() {
            sql.push_str(" group by ");
            for (i, expr) in query.group_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&self.render_expr(expr)?);
            }
        }
        if let Some(having) = &query.having {
            sql.push_str(" having ");
            sql.push_str(&self.render_expr(having)?);
        }

        if !query.order_by.is_empty() {
            sql.push_str(" order by ");
            for (i, (expr, descending)) in query.order_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&self.render_expr(expr)?);
                if *descending {
                    sql.push_str(" desc");
                }
            }
        }

        Ok(sql)
    }

    fn render_update(&mut self, update: &ResolvedUpdate) -> Result<String, SqlGeneratorError> {
        if update.assignments.is_empty() {
            return Err(SqlGeneratorError::EmptyAssignments);
        }
        self.rename = Some((update.alias.clone(), update.table.clone()));

        let mut sql = format!("update {} set ", update.table);
        for (i, (column, value)) in update.assignments.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column);
            sql.push_str(" = ");
            sql.push_str(&self.render_expr(value)?);
        }
        if let Some(predicate) = &update.predicate {
            sql.push_str(" where ");
            sql.push_str(&self.render_expr(predicate)?);
        }
        Ok(sql)
    }

    fn render_delete(&mut self, delete: &ResolvedDelete) -> Result<String, SqlGeneratorError> {
        self.rename = Some((delete.alias.clone(), delete.table.clone()));

        let mut sql = format!("delete from {}", delete.table);
        if let Some(predicate) = &delete.predicate {
            sql.push_str(" where ");
            sql.push_str(&self.render_expr(predicate)?);
        }
        Ok(sql)
    }

    fn render_source(&mut self, source: &TableSource) -> Result<String, SqlGeneratorError> {
        match source {
            TableSource::Table(table) => Ok(table.clone()),
            TableSource::UnionAll { branches } => {
                // Polymorphic table-per-class scan: every concrete table
                // projects the same columns.
                let mut parts = Vec::with_capacity(branches.len());
                for branch in branches {
                    parts.push(format!(
                        "select {} from {}",
                        branch.columns.join(", "),
                        branch.table
                    ));
                }
                Ok(format!("( {} )", parts.join(" union all ")))
            }
        }
    }

    fn render_join(&mut self, join: &ResolvedJoin) -> Result<String, SqlGeneratorError> {
        let keyword = match join.kind {
            JoinKind::Inner => "join",
            JoinKind::Left => "left outer join",
        };
        let mut sql = format!(
            " {} {} {} on {}",
            keyword,
            self.render_source(&join.source)?,
            join.alias,
            self.render_expr(&join.on)?
        );
        if let Some(with) = &join.with {
            sql.push_str(" and ");
            sql.push_str(&self.render_operand(with, precedence(SqlOperator::And))?);
        }
        Ok(sql)
    }

    fn render_expr(&mut self, expr: &ResolvedExpr) -> Result<String, SqlGeneratorError> {
        match expr {
            ResolvedExpr::Column(col) => Ok(self.render_column(col)),
            ResolvedExpr::Composite { columns, .. } => {
                let parts: Vec<String> =
                    columns.iter().map(|c| self.render_column(c)).collect();
                if parts.len() == 1 {
                    Ok(parts.into_iter().next().unwrap())
                } else {
                    Ok(format!("({})", parts.join(", ")))
                }
            }
            ResolvedExpr::Literal(lit) => Ok(self.render_literal(lit)),
            ResolvedExpr::Parameter(idx) => {
                let binding = self
                    .plan_params
                    .get(*idx)
                    .ok_or(SqlGeneratorError::ParameterOutOfRange(*idx))?;
                self.ordered.push(binding.clone());
                Ok(self.dialect.placeholder(self.ordered.len()))
            }
            ResolvedExpr::Op { operator, operands } => self.render_op(*operator, operands),
            ResolvedExpr::Function {
                name,
                distinct,
                args,
            } => self.render_function(name, *distinct, args),
            ResolvedExpr::Case {
                operand,
                when_then,
                else_expr,
            } => {
                let mut sql = String::from("case");
                if let Some(op) = operand {
                    sql.push(' ');
                    sql.push_str(&self.render_expr(op)?);
                }
                for (when, then) in when_then {
                    sql.push_str(" when ");
                    sql.push_str(&self.render_expr(when)?);
                    sql.push_str(" then ");
                    sql.push_str(&self.render_expr(then)?);
                }
                if let Some(else_expr) = else_expr {
                    sql.push_str(" else ");
                    sql.push_str(&self.render_expr(else_expr)?);
                }
                sql.push_str(" end");
                Ok(sql)
            }
            ResolvedExpr::Cast { expr, target } => {
                let type_name = self.dialect.cast_type_name(*target).ok_or_else(|| {
                    SqlGeneratorError::UnsupportedCast {
                        target: format!("{:?}", target),
                        dialect: self.kind.to_string(),
                    }
                })?;
                Ok(format!("cast({} as {})", self.render_expr(expr)?, type_name))
            }
            ResolvedExpr::In {
                negated,
                expr,
                list,
            } => {
                let value = self.render_operand(expr, precedence(SqlOperator::Eq))?;
                let not = if *negated { " not" } else { "" };
                let list = match list {
                    ResolvedInList::Items(items) => {
                        let rendered: Result<Vec<String>, _> =
                            items.iter().map(|i| self.render_expr(i)).collect();
                        rendered?.join(", ")
                    }
                    ResolvedInList::Subquery(sub) => self.render_query(sub, false)?,
                };
                Ok(format!("{}{} in ({})", value, not, list))
            }
            ResolvedExpr::Exists { negated, subquery } => {
                let not = if *negated { "not " } else { "" };
                Ok(format!(
                    "{}exists ({})",
                    not,
                    self.render_query(subquery, false)?
                ))
            }
            ResolvedExpr::Quantified {
                quantifier,
                subquery,
            } => {
                let word = match quantifier {
                    Quantifier::All => "all",
                    Quantifier::Any => "any",
                    Quantifier::Some => "some",
                };
                Ok(format!("{} ({})", word, self.render_query(subquery, false)?))
            }
            ResolvedExpr::Subquery(sub) => Ok(format!("({})", self.render_query(sub, false)?)),
            ResolvedExpr::Star => Ok("*".to_string()),
        }
    }

    fn render_column(&self, col: &ColumnRef) -> String {
        if col.alias.is_empty() {
            return col.column.clone();
        }
        let alias = match &self.rename {
            Some((from, to)) if *from == col.alias => to,
            _ => &col.alias,
        };
        format!("{}.{}", alias, col.column)
    }

    fn render_literal(&self, lit: &LiteralValue) -> String {
        match lit {
            LiteralValue::String(s) => format!("'{}'", s.replace('\'', "''")),
            LiteralValue::Integer(i) => i.to_string(),
            LiteralValue::Float(x) => x.to_string(),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Null => "null".to_string(),
        }
    }

    fn render_op(
        &mut self,
        operator: SqlOperator,
        operands: &[ResolvedExpr],
    ) -> Result<String, SqlGeneratorError> {
        let prec = precedence(operator);
        match operator {
            SqlOperator::Not => Ok(format!(
                "not ({})",
                self.render_expr(&operands[0])?
            )),
            SqlOperator::Neg => Ok(format!("-{}", self.render_operand(&operands[0], prec)?)),
            SqlOperator::IsNull => Ok(format!(
                "{} is null",
                self.render_operand(&operands[0], prec)?
            )),
            SqlOperator::IsNotNull => Ok(format!(
                "{} is not null",
                self.render_operand(&operands[0], prec)?
            )),
            SqlOperator::Concat => {
                let parts: Result<Vec<String>, _> = operands
                    .iter()
                    .map(|o| self.render_operand(o, prec))
                    .collect();
                Ok(self.dialect.concat(&parts?))
            }
            _ => {
                let symbol = operator_symbol(operator);
                // Subtraction, division, and modulo are left-associative
                // only; a nested right operand at the same precedence needs
                // its parentheses back.
                let right_prec = match operator {
                    SqlOperator::Sub | SqlOperator::Div | SqlOperator::Mod => prec + 1,
                    _ => prec,
                };
                let mut parts = Vec::with_capacity(operands.len());
                for (i, operand) in operands.iter().enumerate() {
                    let min = if i == 0 { prec } else { right_prec };
                    parts.push(self.render_operand(operand, min)?);
                }
                Ok(parts.join(&format!(" {} ", symbol)))
            }
        }
    }

    /// Renders one operand, parenthesizing when it binds looser than its
    /// surrounding operator.
    fn render_operand(
        &mut self,
        expr: &ResolvedExpr,
        min_prec: u8,
    ) -> Result<String, SqlGeneratorError> {
        let needs_parens = match expr {
            ResolvedExpr::Op { operator, .. } => precedence(*operator) < min_prec,
            ResolvedExpr::Case { .. } => true,
            _ => false,
        };
        let rendered = self.render_expr(expr)?;
        if needs_parens {
            Ok(format!("({})", rendered))
        } else {
            Ok(rendered)
        }
    }

    fn render_function(
        &mut self,
        name: &str,
        distinct: bool,
        args: &[ResolvedExpr],
    ) -> Result<String, SqlGeneratorError> {
        let rendered: Result<Vec<String>, _> = args.iter().map(|a| self.render_expr(a)).collect();
        let mut rendered = rendered?;

        if let Some(sql_name) = self.function_overrides.get(&name.to_lowercase()) {
            let distinct_kw = if distinct { "distinct " } else { "" };
            return Ok(format!("{}({}{})", sql_name, distinct_kw, rendered.join(", ")));
        }

        let mapping = get_function_mapping(self.kind, name).ok_or_else(|| {
            SqlGeneratorError::FunctionNotRegistered {
                name: name.to_string(),
                dialect: self.kind.to_string(),
            }
        })?;
        if rendered.len() < mapping.min_args {
            return Err(SqlGeneratorError::FunctionArity {
                name: name.to_string(),
                min: mapping.min_args,
                actual: rendered.len(),
            });
        }
        if let Some(transform) = mapping.arg_transform {
            rendered = transform(&rendered);
        }
        if mapping.no_parens {
            // Pseudo-functions (current_date) and operator rewrites
            // (bitand on mysql) render without a call form.
            return Ok(format!("{}{}", mapping.sql_name, rendered.join(", ")));
        }
        let distinct_kw = if distinct { "distinct " } else { "" };
        Ok(format!(
            "{}({}{})",
            mapping.sql_name,
            distinct_kw,
            rendered.join(", ")
        ))
    }
}

fn operator_symbol(operator: SqlOperator) -> &'static str {
    match operator {
        SqlOperator::Or => "or",
        SqlOperator::And => "and",
        SqlOperator::Eq => "=",
        SqlOperator::Ne => "<>",
        SqlOperator::Lt => "<",
        SqlOperator::Le => "<=",
        SqlOperator::Gt => ">",
        SqlOperator::Ge => ">=",
        SqlOperator::Add => "+",
        SqlOperator::Sub => "-",
        SqlOperator::Mul => "*",
        SqlOperator::Div => "/",
        SqlOperator::Mod => "%",
        SqlOperator::Like => "like",
        SqlOperator::NotLike => "not like",
        SqlOperator::Not
        | SqlOperator::Neg
        | SqlOperator::Concat
        | SqlOperator::IsNull
        | SqlOperator::IsNotNull => unreachable!("rendered with dedicated forms"),
    }
}

fn precedence(operator: SqlOperator) -> u8 {
    match operator {
        SqlOperator::Or => 1,
        SqlOperator::And => 2,
        SqlOperator::Not => 3,
        SqlOperator::Eq
        | SqlOperator::Ne
        | SqlOperator::Lt
        | SqlOperator::Le
        | SqlOperator::Gt
        | SqlOperator::Ge
        | SqlOperator::Like
        | SqlOperator::NotLike
        | SqlOperator::IsNull
        | SqlOperator::IsNotNull => 4,
        SqlOperator::Add | SqlOperator::Sub | SqlOperator::Concat => 5,
        SqlOperator::Mul | SqlOperator::Div | SqlOperator::Mod => 6,
        SqlOperator::Neg => 7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ResultShape;
    use crate::query_resolver::{FromTable, ParamLabel, SelectColumn};

    fn column(alias: &str, name: &str) -> ResolvedExpr {
        ResolvedExpr::Column(ColumnRef {
            alias: alias.to_string(),
            column: name.to_string(),
            sql_type: None,
            nullable: false,
        })
    }

    fn simple_query(predicate: Option<ResolvedExpr>) -> ResolvedQuery {
        ResolvedQuery {
            distinct: false,
            select: vec![SelectColumn {
                expr: column("a", "name"),
                alias: None,
            }],
            from: vec![FromTable {
                source: TableSource::Table("animal".to_string()),
                alias: "a".to_string(),
            }],
            joins: vec![],
            predicate,
            group_by: vec![],
            having: None,
            order_by: vec![],
            result_shape: ResultShape::Scalar,
        }
    }

    fn named_param(name: &str) -> ParameterBinding {
        ParameterBinding {
            label: ParamLabel::Named(name.to_string()),
            sql_type: None,
            source: format!(":{}", name),
        }
    }

    #[test]
    fn renders_simple_select() {
        let plan = ResolvedPlan {
            statement: ResolvedStatement::Select(simple_query(None)),
            parameters: vec![],
        };
        let stmt = generate(&plan, SqlDialectKind::Generic).unwrap();
        assert_eq!(stmt.sql, "select a.name as c0 from animal a");
        assert!(stmt.parameters.is_empty());
    }

    #[test]
    fn parameters_follow_placeholder_order() {
        let predicate = ResolvedExpr::Op {
            operator: SqlOperator::And,
            operands: vec![
                ResolvedExpr::Op {
                    operator: SqlOperator::Eq,
                    operands: vec![column("a", "name"), ResolvedExpr::Parameter(1)],
                },
                ResolvedExpr::Op {
                    operator: SqlOperator::Gt,
                    operands: vec![column("a", "weight"), ResolvedExpr::Parameter(0)],
                },
            ],
        };
        let plan = ResolvedPlan {
            statement: ResolvedStatement::Select(simple_query(Some(predicate))),
            parameters: vec![named_param("w"), named_param("n")],
        };
        let stmt = generate(&plan, SqlDialectKind::Postgres).unwrap();
        assert!(stmt.sql.contains("a.name = $1"));
        assert!(stmt.sql.contains("a.weight > $2"));
        // Emission order, not declaration order.
        assert_eq!(stmt.parameters[0].source, ":n");
        assert_eq!(stmt.parameters[1].source, ":w");
    }

    #[test]
    fn or_inside_and_is_parenthesized() {
        let predicate = ResolvedExpr::Op {
            operator: SqlOperator::And,
            operands: vec![
                ResolvedExpr::Op {
                    operator: SqlOperator::Or,
                    operands: vec![
                        ResolvedExpr::Op {
                            operator: SqlOperator::Eq,
                            operands: vec![
                                column("a", "x"),
                                ResolvedExpr::Literal(LiteralValue::Integer(1)),
                            ],
                        },
                        ResolvedExpr::Op {
                            operator: SqlOperator::Eq,
                            operands: vec![
                                column("a", "y"),
                                ResolvedExpr::Literal(LiteralValue::Integer(2)),
                            ],
                        },
                    ],
                },
                ResolvedExpr::Op {
                    operator: SqlOperator::IsNull,
                    operands: vec![column("a", "z")],
                },
            ],
        };
        let plan = ResolvedPlan {
            statement: ResolvedStatement::Select(simple_query(Some(predicate))),
            parameters: vec![],
        };
        let stmt = generate(&plan, SqlDialectKind::Generic).unwrap();
        assert!(stmt
            .sql
            .contains("where (a.x = 1 or a.y = 2) and a.z is null"));
    }

    #[test]
    fn update_renders_alias_free_with_requalified_where() {
        let plan = ResolvedPlan {
            statement: ResolvedStatement::Update(ResolvedUpdate {
                entity: "Animal".to_string(),
                table: "animal".to_string(),
                alias: "a".to_string(),
                assignments: vec![(
                    "description".to_string(),
                    ResolvedExpr::Parameter(0),
                )],
                predicate: Some(ResolvedExpr::Op {
                    operator: SqlOperator::Eq,
                    operands: vec![column("a", "id"), ResolvedExpr::Parameter(1)],
                }),
            }),
            parameters: vec![named_param("d"), named_param("id")],
        };
        let stmt = generate(&plan, SqlDialectKind::Generic).unwrap();
        assert_eq!(
            stmt.sql,
            "update animal set description = ? where animal.id = ?"
        );
    }

    #[test]
    fn string_literals_escape_quotes() {
        let predicate = ResolvedExpr::Op {
            operator: SqlOperator::Eq,
            operands: vec![
                column("a", "name"),
                ResolvedExpr::Literal(LiteralValue::String("O'Brien".to_string())),
            ],
        };
        let plan = ResolvedPlan {
            statement: ResolvedStatement::Select(simple_query(Some(predicate))),
            parameters: vec![],
        };
        let stmt = generate(&plan, SqlDialectKind::Generic).unwrap();
        assert!(stmt.sql.contains("'O''Brien'"));
    }
}
