//! Expression resolution: binds paths, desugars collection predicates into
//! correlated subqueries, and infers parameter types from typed operands.

use crate::entity_catalog::{AssociationJoin, PropertyDescriptor, PropertyKind, SqlType};
use crate::hql_parser::ast::{
    CollectionFn, Expression, InList, Literal, Operator, Parameter, PathExpression,
};

use super::errors::ResolverError;
use super::path_resolver::{
    self, apply_treat, id_mapping, resolve_path, table_source_for, walk_segments, PathUsage,
    ResolvedPath,
};
use super::plan::{
    ColumnRef, FromTable, LiteralValue, ResolvedExpr, ResolvedInList, ResolvedQuery,
    SelectColumn, SqlOperator, TableSource,
};
use super::scope::{AliasBinding, Scope, ScopeChain};
use super::ResolverCtx;
use crate::execution::ResultShape;

pub(crate) fn resolve_expression(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    parent: Option<&ScopeChain<'_>>,
    expr: &Expression<'_>,
) -> Result<ResolvedExpr, ResolverError> {
    match expr {
        Expression::Path(_) | Expression::Treat { .. } => {
            let resolved = resolve_navigation(ctx, scope, parent, expr, PathUsage::Value)?;
            path_to_value(ctx, resolved)
        }
        Expression::Literal(lit) => Ok(ResolvedExpr::Literal(literal_value(lit))),
        Expression::Parameter(p) => Ok(ctx.bind_parameter(p)),
        Expression::Operator(app) => resolve_operator(ctx, scope, parent, app),
        Expression::FunctionCall(call) => {
            let args = call
                .args
                .iter()
                .map(|a| resolve_expression(ctx, scope, parent, a))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ResolvedExpr::Function {
                name: call.name.to_ascii_lowercase(),
                distinct: call.distinct,
                args,
            })
        }
        Expression::Case(case) => {
            let operand = case
                .operand
                .as_ref()
                .map(|o| resolve_expression(ctx, scope, parent, o))
                .transpose()?;
            let mut when_then = Vec::with_capacity(case.when_then.len());
            for (when, then) in &case.when_then {
                let when = resolve_expression(ctx, scope, parent, when)?;
                let then = resolve_expression(ctx, scope, parent, then)?;
                when_then.push((when, then));
            }
            let else_expr = case
                .else_expr
                .as_ref()
                .map(|e| resolve_expression(ctx, scope, parent, e))
                .transpose()?;

            // Simple case: the operand and when-values compare against each
            // other, so an untyped parameter among them needs an anchor.
            if let Some(op) = &operand {
                let mut comparands: Vec<&ResolvedExpr> = vec![op];
                comparands.extend(when_then.iter().map(|(w, _)| w));
                infer_types(ctx, &comparands, "a case operand comparison")?;
            }

            // Result branches share one type; an all-parameter result list
            // has none to share.
            let mut branches: Vec<&ResolvedExpr> =
                when_then.iter().map(|(_, t)| t).collect();
            if let Some(e) = &else_expr {
                branches.push(e);
            }
            infer_types(ctx, &branches, "a case expression result")?;

            Ok(ResolvedExpr::Case {
                operand: operand.map(Box::new),
                when_then,
                else_expr: else_expr.map(Box::new),
            })
        }
        Expression::Cast { expr, target } => {
            let inner = resolve_expression(ctx, scope, parent, expr)?;
            let sql_type = SqlType::from_type_name(target)
                .ok_or_else(|| ResolverError::UnknownCastTarget(target.to_string()))?;
            if let ResolvedExpr::Parameter(i) = inner {
                ctx.params[i].sql_type = Some(sql_type);
            }
            Ok(ResolvedExpr::Cast {
                expr: Box::new(inner),
                target: sql_type,
            })
        }
        Expression::Collection { function, path } => {
            resolve_collection_fn(ctx, scope, parent, *function, path)
        }
        Expression::MemberOf {
            negated,
            element,
            path,
        } => {
            let element = resolve_expression(ctx, scope, parent, element)?;
            let (owner_alias, owner_entity, property) =
                expect_collection(ctx, scope, parent, path)?;
            let subquery =
                collection_subquery(ctx, &owner_alias, &owner_entity, &property, Some(element))?;
            Ok(ResolvedExpr::Exists {
                negated: *negated,
                subquery: Box::new(subquery),
            })
        }
        Expression::IsEmpty { negated, path } => {
            let (owner_alias, owner_entity, property) =
                expect_collection(ctx, scope, parent, path)?;
            let subquery =
                collection_subquery(ctx, &owner_alias, &owner_entity, &property, None)?;
            // `is empty` means no rows exist.
            Ok(ResolvedExpr::Exists {
                negated: !*negated,
                subquery: Box::new(subquery),
            })
        }
        Expression::Between {
            negated,
            expr,
            low,
            high,
        } => {
            let value = resolve_expression(ctx, scope, parent, expr)?;
            let low = resolve_expression(ctx, scope, parent, low)?;
            let high = resolve_expression(ctx, scope, parent, high)?;
            infer_types(ctx, &[&value, &low, &high], "a between predicate")?;
            let range = ResolvedExpr::Op {
                operator: SqlOperator::And,
                operands: vec![
                    ResolvedExpr::Op {
                        operator: SqlOperator::Ge,
                        operands: vec![value.clone(), low],
                    },
                    ResolvedExpr::Op {
                        operator: SqlOperator::Le,
                        operands: vec![value, high],
                    },
                ],
            };
            Ok(negate_if(range, *negated))
        }
        Expression::In {
            negated,
            expr,
            list,
        } => match list {
            InList::Items(items) => {
                let value = resolve_expression(ctx, scope, parent, expr)?;
                let items = items
                    .iter()
                    .map(|i| resolve_expression(ctx, scope, parent, i))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut comparands: Vec<&ResolvedExpr> = vec![&value];
                comparands.extend(items.iter());
                infer_types(ctx, &comparands, "an in-list predicate")?;
                Ok(ResolvedExpr::In {
                    negated: *negated,
                    expr: Box::new(value),
                    list: ResolvedInList::Items(items),
                })
            }
            InList::Subquery(sub) => {
                let value = resolve_expression(ctx, scope, parent, expr)?;
                let chain = ScopeChain { parent, scope };
                let sub = super::resolve_select_query(ctx, sub, Some(&chain))?;
                Ok(ResolvedExpr::In {
                    negated: *negated,
                    expr: Box::new(value),
                    list: ResolvedInList::Subquery(Box::new(sub)),
                })
            }
            InList::Elements(path) => {
                let element = resolve_expression(ctx, scope, parent, expr)?;
                let (owner_alias, owner_entity, property) =
                    expect_collection(ctx, scope, parent, path)?;
                let subquery = collection_subquery(
                    ctx,
                    &owner_alias,
                    &owner_entity,
                    &property,
                    Some(element),
                )?;
                Ok(ResolvedExpr::Exists {
                    negated: *negated,
                    subquery: Box::new(subquery),
                })
            }
        },
        Expression::Exists { negated, subquery } => {
            let chain = ScopeChain { parent, scope };
            let sub = super::resolve_select_query(ctx, subquery, Some(&chain))?;
            Ok(ResolvedExpr::Exists {
                negated: *negated,
                subquery: Box::new(sub),
            })
        }
        Expression::Quantified {
            quantifier,
            subquery,
        } => {
            let chain = ScopeChain { parent, scope };
            let sub = super::resolve_select_query(ctx, subquery, Some(&chain))?;
            Ok(ResolvedExpr::Quantified {
                quantifier: *quantifier,
                subquery: Box::new(sub),
            })
        }
        Expression::Subquery(subquery) => {
            let chain = ScopeChain { parent, scope };
            let sub = super::resolve_select_query(ctx, subquery, Some(&chain))?;
            Ok(ResolvedExpr::Subquery(Box::new(sub)))
        }
        Expression::Star => Ok(ResolvedExpr::Star),
    }
}

fn resolve_operator(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    parent: Option<&ScopeChain<'_>>,
    app: &crate::hql_parser::ast::OperatorApplication<'_>,
) -> Result<ResolvedExpr, ResolverError> {
    match app.operator {
        Operator::IsNull | Operator::IsNotNull => {
            let operand = match &app.operands[0] {
                e @ (Expression::Path(_) | Expression::Treat { .. }) => {
                    let resolved =
                        resolve_navigation(ctx, scope, parent, e, PathUsage::NullCheck)?;
                    path_to_value(ctx, resolved)?
                }
                other => resolve_expression(ctx, scope, parent, other)?,
            };
            Ok(null_test(operand, app.operator == Operator::IsNotNull))
        }
        Operator::Equal
        | Operator::NotEqual
        | Operator::LessThan
        | Operator::LessThanEqual
        | Operator::GreaterThan
        | Operator::GreaterThanEqual
        | Operator::Like
        | Operator::NotLike => {
            let operands = app
                .operands
                .iter()
                .map(|o| resolve_expression(ctx, scope, parent, o))
                .collect::<Result<Vec<_>, _>>()?;
            let refs: Vec<&ResolvedExpr> = operands.iter().collect();
            infer_types(ctx, &refs, "a comparison")?;
            Ok(expand_comparison(app.operator.into(), operands))
        }
        _ => {
            let operands = app
                .operands
                .iter()
                .map(|o| resolve_expression(ctx, scope, parent, o))
                .collect::<Result<Vec<_>, _>>()?;
            if matches!(
                app.operator,
                Operator::Addition
                    | Operator::Subtraction
                    | Operator::Multiplication
                    | Operator::Division
                    | Operator::Modulo
                    | Operator::Concat
            ) {
                let refs: Vec<&ResolvedExpr> = operands.iter().collect();
                infer_types(ctx, &refs, "an arithmetic expression")?;
            }
            Ok(ResolvedExpr::Op {
                operator: app.operator.into(),
                operands,
            })
        }
    }
}

/// Equality over multi-column values decomposes pairwise; other operators
/// pass through.
fn expand_comparison(operator: SqlOperator, mut operands: Vec<ResolvedExpr>) -> ResolvedExpr {
    if operands.len() == 2
        && matches!(operator, SqlOperator::Eq | SqlOperator::Ne)
    {
        if let (
            ResolvedExpr::Composite { columns: left, .. },
            ResolvedExpr::Composite { columns: right, .. },
        ) = (&operands[0], &operands[1])
        {
            if left.len() == right.len() && left.len() > 1 {
                let pairs: Vec<ResolvedExpr> = left
                    .iter()
                    .zip(right.iter())
                    .map(|(l, r)| ResolvedExpr::Op {
                        operator: SqlOperator::Eq,
                        operands: vec![
                            ResolvedExpr::Column(l.clone()),
                            ResolvedExpr::Column(r.clone()),
                        ],
                    })
                    .collect();
                let conjunction = ResolvedExpr::Op {
                    operator: SqlOperator::And,
                    operands: pairs,
                };
                return negate_if(conjunction, operator == SqlOperator::Ne);
            }
        }
    }
    // Single-column composites compare by their one column.
    for op in operands.iter_mut() {
        if let ResolvedExpr::Composite { columns, .. } = op {
            if columns.len() == 1 {
                *op = ResolvedExpr::Column(columns[0].clone());
            }
        }
    }
    ResolvedExpr::Op { operator, operands }
}

fn negate_if(expr: ResolvedExpr, negated: bool) -> ResolvedExpr {
    if negated {
        ResolvedExpr::Op {
            operator: SqlOperator::Not,
            operands: vec![expr],
        }
    } else {
        expr
    }
}

/// Null tests over multi-column values apply to every column.
fn null_test(expr: ResolvedExpr, not_null: bool) -> ResolvedExpr {
    let operator = if not_null {
        SqlOperator::IsNotNull
    } else {
        SqlOperator::IsNull
    };
    match expr {
        ResolvedExpr::Composite { columns, .. } => {
            let tests: Vec<ResolvedExpr> = columns
                .into_iter()
                .map(|c| ResolvedExpr::Op {
                    operator,
                    operands: vec![ResolvedExpr::Column(c)],
                })
                .collect();
            if tests.len() == 1 {
                tests.into_iter().next().unwrap()
            } else {
                ResolvedExpr::Op {
                    operator: SqlOperator::And,
                    operands: tests,
                }
            }
        }
        other => ResolvedExpr::Op {
            operator,
            operands: vec![other],
        },
    }
}

/// Resolves `Path` and `treat(...)` expressions, the only two navigation
/// forms.
pub(crate) fn resolve_navigation(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    parent: Option<&ScopeChain<'_>>,
    expr: &Expression<'_>,
    usage: PathUsage,
) -> Result<ResolvedPath, ResolverError> {
    match expr {
        Expression::Path(path) => resolve_path(ctx, scope, parent, path, usage),
        Expression::Treat {
            path,
            subtype,
            trailing,
        } => {
            let base = resolve_path(ctx, scope, parent, path, PathUsage::Value)?;
            let (alias, entity) = match base {
                ResolvedPath::Entity { alias, entity } => (alias, entity),
                _ => {
                    return Err(ResolverError::InvalidTreatTarget {
                        entity: path.dotted(),
                        subtype: subtype.to_string(),
                    })
                }
            };
            let treat_alias = apply_treat(ctx, scope, &alias, &entity, subtype, None)?;
            let subtype_name = ctx
                .catalog
                .entity_by_class(subtype)
                .map(|e| e.name.clone())
                .ok_or_else(|| ResolverError::UnknownEntity(subtype.to_string()))?;
            if trailing.is_empty() {
                return Ok(ResolvedPath::Entity {
                    alias: treat_alias,
                    entity: subtype_name,
                });
            }
            let dotted = format!("treat({} as {}).{}", path.dotted(), subtype, trailing.join("."));
            walk_segments(
                ctx,
                scope,
                treat_alias,
                subtype_name,
                false,
                trailing,
                0,
                &dotted,
                usage,
            )
        }
        _ => unreachable!("resolve_navigation called on a non-path expression"),
    }
}

fn path_to_value(
    ctx: &mut ResolverCtx<'_>,
    resolved: ResolvedPath,
) -> Result<ResolvedExpr, ResolverError> {
    match resolved {
        ResolvedPath::Value(expr) => Ok(expr),
        ResolvedPath::Entity { alias, entity } => Ok(entity_ref_value(ctx, &alias, &entity)),
        ResolvedPath::Collection {
            owner_alias,
            property,
            ..
        } => Err(ResolverError::CollectionValuedPath(format!(
            "{}.{}",
            owner_alias, property.name
        ))),
    }
}

/// An entity reference compares and projects through its identifier
/// columns.
pub(crate) fn entity_ref_value(
    ctx: &ResolverCtx<'_>,
    alias: &str,
    entity: &str,
) -> ResolvedExpr {
    let id = match id_mapping(ctx.catalog, entity) {
        Some(id) => id,
        None => {
            return ResolvedExpr::Column(ColumnRef {
                alias: alias.to_string(),
                column: "id".to_string(),
                sql_type: None,
                nullable: false,
            })
        }
    };
    let columns: Vec<ColumnRef> = id
        .columns()
        .iter()
        .map(|c| ColumnRef {
            alias: alias.to_string(),
            column: (*c).to_string(),
            sql_type: id.sql_type(),
            nullable: false,
        })
        .collect();
    if columns.len() == 1 {
        ResolvedExpr::Column(columns.into_iter().next().unwrap())
    } else {
        ResolvedExpr::Composite {
            alias: alias.to_string(),
            columns,
        }
    }
}

fn expect_collection(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    parent: Option<&ScopeChain<'_>>,
    path: &PathExpression<'_>,
) -> Result<(String, String, PropertyDescriptor), ResolverError> {
    match resolve_path(ctx, scope, parent, path, PathUsage::Value)? {
        ResolvedPath::Collection {
            owner_alias,
            owner_entity,
            property,
        } => Ok((owner_alias, owner_entity, property)),
        _ => Err(ResolverError::NotACollection {
            path: path.dotted(),
            property: path.segments.last().unwrap_or(&"").to_string(),
        }),
    }
}

fn resolve_collection_fn(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    parent: Option<&ScopeChain<'_>>,
    function: CollectionFn,
    path: &PathExpression<'_>,
) -> Result<ResolvedExpr, ResolverError> {
    match function {
        CollectionFn::Size => {
            let (owner_alias, owner_entity, property) =
                expect_collection(ctx, scope, parent, path)?;
            let subquery =
                collection_count(ctx, &owner_alias, &owner_entity, &property)?;
            Ok(ResolvedExpr::Subquery(Box::new(subquery)))
        }
        CollectionFn::Elements | CollectionFn::Indices => Err(
            ResolverError::UnsupportedCollectionContext(
                match function {
                    CollectionFn::Elements => "elements()",
                    _ => "indices()",
                }
                .to_string(),
            ),
        ),
        CollectionFn::Key | CollectionFn::Value | CollectionFn::Index => {
            collection_alias_column(ctx, scope, parent, function, path)
        }
    }
}

/// `key(m)`, `value(m)`, `index(l)` over an explicitly joined collection
/// alias.
fn collection_alias_column(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    parent: Option<&ScopeChain<'_>>,
    function: CollectionFn,
    path: &PathExpression<'_>,
) -> Result<ResolvedExpr, ResolverError> {
    let function_name = match function {
        CollectionFn::Key => "key",
        CollectionFn::Index => "index",
        _ => "value",
    };
    let alias = match path.segments.as_slice() {
        [single] => *single,
        _ => {
            return Err(ResolverError::NotACollectionAlias {
                function: function_name.to_string(),
                alias: path.dotted(),
            })
        }
    };
    let binding = path_resolver::lookup_alias(scope, parent, alias)
        .cloned()
        .ok_or_else(|| ResolverError::UnresolvablePath {
            name: alias.to_string(),
            path: path.dotted(),
        })?;
    let (binding, optional) = match binding {
        AliasBinding::CollectionElement { binding, optional } => (binding, optional),
        AliasBinding::Entity { .. } => {
            return Err(ResolverError::NotACollectionAlias {
                function: function_name.to_string(),
                alias: alias.to_string(),
            })
        }
    };
    let (column, sql_type) = match function {
        CollectionFn::Value => (Some(binding.element_column.clone()), Some(binding.element_type)),
        CollectionFn::Key => (binding.key_column.clone(), binding.key_type),
        CollectionFn::Index => (
            binding.index_column.clone().or_else(|| binding.key_column.clone()),
            binding.index_column.as_ref().map(|_| SqlType::Integer).or(binding.key_type),
        ),
        _ => (None, None),
    };
    let column = column.ok_or_else(|| ResolverError::MissingCollectionColumn {
        alias: alias.to_string(),
        what: function_name.to_string(),
    })?;
    Ok(ResolvedExpr::Column(ColumnRef {
        alias: alias.to_string(),
        column,
        sql_type,
        nullable: optional,
    }))
}

/// Correlated existence subquery over a collection's rows; `element`
/// additionally restricts to a matching element.
fn collection_subquery(
    ctx: &mut ResolverCtx<'_>,
    owner_alias: &str,
    owner_entity: &str,
    property: &PropertyDescriptor,
    element: Option<ResolvedExpr>,
) -> Result<ResolvedQuery, ResolverError> {
    let (source, alias, predicate) =
        collection_rows(ctx, owner_alias, owner_entity, property, element)?;
    Ok(ResolvedQuery {
        distinct: false,
        select: vec![SelectColumn {
            expr: ResolvedExpr::Literal(LiteralValue::Integer(1)),
            alias: None,
        }],
        from: vec![FromTable { source, alias }],
        joins: vec![],
        predicate: Some(predicate),
        group_by: vec![],
        having: None,
        order_by: vec![],
        result_shape: ResultShape::Scalar,
    })
}

/// `size(path)` becomes a correlated `count(*)` over the collection's
/// rows.
fn collection_count(
    ctx: &mut ResolverCtx<'_>,
    owner_alias: &str,
    owner_entity: &str,
    property: &PropertyDescriptor,
) -> Result<ResolvedQuery, ResolverError> {
    let (source, alias, predicate) =
        collection_rows(ctx, owner_alias, owner_entity, property, None)?;
    Ok(ResolvedQuery {
        distinct: false,
        select: vec![SelectColumn {
            expr: ResolvedExpr::Function {
                name: "count".to_string(),
                distinct: false,
                args: vec![ResolvedExpr::Star],
            },
            alias: None,
        }],
        from: vec![FromTable { source, alias }],
        joins: vec![],
        predicate: Some(predicate),
        group_by: vec![],
        having: None,
        order_by: vec![],
        result_shape: ResultShape::Scalar,
    })
}

/// Table, fresh alias, and correlation predicate for one collection
/// property's rows.
fn collection_rows(
    ctx: &mut ResolverCtx<'_>,
    owner_alias: &str,
    owner_entity: &str,
    property: &PropertyDescriptor,
    element: Option<ResolvedExpr>,
) -> Result<(TableSource, String, ResolvedExpr), ResolverError> {
    let owner_id = id_mapping(ctx.catalog, owner_entity)
        .ok_or_else(|| ResolverError::UnknownEntity(owner_entity.to_string()))?;
    let owner_id_col = owner_id.first_column().to_string();
    let owner_id_type = owner_id.sql_type();

    match &property.kind {
        PropertyKind::Association {
            target_entity,
            join,
            ..
        } => {
            let target = ctx
                .catalog
                .entity(target_entity)
                .ok_or_else(|| ResolverError::UnknownEntity(target_entity.clone()))?;
            let target_id_col = target.id.first_column().to_string();
            let target_id_type = target.id.sql_type();
            match join {
                AssociationJoin::JoinTable {
                    table,
                    owner_fk,
                    target_fk,
                } => {
                    let alias = ctx.next_alias(&property.name);
                    let mut predicate = path_resolver::equality(
                        path_resolver::column(&alias, owner_fk, owner_id_type),
                        path_resolver::column(owner_alias, &owner_id_col, owner_id_type),
                    );
                    if let Some(elem) = element {
                        let member = path_resolver::column(&alias, target_fk, target_id_type);
                        infer_types(ctx, &[&member, &elem], "a membership predicate")?;
                        predicate = and(predicate, path_resolver::equality(member, elem));
                    }
                    Ok((TableSource::Table(table.clone()), alias, predicate))
                }
                AssociationJoin::ForeignKey { fk_column } => {
                    let alias = ctx.next_alias(&property.name);
                    let mut predicate = path_resolver::equality(
                        path_resolver::column(&alias, fk_column, owner_id_type),
                        path_resolver::column(owner_alias, &owner_id_col, owner_id_type),
                    );
                    if let Some(elem) = element {
                        let member =
                            path_resolver::column(&alias, &target_id_col, target_id_type);
                        infer_types(ctx, &[&member, &elem], "a membership predicate")?;
                        predicate = and(predicate, path_resolver::equality(member, elem));
                    }
                    Ok((
                        table_source_for(ctx.catalog, target_entity),
                        alias,
                        predicate,
                    ))
                }
            }
        }
        PropertyKind::ElementCollection {
            table,
            owner_fk,
            element_column,
            element_type,
            ..
        } => {
            let alias = ctx.next_alias(&property.name);
            let mut predicate = path_resolver::equality(
                path_resolver::column(&alias, owner_fk, owner_id_type),
                path_resolver::column(owner_alias, &owner_id_col, owner_id_type),
            );
            if let Some(elem) = element {
                let member =
                    path_resolver::column(&alias, element_column, Some(*element_type));
                infer_types(ctx, &[&member, &elem], "a membership predicate")?;
                predicate = and(predicate, path_resolver::equality(member, elem));
            }
            Ok((TableSource::Table(table.clone()), alias, predicate))
        }
        _ => Err(ResolverError::NotACollection {
            path: property.name.clone(),
            property: property.name.clone(),
        }),
    }
}

fn and(left: ResolvedExpr, right: ResolvedExpr) -> ResolvedExpr {
    ResolvedExpr::Op {
        operator: SqlOperator::And,
        operands: vec![left, right],
    }
}

/// Assigns the anchor type to any untyped parameters among `exprs`;
/// errors when untyped parameters exist with nothing to anchor them.
pub(crate) fn infer_types(
    ctx: &mut ResolverCtx<'_>,
    exprs: &[&ResolvedExpr],
    context: &str,
) -> Result<(), ResolverError> {
    let mut untyped = Vec::new();
    for expr in exprs {
        expr.untyped_params(&ctx.params, &mut untyped);
    }
    if untyped.is_empty() {
        return Ok(());
    }
    let anchor = exprs.iter().find_map(|e| e.type_anchor(&ctx.params));
    match anchor {
        Some(sql_type) => {
            for idx in untyped {
                ctx.params[idx].sql_type = Some(sql_type);
            }
            Ok(())
        }
        None => Err(ResolverError::AmbiguousParameter {
            context: context.to_string(),
        }),
    }
}

fn literal_value(lit: &Literal<'_>) -> LiteralValue {
    match lit {
        Literal::String(s) => LiteralValue::String(s.to_string()),
        Literal::Integer(i) => LiteralValue::Integer(*i),
        Literal::Float(f) => LiteralValue::Float(*f),
        Literal::Boolean(b) => LiteralValue::Boolean(*b),
        Literal::Null => LiteralValue::Null,
    }
}
