//! Semantic resolution: binds the parsed AST against the entity catalog,
//! producing a plan of tables, deduplicated joins, and typed parameters for
//! the SQL generator.

pub mod errors;
mod expr_resolver;
mod path_resolver;
pub mod plan;
mod scope;

use log::debug;

use crate::config::TranslatorConfig;
use crate::entity_catalog::{
    AssociationJoin, EntityCatalog, IdentifierMapping, InheritanceStrategy, PropertyDescriptor,
    PropertyKind, SqlType,
};
use crate::execution::ResultShape;
use crate::hql_parser::ast::{
    ConstructorKind, DeleteStatement, Expression, HqlStatement, JoinClause, JoinTarget, JoinType,
    OrderByItem, Parameter, PathExpression, SelectClause, SelectItem, SelectQuery,
    UpdateStatement,
};

pub use errors::ResolverError;
pub use plan::{
    ColumnRef, FromTable, JoinKind, LiteralValue, ParamLabel, ParameterBinding, ResolvedDelete,
    ResolvedExpr, ResolvedInList, ResolvedJoin, ResolvedPlan, ResolvedQuery, ResolvedStatement,
    ResolvedUpdate, SelectColumn, SqlOperator, TableSource, UnionBranch,
};

use expr_resolver::{entity_ref_value, infer_types, resolve_expression, resolve_navigation};
use path_resolver::{
    association_join, apply_treat, column_owner_alias, discriminator_filter, id_mapping,
    table_source_for, PathUsage, ResolvedPath,
};
use scope::{AliasBinding, CollectionElementBinding, Scope, ScopeChain};

/// Shared resolution state: the catalog, parameter registry, and the alias
/// generator.
pub(crate) struct ResolverCtx<'c> {
    pub catalog: &'c EntityCatalog,
    pub config: &'c TranslatorConfig,
    pub params: Vec<ParameterBinding>,
    alias_seq: u32,
}

impl<'c> ResolverCtx<'c> {
    fn new(catalog: &'c EntityCatalog, config: &'c TranslatorConfig) -> Self {
        ResolverCtx {
            catalog,
            config,
            params: Vec::new(),
            alias_seq: 0,
        }
    }

    /// Fresh table alias derived from a name hint. Sequence numbers keep
    /// generated aliases deterministic for identical queries.
    pub(crate) fn next_alias(&mut self, hint: &str) -> String {
        let mut base: String = hint
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect::<String>()
            .to_ascii_lowercase();
        if base.is_empty() {
            base.push('t');
        }
        let alias = format!("{}_{}", base, self.alias_seq);
        self.alias_seq += 1;
        alias
    }

    /// Registers one parameter occurrence, untyped until inference anchors
    /// it.
    pub(crate) fn bind_parameter(&mut self, p: &Parameter<'_>) -> ResolvedExpr {
        let (label, source) = match p {
            Parameter::Named(name) => (ParamLabel::Named(name.to_string()), format!(":{}", name)),
            Parameter::Positional(pos) => (
                ParamLabel::Positional(*pos),
                match pos {
                    Some(n) => format!("?{}", n),
                    None => "?".to_string(),
                },
            ),
        };
        self.params.push(ParameterBinding {
            label,
            sql_type: None,
            source,
        });
        ResolvedExpr::Parameter(self.params.len() - 1)
    }
}

/// Resolves a parsed statement into a generator-ready plan.
pub fn resolve(
    statement: &HqlStatement<'_>,
    catalog: &EntityCatalog,
    config: &TranslatorConfig,
) -> Result<ResolvedPlan, ResolverError> {
    let mut ctx = ResolverCtx::new(catalog, config);
    let statement = match statement {
        HqlStatement::Select(query) => {
            ResolvedStatement::Select(resolve_select_query(&mut ctx, query, None)?)
        }
        HqlStatement::Update(update) => {
            ResolvedStatement::Update(resolve_update(&mut ctx, update)?)
        }
        HqlStatement::Delete(delete) => {
            ResolvedStatement::Delete(resolve_delete(&mut ctx, delete)?)
        }
    };
    debug!("resolved {} parameter(s)", ctx.params.len());
    Ok(ResolvedPlan {
        statement,
        parameters: ctx.params,
    })
}

pub(crate) fn resolve_select_query(
    ctx: &mut ResolverCtx<'_>,
    query: &SelectQuery<'_>,
    parent: Option<&ScopeChain<'_>>,
) -> Result<ResolvedQuery, ResolverError> {
    let mut scope = Scope::default();

    for root in &query.from.roots {
        let desc = ctx
            .catalog
            .entity_by_class(root.entity)
            .ok_or_else(|| ResolverError::UnknownEntity(root.entity.to_string()))?;
        let entity = desc.name.clone();
        let alias = match root.alias {
            Some(a) => a.to_string(),
            None => ctx.next_alias(&entity),
        };
        scope
            .declare(
                &alias,
                AliasBinding::Entity {
                    entity: entity.clone(),
                    optional: false,
                },
            )
            .map_err(ResolverError::DuplicateAlias)?;
        scope.roots.push(alias.clone());
        scope.from.push(FromTable {
            source: table_source_for(ctx.catalog, &entity),
            alias: alias.clone(),
        });
        if let Some(filter) = discriminator_filter(ctx.catalog, &alias, &entity) {
            scope.filters.push(filter);
        }
        for join in &root.joins {
            resolve_join_clause(ctx, &mut scope, parent, &alias, join)?;
        }
    }

    let mut predicate = query
        .where_clause
        .as_ref()
        .map(|w| resolve_expression(ctx, &mut scope, parent, w))
        .transpose()?;

    let group_by = query
        .group_by
        .iter()
        .map(|g| resolve_expression(ctx, &mut scope, parent, g))
        .collect::<Result<Vec<_>, _>>()?;
    let having = query
        .having
        .as_ref()
        .map(|h| resolve_expression(ctx, &mut scope, parent, h))
        .transpose()?;

    let (distinct, select, result_shape, select_aliases) =
        resolve_select_clause(ctx, &mut scope, parent, query.select.as_ref())?;

    let order_by = query
        .order_by
        .iter()
        .map(|item| resolve_order_item(ctx, &mut scope, parent, item, &select_aliases))
        .collect::<Result<Vec<_>, _>>()?;

    // Discriminator and treat restrictions collected during resolution.
    for filter in std::mem::take(&mut scope.filters) {
        predicate = Some(match predicate {
            Some(p) => and(p, filter),
            None => filter,
        });
    }

    Ok(ResolvedQuery {
        distinct,
        select,
        from: std::mem::take(&mut scope.from),
        joins: std::mem::take(&mut scope.joins),
        predicate,
        group_by,
        having,
        order_by,
        result_shape,
    })
}

/// Resolves one explicit join clause against its from-root.
fn resolve_join_clause(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    parent: Option<&ScopeChain<'_>>,
    root_alias: &str,
    join: &JoinClause<'_>,
) -> Result<(), ResolverError> {
    let (path, treat_subtype) = match &join.path {
        JoinTarget::Path(p) => (p, None),
        JoinTarget::Treat { path, subtype } => (path, Some(*subtype)),
    };
    let kind = match join.join_type {
        JoinType::Inner => JoinKind::Inner,
        JoinType::Left => JoinKind::Left,
    };
    let optional = kind == JoinKind::Left;

    // Split into owner prefix and the joined property.
    let (owner_alias, owner_entity, property_name) = match path.segments.as_slice() {
        [] => {
            return Err(ResolverError::UnresolvablePath {
                name: String::new(),
                path: path.dotted(),
            })
        }
        [single] => {
            let entity = match scope.lookup_local(root_alias) {
                Some(AliasBinding::Entity { entity, .. }) => entity.clone(),
                _ => {
                    return Err(ResolverError::UnresolvablePath {
                        name: (*single).to_string(),
                        path: path.dotted(),
                    })
                }
            };
            (root_alias.to_string(), entity, *single)
        }
        [prefix @ .., last] => {
            let prefix_path = PathExpression {
                segments: prefix.to_vec(),
            };
            match path_resolver::resolve_path(ctx, scope, parent, &prefix_path, PathUsage::Value)?
            {
                ResolvedPath::Entity { alias, entity } => (alias, entity, *last),
                _ => {
                    return Err(ResolverError::UnresolvablePath {
                        name: (*last).to_string(),
                        path: path.dotted(),
                    })
                }
            }
        }
    };

    let (declaring, prop) = match ctx.catalog.property(&owner_entity, property_name) {
        Some((declaring, prop)) => (declaring.name.clone(), prop.clone()),
        None => {
            if let Some(sub) = ctx.catalog.subtype_declaring(&owner_entity, property_name) {
                return Err(ResolverError::IllegalSubtypeAccess {
                    entity: owner_entity,
                    property: property_name.to_string(),
                    subtype: sub.name.clone(),
                });
            }
            return Err(ResolverError::UnresolvablePath {
                name: property_name.to_string(),
                path: path.dotted(),
            });
        }
    };
    let fk_owner_alias = column_owner_alias(ctx, scope, &owner_alias, &owner_entity, &declaring)?;

    let user_alias = match join.alias {
        Some(a) => a.to_string(),
        None => ctx.next_alias(property_name),
    };

    match &prop.kind {
        PropertyKind::Association {
            target_entity,
            kind: assoc_kind,
            join: assoc_join,
            ..
        } => {
            let use_subquery_rewrite = join.with_predicate.is_some()
                && ctx.config.collection_join_subquery
                && matches!(assoc_join, AssociationJoin::JoinTable { .. })
                && assoc_kind.is_collection();

            // Joined-hierarchy treat targets make the user alias the
            // subtype table itself; the association lands on an internal
            // base alias the treat join keys off.
            let treat_needs_subtype_table = match treat_subtype {
                Some(subtype) => {
                    let sub = ctx
                        .catalog
                        .entity_by_class(subtype)
                        .ok_or_else(|| ResolverError::UnknownEntity(subtype.to_string()))?;
                    match sub.strategy {
                        InheritanceStrategy::Joined => true,
                        InheritanceStrategy::SingleTable => false,
                        InheritanceStrategy::TablePerClass => {
                            return Err(ResolverError::UnsupportedTreatStrategy(
                                sub.name.clone(),
                            ))
                        }
                    }
                }
                None => false,
            };
            let assoc_alias = if treat_needs_subtype_table {
                None
            } else {
                Some(user_alias.as_str())
            };

            let base_alias = if use_subquery_rewrite {
                // The link table moves into a correlated existence check in
                // the on-condition, so the restricted join cannot fan out
                // through link rows.
                join_table_subquery_join(
                    ctx,
                    scope,
                    &owner_alias,
                    &owner_entity,
                    property_name,
                    target_entity,
                    assoc_join,
                    kind,
                    assoc_alias,
                )?
            } else {
                association_join(
                    ctx,
                    scope,
                    &owner_alias,
                    &fk_owner_alias,
                    &owner_entity,
                    property_name,
                    target_entity,
                    *assoc_kind,
                    assoc_join,
                    kind,
                    assoc_alias,
                )?
            };

            let bound_entity = match treat_subtype {
                None => target_entity.clone(),
                Some(subtype) => {
                    let explicit = if treat_needs_subtype_table {
                        Some(user_alias.as_str())
                    } else {
                        None
                    };
                    apply_treat(ctx, scope, &base_alias, target_entity, subtype, explicit)?;
                    ctx.catalog
                        .entity_by_class(subtype)
                        .map(|e| e.name.clone())
                        .ok_or_else(|| ResolverError::UnknownEntity(subtype.to_string()))?
                }
            };
            scope
                .declare(
                    &user_alias,
                    AliasBinding::Entity {
                        entity: bound_entity,
                        optional,
                    },
                )
                .map_err(ResolverError::DuplicateAlias)?;
        }
        PropertyKind::ElementCollection {
            table,
            owner_fk,
            element_column,
            element_type,
            index_column,
            key_column,
            key_type,
        } => {
            if let Some(subtype) = treat_subtype {
                return Err(ResolverError::InvalidTreatTarget {
                    entity: owner_entity,
                    subtype: subtype.to_string(),
                });
            }
            let owner_id = id_mapping(ctx.catalog, &owner_entity)
                .ok_or_else(|| ResolverError::UnknownEntity(owner_entity.clone()))?;
            let owner_id_type = owner_id.sql_type();
            scope.push_join(ResolvedJoin {
                kind,
                source: TableSource::Table(table.clone()),
                alias: user_alias.clone(),
                on: path_resolver::equality(
                    path_resolver::column(&user_alias, owner_fk, owner_id_type),
                    path_resolver::column(&owner_alias, owner_id.first_column(), owner_id_type),
                ),
                with: None,
            });
            scope.record_implicit_join(&owner_alias, property_name, &user_alias);
            scope
                .declare(
                    &user_alias,
                    AliasBinding::CollectionElement {
                        binding: CollectionElementBinding {
                            element_column: element_column.clone(),
                            element_type: *element_type,
                            key_column: key_column.clone(),
                            key_type: *key_type,
                            index_column: index_column.clone(),
                        },
                        optional,
                    },
                )
                .map_err(ResolverError::DuplicateAlias)?;
        }
        _ => {
            return Err(ResolverError::NotACollection {
                path: path.dotted(),
                property: property_name.to_string(),
            })
        }
    }

    if let Some(with) = &join.with_predicate {
        let resolved = resolve_expression(ctx, scope, parent, with)?;
        if let Some(j) = scope.joins.iter_mut().rev().find(|j| j.alias == user_alias) {
            j.with = Some(resolved);
        }
    }

    Ok(())
}

/// Restricted join-table collection join in rewritten form: the target
/// table joins directly and its on-condition proves link-row existence.
#[allow(clippy::too_many_arguments)]
fn join_table_subquery_join(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    owner_alias: &str,
    owner_entity: &str,
    property_name: &str,
    target_entity: &str,
    assoc_join: &AssociationJoin,
    kind: JoinKind,
    explicit_alias: Option<&str>,
) -> Result<String, ResolverError> {
    let (table, owner_fk, target_fk) = match assoc_join {
        AssociationJoin::JoinTable {
            table,
            owner_fk,
            target_fk,
        } => (table.clone(), owner_fk.clone(), target_fk.clone()),
        AssociationJoin::ForeignKey { .. } => unreachable!("caller checked for a join table"),
    };
    let owner_id = id_mapping(ctx.catalog, owner_entity)
        .ok_or_else(|| ResolverError::UnknownEntity(owner_entity.to_string()))?;
    let target = ctx
        .catalog
        .entity(target_entity)
        .ok_or_else(|| ResolverError::UnknownEntity(target_entity.to_string()))?;
    let target_id_col = target.id.first_column().to_string();
    let target_id_type = target.id.sql_type();
    let target_source = table_source_for(ctx.catalog, target_entity);

    let user_alias = match explicit_alias {
        Some(a) => a.to_string(),
        None => ctx.next_alias(property_name),
    };
    let link_alias = ctx.next_alias(&format!("{}_link", property_name));
    let correlation = and(
        path_resolver::equality(
            path_resolver::column(&link_alias, &owner_fk, owner_id.sql_type()),
            path_resolver::column(owner_alias, owner_id.first_column(), owner_id.sql_type()),
        ),
        path_resolver::equality(
            path_resolver::column(&link_alias, &target_fk, target_id_type),
            path_resolver::column(&user_alias, &target_id_col, target_id_type),
        ),
    );
    let exists = ResolvedQuery {
        distinct: false,
        select: vec![SelectColumn {
            expr: ResolvedExpr::Literal(LiteralValue::Integer(1)),
            alias: None,
        }],
        from: vec![FromTable {
            source: TableSource::Table(table),
            alias: link_alias,
        }],
        joins: vec![],
        predicate: Some(correlation),
        group_by: vec![],
        having: None,
        order_by: vec![],
        result_shape: ResultShape::Scalar,
    };
    scope.push_join(ResolvedJoin {
        kind,
        source: target_source,
        alias: user_alias.clone(),
        on: ResolvedExpr::Exists {
            negated: false,
            subquery: Box::new(exists),
        },
        with: None,
    });
    scope.record_implicit_join(owner_alias, property_name, &user_alias);
    Ok(user_alias)
}

type SelectOutcome = (bool, Vec<SelectColumn>, ResultShape, Vec<String>);

fn resolve_select_clause(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    parent: Option<&ScopeChain<'_>>,
    clause: Option<&SelectClause<'_>>,
) -> Result<SelectOutcome, ResolverError> {
    let clause = match clause {
        Some(c) => c,
        None => {
            // `from Entity` shorthand selects the root entities.
            let roots = scope.roots.clone();
            let mut columns = Vec::new();
            let mut entities = Vec::new();
            for alias in &roots {
                let entity = match scope.lookup_local(alias) {
                    Some(AliasBinding::Entity { entity, .. }) => entity.clone(),
                    _ => continue,
                };
                columns.extend(entity_projection(ctx, scope, alias, &entity)?);
                entities.push(entity);
            }
            let shape = if entities.len() == 1 {
                ResultShape::Entity {
                    entity: entities.remove(0),
                }
            } else {
                ResultShape::Tuple {
                    arity: columns.len(),
                }
            };
            return Ok((false, columns, shape, Vec::new()));
        }
    };

    let mut columns = Vec::new();
    let mut aliases = Vec::new();
    let mut single_shape: Option<ResultShape> = None;

    for item in &clause.items {
        match item {
            SelectItem::Expression { expr, alias } => {
                if let Some(a) = alias {
                    aliases.push((*a).to_string());
                }
                match expr {
                    e @ (Expression::Path(_) | Expression::Treat { .. }) => {
                        match resolve_navigation(ctx, scope, parent, e, PathUsage::Value)? {
                            ResolvedPath::Entity {
                                alias: bound,
                                entity,
                            } => {
                                columns.extend(entity_projection(ctx, scope, &bound, &entity)?);
                                single_shape = Some(ResultShape::Entity { entity });
                            }
                            ResolvedPath::Value(ResolvedExpr::Composite {
                                columns: parts, ..
                            }) => {
                                for part in parts {
                                    columns.push(SelectColumn {
                                        expr: ResolvedExpr::Column(part),
                                        alias: None,
                                    });
                                }
                                single_shape = Some(ResultShape::Tuple {
                                    arity: columns.len(),
                                });
                            }
                            ResolvedPath::Value(value) => {
                                columns.push(SelectColumn {
                                    expr: value,
                                    alias: alias.map(str::to_string),
                                });
                                single_shape = Some(ResultShape::Scalar);
                            }
                            ResolvedPath::Collection {
                                owner_alias,
                                property,
                                ..
                            } => {
                                return Err(ResolverError::CollectionValuedPath(format!(
                                    "{}.{}",
                                    owner_alias, property.name
                                )))
                            }
                        }
                    }
                    other => {
                        let value = resolve_expression(ctx, scope, parent, other)?;
                        columns.push(SelectColumn {
                            expr: value,
                            alias: alias.map(str::to_string),
                        });
                        single_shape = Some(ResultShape::Scalar);
                    }
                }
            }
            SelectItem::Constructor { kind, args } => {
                let mut arity = 0usize;
                for arg in args {
                    let value = match arg {
                        e @ (Expression::Path(_) | Expression::Treat { .. }) => {
                            match resolve_navigation(ctx, scope, parent, e, PathUsage::Value)? {
                                ResolvedPath::Entity {
                                    alias: bound,
                                    entity,
                                } => entity_ref_value(ctx, &bound, &entity),
                                ResolvedPath::Value(v) => v,
                                ResolvedPath::Collection {
                                    owner_alias,
                                    property,
                                    ..
                                } => {
                                    return Err(ResolverError::CollectionValuedPath(format!(
                                        "{}.{}",
                                        owner_alias, property.name
                                    )))
                                }
                            }
                        }
                        other => resolve_expression(ctx, scope, parent, other)?,
                    };
                    arity += 1;
                    columns.push(SelectColumn {
                        expr: value,
                        alias: None,
                    });
                }
                let class = match kind {
                    ConstructorKind::Class(c) => (*c).to_string(),
                    ConstructorKind::List => "list".to_string(),
                    ConstructorKind::Map => "map".to_string(),
                };
                single_shape = Some(ResultShape::Constructor { class, arity });
            }
        }
    }

    let shape = if clause.items.len() == 1 {
        single_shape.unwrap_or(ResultShape::Scalar)
    } else {
        ResultShape::Tuple {
            arity: columns.len(),
        }
    };
    Ok((clause.distinct, columns, shape, aliases))
}

/// All state columns of an entity, identifier first, inherited columns
/// routed through supertype joins where the hierarchy demands it.
fn entity_projection(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    alias: &str,
    entity: &str,
) -> Result<Vec<SelectColumn>, ResolverError> {
    let mut columns = Vec::new();

    if let Some(id) = id_mapping(ctx.catalog, entity) {
        match id {
            IdentifierMapping::Single {
                column, sql_type, ..
            } => columns.push(select_col(alias, &column, Some(sql_type), false)),
            IdentifierMapping::Composite { fields } => {
                for f in fields {
                    columns.push(select_col(alias, &f.column, Some(f.sql_type), false));
                }
            }
        }
    }

    // Declaration order, ancestors first.
    let mut chain: Vec<(String, Vec<PropertyDescriptor>)> = Vec::new();
    let mut current = ctx.catalog.entity(entity);
    while let Some(desc) = current {
        chain.push((desc.name.clone(), desc.properties.clone()));
        current = desc.parent.as_deref().and_then(|p| ctx.catalog.entity(p));
    }
    chain.reverse();

    for (declaring, properties) in chain {
        let owner = column_owner_alias(ctx, scope, alias, entity, &declaring)?;
        for prop in properties {
            match prop.kind {
                PropertyKind::Basic {
                    column,
                    sql_type,
                    nullable,
                    ..
                } => columns.push(select_col(&owner, &column, Some(sql_type), nullable)),
                PropertyKind::Embedded { fields } => {
                    for f in fields {
                        columns.push(select_col(&owner, &f.column, Some(f.sql_type), true));
                    }
                }
                PropertyKind::Association {
                    ref target_entity,
                    kind,
                    join: AssociationJoin::ForeignKey { ref fk_column },
                    nullable,
                } if !kind.is_collection() => {
                    let id_type = ctx
                        .catalog
                        .entity(target_entity)
                        .and_then(|e| e.id.sql_type());
                    columns.push(select_col(&owner, fk_column, id_type, nullable));
                }
                _ => {}
            }
        }
    }
    Ok(columns)
}

fn select_col(alias: &str, column: &str, sql_type: Option<SqlType>, nullable: bool) -> SelectColumn {
    SelectColumn {
        expr: ResolvedExpr::Column(ColumnRef {
            alias: alias.to_string(),
            column: column.to_string(),
            sql_type,
            nullable,
        }),
        alias: None,
    }
}

fn resolve_order_item(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    parent: Option<&ScopeChain<'_>>,
    item: &OrderByItem<'_>,
    select_aliases: &[String],
) -> Result<(ResolvedExpr, bool), ResolverError> {
    // A bare name matching a select alias orders by that output column.
    if let Expression::Path(p) = &item.expr {
        if let [single] = p.segments.as_slice() {
            if select_aliases.iter().any(|a| a == single)
                && path_resolver::lookup_alias(scope, parent, single).is_none()
            {
                return Ok((
                    ResolvedExpr::Column(ColumnRef {
                        alias: String::new(),
                        column: (*single).to_string(),
                        sql_type: None,
                        nullable: false,
                    }),
                    item.descending,
                ));
            }
        }
    }
    let expr = resolve_expression(ctx, scope, parent, &item.expr)?;
    Ok((expr, item.descending))
}

fn resolve_update(
    ctx: &mut ResolverCtx<'_>,
    stmt: &UpdateStatement<'_>,
) -> Result<ResolvedUpdate, ResolverError> {
    let desc = ctx
        .catalog
        .entity_by_class(stmt.entity)
        .ok_or_else(|| ResolverError::UnknownEntity(stmt.entity.to_string()))?;
    let entity = desc.name.clone();
    let table = desc.table.clone();

    let mut scope = Scope::default();
    let alias = match stmt.alias {
        Some(a) => a.to_string(),
        None => ctx.next_alias(&entity),
    };
    scope
        .declare(
            &alias,
            AliasBinding::Entity {
                entity: entity.clone(),
                optional: false,
            },
        )
        .map_err(ResolverError::DuplicateAlias)?;
    scope.roots.push(alias.clone());

    let mut assignments = Vec::with_capacity(stmt.assignments.len());
    for (path, value) in &stmt.assignments {
        let (column, sql_type) = assignment_column(ctx, &entity, &alias, path)?;
        let value = resolve_expression(ctx, &mut scope, None, value)?;
        ensure_single_table(&scope, "update", &path.dotted())?;
        let anchor = ResolvedExpr::Column(ColumnRef {
            alias: alias.clone(),
            column: column.clone(),
            sql_type,
            nullable: true,
        });
        infer_types(ctx, &[&anchor, &value], "an update assignment")?;
        assignments.push((column, value));
    }

    let mut predicate = stmt
        .where_clause
        .as_ref()
        .map(|w| resolve_expression(ctx, &mut scope, None, w))
        .transpose()?;
    ensure_single_table(&scope, "update", "the where clause")?;

    if let Some(filter) = discriminator_filter(ctx.catalog, &alias, &entity) {
        predicate = Some(match predicate {
            Some(p) => and(p, filter),
            None => filter,
        });
    }

    Ok(ResolvedUpdate {
        entity,
        table,
        alias,
        assignments,
        predicate,
    })
}

fn resolve_delete(
    ctx: &mut ResolverCtx<'_>,
    stmt: &DeleteStatement<'_>,
) -> Result<ResolvedDelete, ResolverError> {
    let desc = ctx
        .catalog
        .entity_by_class(stmt.entity)
        .ok_or_else(|| ResolverError::UnknownEntity(stmt.entity.to_string()))?;
    let entity = desc.name.clone();
    let table = desc.table.clone();

    let mut scope = Scope::default();
    let alias = match stmt.alias {
        Some(a) => a.to_string(),
        None => ctx.next_alias(&entity),
    };
    scope
        .declare(
            &alias,
            AliasBinding::Entity {
                entity: entity.clone(),
                optional: false,
            },
        )
        .map_err(ResolverError::DuplicateAlias)?;
    scope.roots.push(alias.clone());

    let mut predicate = stmt
        .where_clause
        .as_ref()
        .map(|w| resolve_expression(ctx, &mut scope, None, w))
        .transpose()?;
    ensure_single_table(&scope, "delete", "the where clause")?;

    if let Some(filter) = discriminator_filter(ctx.catalog, &alias, &entity) {
        predicate = Some(match predicate {
            Some(p) => and(p, filter),
            None => filter,
        });
    }

    Ok(ResolvedDelete {
        entity,
        table,
        alias,
        predicate,
    })
}

/// Bulk statements run against one table; any path that pulled in a join
/// navigated an association.
fn ensure_single_table(
    scope: &Scope,
    statement: &str,
    context: &str,
) -> Result<(), ResolverError> {
    if scope.joins.is_empty() {
        Ok(())
    } else {
        Err(ResolverError::IllegalBulkPath {
            statement: statement.to_string(),
            property: context.to_string(),
        })
    }
}

/// Settable column for one update assignment target.
fn assignment_column(
    ctx: &mut ResolverCtx<'_>,
    entity: &str,
    alias: &str,
    path: &PathExpression<'_>,
) -> Result<(String, Option<SqlType>), ResolverError> {
    let mut segments = path.segments.as_slice();
    if segments.first() == Some(&alias) {
        segments = &segments[1..];
    }
    let first = match segments.first() {
        Some(f) => *f,
        None => {
            return Err(ResolverError::UnresolvablePath {
                name: path.dotted(),
                path: path.dotted(),
            })
        }
    };

    let (declaring, prop) = match ctx.catalog.property(entity, first) {
        Some((declaring, prop)) => (declaring.name.clone(), prop.clone()),
        None => {
            return Err(ResolverError::UnresolvablePath {
                name: first.to_string(),
                path: path.dotted(),
            })
        }
    };
    let strategy = ctx
        .catalog
        .entity(entity)
        .map(|e| e.strategy)
        .unwrap_or(InheritanceStrategy::SingleTable);
    if declaring != entity && strategy == InheritanceStrategy::Joined {
        return Err(ResolverError::IllegalBulkPath {
            statement: "update".to_string(),
            property: path.dotted(),
        });
    }

    match &prop.kind {
        PropertyKind::Basic {
            column, sql_type, ..
        } => {
            if segments.len() != 1 {
                return Err(ResolverError::UnresolvablePath {
                    name: segments[1].to_string(),
                    path: path.dotted(),
                });
            }
            Ok((column.clone(), Some(*sql_type)))
        }
        PropertyKind::Embedded { fields } => {
            if segments.len() != 2 {
                return Err(ResolverError::UnresolvablePath {
                    name: path.dotted(),
                    path: path.dotted(),
                });
            }
            let field = fields
                .iter()
                .find(|f| f.name == segments[1])
                .ok_or_else(|| ResolverError::UnresolvablePath {
                    name: segments[1].to_string(),
                    path: path.dotted(),
                })?;
            Ok((field.column.clone(), Some(field.sql_type)))
        }
        PropertyKind::Association {
            target_entity,
            kind,
            join: AssociationJoin::ForeignKey { fk_column },
            ..
        } if !kind.is_collection() => {
            if segments.len() != 1 {
                return Err(ResolverError::IllegalBulkPath {
                    statement: "update".to_string(),
                    property: path.dotted(),
                });
            }
            let id_type = ctx
                .catalog
                .entity(target_entity)
                .and_then(|e| e.id.sql_type());
            Ok((fk_column.clone(), id_type))
        }
        _ => Err(ResolverError::IllegalBulkPath {
            statement: "update".to_string(),
            property: path.dotted(),
        }),
    }
}

fn and(left: ResolvedExpr, right: ResolvedExpr) -> ResolvedExpr {
    ResolvedExpr::Op {
        operator: SqlOperator::And,
        operands: vec![left, right],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_catalog::parse_catalog;
    use crate::hql_parser::parse;
    use std::collections::HashMap;

    const MAPPING: &str = r#"
name: zoo
version: "3"
entities:
  - name: Animal
    table: animal
    id: { property: id, column: id, type: long }
    strategy: joined
    properties:
      - { name: description, column: description, type: string }
      - { name: bodyWeight, column: body_weight, type: float, nullable: false }
      - { name: mother, kind: many_to_one, target: Animal, fk_column: mother_id }
      - { name: offspring, kind: one_to_many, target: Animal, fk_column: mother_id }
  - name: Mammal
    table: mammal
    extends: Animal
    strategy: joined
    properties:
      - { name: pregnant, column: pregnant, type: boolean }
  - name: Human
    table: human
    extends: Mammal
    strategy: joined
    properties:
      - { name: nickName, column: nick_name, type: string }
      - name: nickNames
        kind: element_collection
        table: human_nick_names
        owner_fk: human_id
        element_column: nick_name
        element_type: string
  - name: Zoo
    table: zoo
    id: { property: id, column: zoo_id, type: long }
    properties:
      - { name: name, column: name, type: string }
      - name: animals
        kind: many_to_many
        target: Animal
        join_table: { table: zoo_animal, owner_fk: zoo_id, target_fk: animal_id }
  - name: Payment
    table: payment
    id: { property: id, column: id, type: long }
    strategy: single_table
    discriminator: { column: payment_type }
    properties:
      - { name: amount, column: amount, type: big_decimal }
  - name: CashPayment
    table: payment
    extends: Payment
    discriminator: { value: CASH }
    properties: []
  - name: CreditCardPayment
    table: payment
    extends: Payment
    discriminator: { value: CREDIT }
    properties:
      - { name: cardNumber, column: card_number, type: string }
"#;

    fn catalog() -> crate::entity_catalog::EntityCatalog {
        parse_catalog(MAPPING, HashMap::new()).unwrap()
    }

    fn resolve_ok(query: &str) -> ResolvedPlan {
        let statement = parse(query).unwrap();
        resolve(&statement, &catalog(), &TranslatorConfig::default()).unwrap()
    }

    fn resolve_err(query: &str) -> ResolverError {
        let statement = parse(query).unwrap();
        resolve(&statement, &catalog(), &TranslatorConfig::default()).unwrap_err()
    }

    fn select_of(plan: &ResolvedPlan) -> &ResolvedQuery {
        match &plan.statement {
            ResolvedStatement::Select(q) => q,
            other => panic!("expected a select, got {:?}", other),
        }
    }

    #[test]
    fn repeated_path_shares_one_join() {
        let plan = resolve_ok(
            "select a.mother from Animal a where a.mother.bodyWeight > 10 and a.mother.description = 'x'",
        );
        let query = select_of(&plan);
        // One implicit join for `a.mother`, reused by all three references.
        assert_eq!(query.joins.len(), 1);
        assert_eq!(query.joins[0].kind, JoinKind::Left);
    }

    #[test]
    fn unqualified_property_binds_sole_root() {
        let plan = resolve_ok("from Animal where bodyWeight > 2.5");
        let query = select_of(&plan);
        assert!(matches!(
            query.result_shape,
            ResultShape::Entity { ref entity } if entity == "Animal"
        ));
        assert!(query.predicate.is_some());
    }

    #[test]
    fn is_null_on_association_left_joins_target() {
        let plan = resolve_ok("from Animal a where a.mother is null");
        let query = select_of(&plan);
        assert_eq!(query.joins.len(), 1);
        assert_eq!(query.joins[0].kind, JoinKind::Left);
        // Null test lands on the join target identifier.
        let pred = query.predicate.as_ref().unwrap();
        match pred {
            ResolvedExpr::Op { operator, operands } => {
                assert_eq!(*operator, SqlOperator::IsNull);
                match &operands[0] {
                    ResolvedExpr::Column(c) => assert_eq!(c.column, "id"),
                    other => panic!("unexpected operand {:?}", other),
                }
            }
            other => panic!("unexpected predicate {:?}", other),
        }
    }

    #[test]
    fn inherited_property_routes_through_supertype_join() {
        let plan = resolve_ok("select h.nickName from Human h where h.bodyWeight > 1");
        let query = select_of(&plan);
        // bodyWeight lives on the animal table; one supertype join.
        assert_eq!(query.joins.len(), 1);
        match &query.joins[0].source {
            TableSource::Table(t) => assert_eq!(t, "animal"),
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn subtype_property_without_treat_is_rejected() {
        let err = resolve_err("from Animal a where a.nickName = 'Pete'");
        assert!(matches!(err, ResolverError::IllegalSubtypeAccess { .. }));
    }

    #[test]
    fn treat_grants_subtype_property_access() {
        let plan = resolve_ok("from Animal a where treat(a as Human).nickName = 'Pete'");
        let query = select_of(&plan);
        // Joins to human (treat) and its ancestry chain as needed.
        assert!(query.joins.iter().any(|j| matches!(
            &j.source,
            TableSource::Table(t) if t == "human"
        )));
    }

    #[test]
    fn single_table_subclass_gets_discriminator_filter() {
        let plan = resolve_ok("from CreditCardPayment");
        let query = select_of(&plan);
        let pred = query.predicate.as_ref().expect("discriminator predicate");
        let rendered = format!("{:?}", pred);
        assert!(rendered.contains("payment_type"));
        assert!(rendered.contains("CREDIT"));
    }

    #[test]
    fn untyped_comparison_is_ambiguous() {
        let err = resolve_err("from Animal a where ?1 = ?2");
        assert!(matches!(err, ResolverError::AmbiguousParameter { .. }));
    }

    #[test]
    fn cast_anchors_parameter_type() {
        let plan = resolve_ok("from Animal a where cast(?1 as float) = ?2");
        assert_eq!(plan.parameters.len(), 2);
        assert_eq!(plan.parameters[0].sql_type, Some(SqlType::Float));
        assert_eq!(plan.parameters[1].sql_type, Some(SqlType::Float));
    }

    #[test]
    fn case_with_only_parameter_results_is_ambiguous() {
        let err = resolve_err(
            "select case when a.bodyWeight > 1 then :a else :b end from Animal a",
        );
        assert!(matches!(err, ResolverError::AmbiguousParameter { .. }));
    }

    #[test]
    fn case_result_anchor_types_parameters() {
        let plan = resolve_ok(
            "select case when a.bodyWeight > 1 then :a else a.description end from Animal a",
        );
        assert_eq!(plan.parameters[0].sql_type, Some(SqlType::String));
    }

    #[test]
    fn parameter_typed_from_compared_column() {
        let plan = resolve_ok("from Animal a where a.bodyWeight > :w");
        assert_eq!(plan.parameters[0].sql_type, Some(SqlType::Float));
    }

    #[test]
    fn member_of_becomes_correlated_exists() {
        let plan = resolve_ok("from Zoo z where :a member of z.animals");
        let query = select_of(&plan);
        assert!(query.joins.is_empty());
        assert!(matches!(
            query.predicate,
            Some(ResolvedExpr::Exists { negated: false, .. })
        ));
        // The membership column types the parameter as the target id.
        assert_eq!(plan.parameters[0].sql_type, Some(SqlType::Long));
    }

    #[test]
    fn is_empty_negates_existence() {
        let plan = resolve_ok("from Zoo z where z.animals is empty");
        let query = select_of(&plan);
        assert!(matches!(
            query.predicate,
            Some(ResolvedExpr::Exists { negated: true, .. })
        ));
    }

    #[test]
    fn size_becomes_correlated_count() {
        let plan = resolve_ok("select z.name from Zoo z where size(z.animals) > 3");
        let query = select_of(&plan);
        let pred = query.predicate.as_ref().unwrap();
        let rendered = format!("{:?}", pred);
        assert!(rendered.contains("count"));
        assert!(rendered.contains("zoo_animal"));
    }

    #[test]
    fn explicit_collection_join_with_restriction_rewrites_to_subquery() {
        let plan = resolve_ok(
            "select a from Zoo z join z.animals a with a.bodyWeight > 10",
        );
        let query = select_of(&plan);
        // One direct join to the target; the link table hides in the
        // on-condition's existence check.
        assert_eq!(query.joins.len(), 1);
        assert!(matches!(
            query.joins[0].on,
            ResolvedExpr::Exists { .. }
        ));
        assert!(query.joins[0].with.is_some());
    }

    #[test]
    fn collection_join_without_rewrite_keeps_link_table() {
        let statement = parse(
            "select a from Zoo z join z.animals a with a.bodyWeight > 10",
        )
        .unwrap();
        let config = TranslatorConfig {
            collection_join_subquery: false,
            ..TranslatorConfig::default()
        };
        let plan = resolve(&statement, &catalog(), &config).unwrap();
        let query = select_of(&plan);
        // Link table and target table both join inline.
        assert_eq!(query.joins.len(), 2);
    }

    #[test]
    fn implicit_collection_navigation_is_rejected() {
        let err = resolve_err("from Zoo z where z.animals.bodyWeight > 10");
        assert!(matches!(err, ResolverError::ImplicitCollectionJoin(_)));
    }

    #[test]
    fn element_collection_join_binds_element_alias() {
        let plan = resolve_ok(
            "select n from Human h join h.nickNames n where n = 'Steve'",
        );
        let query = select_of(&plan);
        assert_eq!(query.joins.len(), 1);
        match &query.select[0].expr {
            ResolvedExpr::Column(c) => {
                assert_eq!(c.column, "nick_name");
                assert_eq!(c.alias, "n");
            }
            other => panic!("unexpected column {:?}", other),
        }
    }

    #[test]
    fn update_resolves_columns_and_parameter_types() {
        let plan = resolve_ok("update Animal a set a.description = :d where a.id = :id");
        match &plan.statement {
            ResolvedStatement::Update(u) => {
                assert_eq!(u.table, "animal");
                assert_eq!(u.assignments[0].0, "description");
            }
            other => panic!("expected update, got {:?}", other),
        }
        assert_eq!(plan.parameters[0].sql_type, Some(SqlType::String));
        assert_eq!(plan.parameters[1].sql_type, Some(SqlType::Long));
    }

    #[test]
    fn bulk_update_rejects_association_navigation() {
        let err = resolve_err("update Animal a set a.description = a.mother.description");
        assert!(matches!(err, ResolverError::IllegalBulkPath { .. }));
    }

    #[test]
    fn delete_on_single_table_subclass_filters_discriminator() {
        let plan = resolve_ok("delete from CashPayment where amount > 100");
        match &plan.statement {
            ResolvedStatement::Delete(d) => {
                assert_eq!(d.table, "payment");
                let rendered = format!("{:?}", d.predicate);
                assert!(rendered.contains("CASH"));
            }
            other => panic!("expected delete, got {:?}", other),
        }
    }

    #[test]
    fn correlated_subquery_sees_outer_alias() {
        let plan = resolve_ok(
            "from Animal a where exists (select z.id from Zoo z where z.name = a.description)",
        );
        let query = select_of(&plan);
        assert!(matches!(
            query.predicate,
            Some(ResolvedExpr::Exists { .. })
        ));
    }

    #[test]
    fn constructor_projection_shapes_result() {
        let plan = resolve_ok(
            "select new com.example.Summary(a.description, a.bodyWeight) from Animal a",
        );
        let query = select_of(&plan);
        assert_eq!(query.select.len(), 2);
        assert!(matches!(
            query.result_shape,
            ResultShape::Constructor { ref class, arity: 2 } if class == "com.example.Summary"
        ));
    }

    #[test]
    fn duplicate_alias_is_rejected() {
        let err = resolve_err("from Animal a, Zoo a");
        assert!(matches!(err, ResolverError::DuplicateAlias(_)));
    }
}
