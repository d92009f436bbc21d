//! Path expression resolution: walks dotted paths against the catalog,
//! introducing deduplicated implicit joins for association segments.

use crate::entity_catalog::{
    AssociationJoin, AssociationKind, EntityCatalog, IdentifierMapping, InheritanceStrategy,
    PropertyDescriptor, PropertyKind,
};
use crate::hql_parser::ast::PathExpression;

use super::errors::ResolverError;
use super::plan::{
    ColumnRef, JoinKind, LiteralValue, ResolvedExpr, ResolvedJoin, SqlOperator, TableSource,
};
use super::scope::{AliasBinding, Scope, ScopeChain};
use super::ResolverCtx;

/// How the path is being used; a null test over an association forces an
/// outer join and a null check on the join target's identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathUsage {
    Value,
    NullCheck,
}

/// Outcome of resolving a path.
#[derive(Debug, Clone)]
pub(crate) enum ResolvedPath {
    /// Scalar or multi-column value.
    Value(ResolvedExpr),
    /// Whole-entity reference through `alias`.
    Entity { alias: String, entity: String },
    /// Collection-valued terminal; only membership/size/emptiness contexts
    /// accept this.
    Collection {
        owner_alias: String,
        owner_entity: String,
        property: PropertyDescriptor,
    },
}

pub(crate) fn resolve_path(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    parent: Option<&ScopeChain<'_>>,
    path: &PathExpression<'_>,
    usage: PathUsage,
) -> Result<ResolvedPath, ResolverError> {
    let segments = &path.segments;
    let dotted = path.dotted();

    let (base_alias, mut optional, start) = locate_base(ctx, scope, parent, segments, &dotted)?;

    let binding = lookup_alias(scope, parent, &base_alias)
        .expect("base alias resolved above")
        .clone();

    let current_entity = match binding {
        AliasBinding::Entity { entity, optional: opt } => {
            optional = optional || opt;
            entity
        }
        AliasBinding::CollectionElement { binding, optional: opt } => {
            // Collection element aliases expose only themselves (the
            // element value); deeper navigation is not mapped.
            if start < segments.len() {
                return Err(ResolverError::UnresolvablePath {
                    name: segments[start].to_string(),
                    path: dotted,
                });
            }
            let _ = opt;
            return Ok(ResolvedPath::Value(ResolvedExpr::Column(ColumnRef {
                alias: base_alias,
                column: binding.element_column.clone(),
                sql_type: Some(binding.element_type),
                nullable: true,
            })));
        }
    };

    if start >= segments.len() {
        return Ok(ResolvedPath::Entity {
            alias: base_alias,
            entity: current_entity,
        });
    }

    walk_segments(
        ctx,
        scope,
        base_alias,
        current_entity,
        optional,
        segments,
        start,
        &dotted,
        usage,
    )
}

/// Walks `segments[idx..]` starting at an alias of known entity type.
#[allow(clippy::too_many_arguments)]
pub(crate) fn walk_segments(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    base_alias: String,
    entity: String,
    mut optional: bool,
    segments: &[&str],
    start: usize,
    dotted: &str,
    usage: PathUsage,
) -> Result<ResolvedPath, ResolverError> {
    let dotted = dotted.to_string();
    let mut current_entity = entity;
    let mut current_alias = base_alias;
    let mut idx = start;
    loop {
        let segment = segments[idx];
        let is_terminal = idx + 1 == segments.len();

        // Identifier access, including composite field navigation.
        if ctx.catalog.is_identifier(&current_entity, segment) {
            let entity = ctx
                .catalog
                .entity(&current_entity)
                .ok_or_else(|| ResolverError::UnknownEntity(current_entity.clone()))?;
            let id = id_mapping(ctx.catalog, &current_entity).unwrap_or_else(|| entity.id.clone());
            return resolve_identifier_tail(&current_alias, &id, segments, idx, &dotted);
        }

        let (declaring, prop) = match ctx.catalog.property(&current_entity, segment) {
            Some((declaring, prop)) => (declaring.name.clone(), prop.clone()),
            None => {
                if let Some(sub) = ctx.catalog.subtype_declaring(&current_entity, segment) {
                    return Err(ResolverError::IllegalSubtypeAccess {
                        entity: current_entity,
                        property: segment.to_string(),
                        subtype: sub.name.clone(),
                    });
                }
                return Err(ResolverError::UnresolvablePath {
                    name: segment.to_string(),
                    path: dotted,
                });
            }
        };

        // In a joined hierarchy, inherited columns live on the ancestor's
        // table; route through the supertype join.
        let column_alias =
            column_owner_alias(ctx, scope, &current_alias, &current_entity, &declaring)?;

        match prop.kind {
            PropertyKind::Basic {
                ref column,
                sql_type,
                nullable,
                ..
            } => {
                if !is_terminal {
                    return Err(ResolverError::UnresolvablePath {
                        name: segments[idx + 1].to_string(),
                        path: dotted,
                    });
                }
                return Ok(ResolvedPath::Value(ResolvedExpr::Column(ColumnRef {
                    alias: column_alias,
                    column: column.clone(),
                    sql_type: Some(sql_type),
                    nullable: nullable || optional,
                })));
            }
            PropertyKind::Embedded { ref fields } => {
                if is_terminal {
                    return Ok(ResolvedPath::Value(ResolvedExpr::Composite {
                        alias: column_alias.clone(),
                        columns: fields
                            .iter()
                            .map(|f| ColumnRef {
                                alias: column_alias.clone(),
                                column: f.column.clone(),
                                sql_type: Some(f.sql_type),
                                nullable: optional,
                            })
                            .collect(),
                    }));
                }
                let field_name = segments[idx + 1];
                let field = fields.iter().find(|f| f.name == field_name).ok_or_else(|| {
                    ResolverError::UnresolvablePath {
                        name: field_name.to_string(),
                        path: dotted.clone(),
                    }
                })?;
                if idx + 2 != segments.len() {
                    return Err(ResolverError::UnresolvablePath {
                        name: segments[idx + 2].to_string(),
                        path: dotted,
                    });
                }
                return Ok(ResolvedPath::Value(ResolvedExpr::Column(ColumnRef {
                    alias: column_alias,
                    column: field.column.clone(),
                    sql_type: Some(field.sql_type),
                    nullable: optional,
                })));
            }
            PropertyKind::Association {
                ref target_entity,
                kind,
                ref join,
                nullable,
            } => {
                if kind.is_collection() {
                    if is_terminal {
                        return Ok(ResolvedPath::Collection {
                            owner_alias: current_alias,
                            owner_entity: current_entity,
                            property: prop.clone(),
                        });
                    }
                    return Err(ResolverError::ImplicitCollectionJoin(dotted));
                }

                // `p.mother.id` needs no join when the FK sits on the owner:
                // the FK column already holds the target identifier.
                if let AssociationJoin::ForeignKey { ref fk_column } = *join {
                    if matches!(kind, AssociationKind::ManyToOne | AssociationKind::OneToOne)
                        && !is_terminal
                        && idx + 2 == segments.len()
                        && ctx.catalog.is_identifier(target_entity, segments[idx + 1])
                        && usage == PathUsage::Value
                    {
                        let id_type = ctx
                            .catalog
                            .entity(target_entity)
                            .and_then(|e| e.id.sql_type());
                        return Ok(ResolvedPath::Value(ResolvedExpr::Column(ColumnRef {
                            alias: column_alias,
                            column: fk_column.clone(),
                            sql_type: id_type,
                            nullable: nullable || optional,
                        })));
                    }
                }

                let requested = if usage == PathUsage::NullCheck || optional || nullable {
                    JoinKind::Left
                } else {
                    JoinKind::Inner
                };
                let join_alias = association_join(
                    ctx,
                    scope,
                    &current_alias,
                    &column_alias,
                    &current_entity,
                    segment,
                    target_entity,
                    kind,
                    join,
                    requested,
                    None,
                )?;

                if is_terminal {
                    if usage == PathUsage::NullCheck {
                        let id_col = ctx
                            .catalog
                            .entity(target_entity)
                            .map(|e| e.id.first_column().to_string())
                            .unwrap_or_else(|| "id".to_string());
                        let id_type =
                            ctx.catalog.entity(target_entity).and_then(|e| e.id.sql_type());
                        return Ok(ResolvedPath::Value(ResolvedExpr::Column(ColumnRef {
                            alias: join_alias,
                            column: id_col,
                            sql_type: id_type,
                            nullable: true,
                        })));
                    }
                    return Ok(ResolvedPath::Entity {
                        alias: join_alias,
                        entity: target_entity.clone(),
                    });
                }

                optional = optional || nullable || requested == JoinKind::Left;
                current_entity = target_entity.clone();
                current_alias = join_alias;
                idx += 1;
            }
            PropertyKind::ElementCollection { .. } => {
                if is_terminal {
                    return Ok(ResolvedPath::Collection {
                        owner_alias: current_alias,
                        owner_entity: current_entity,
                        property: prop.clone(),
                    });
                }
                return Err(ResolverError::ImplicitCollectionJoin(dotted));
            }
        }
    }
}

/// Identifier terminal or composite-id field navigation.
fn resolve_identifier_tail(
    alias: &str,
    id: &IdentifierMapping,
    segments: &[&str],
    idx: usize,
    dotted: &str,
) -> Result<ResolvedPath, ResolverError> {
    let is_terminal = idx + 1 == segments.len();
    match id {
        IdentifierMapping::Single {
            column, sql_type, ..
        } => {
            if !is_terminal {
                return Err(ResolverError::UnresolvablePath {
                    name: segments[idx + 1].to_string(),
                    path: dotted.to_string(),
                });
            }
            Ok(ResolvedPath::Value(ResolvedExpr::Column(ColumnRef {
                alias: alias.to_string(),
                column: column.clone(),
                sql_type: Some(*sql_type),
                nullable: false,
            })))
        }
        IdentifierMapping::Composite { fields } => {
            if is_terminal {
                return Ok(ResolvedPath::Value(ResolvedExpr::Composite {
                    alias: alias.to_string(),
                    columns: fields
                        .iter()
                        .map(|f| ColumnRef {
                            alias: alias.to_string(),
                            column: f.column.clone(),
                            sql_type: Some(f.sql_type),
                            nullable: false,
                        })
                        .collect(),
                }));
            }
            let field_name = segments[idx + 1];
            let field = fields
                .iter()
                .find(|f| f.name == field_name)
                .ok_or_else(|| ResolverError::UnresolvablePath {
                    name: field_name.to_string(),
                    path: dotted.to_string(),
                })?;
            if idx + 2 != segments.len() {
                return Err(ResolverError::UnresolvablePath {
                    name: segments[idx + 2].to_string(),
                    path: dotted.to_string(),
                });
            }
            Ok(ResolvedPath::Value(ResolvedExpr::Column(ColumnRef {
                alias: alias.to_string(),
                column: field.column.clone(),
                sql_type: Some(field.sql_type),
                nullable: false,
            })))
        }
    }
}

/// Identifier mapping of an entity, inherited from the hierarchy root when
/// the subclass does not declare its own.
pub(crate) fn id_mapping(
    catalog: &EntityCatalog,
    entity: &str,
) -> Option<IdentifierMapping> {
    catalog.hierarchy_root(entity).map(|root| root.id.clone())
}

/// First segment handling: an in-scope alias, or an unqualified property of
/// the sole from-root.
fn locate_base(
    ctx: &ResolverCtx<'_>,
    scope: &Scope,
    parent: Option<&ScopeChain<'_>>,
    segments: &[&str],
    dotted: &str,
) -> Result<(String, bool, usize), ResolverError> {
    let first = segments[0];
    if let Some(binding) = lookup_alias(scope, parent, first) {
        return Ok((first.to_string(), binding.is_optional(), 1));
    }

    // Unqualified property: resolve against the from-clause roots.
    let mut candidates = Vec::new();
    for root_alias in &scope.roots {
        if let Some(AliasBinding::Entity { entity, .. }) = scope.lookup_local(root_alias) {
            if ctx.catalog.has_property(entity, first)
                || ctx.catalog.is_identifier(entity, first)
            {
                candidates.push(root_alias.clone());
            }
        }
    }
    match candidates.len() {
        1 => Ok((candidates.remove(0), false, 0)),
        0 => Err(ResolverError::UnresolvablePath {
            name: first.to_string(),
            path: dotted.to_string(),
        }),
        _ => Err(ResolverError::AmbiguousUnqualifiedProperty(first.to_string())),
    }
}

pub(crate) fn lookup_alias<'a>(
    scope: &'a Scope,
    parent: Option<&'a ScopeChain<'a>>,
    alias: &str,
) -> Option<&'a AliasBinding> {
    scope
        .lookup_local(alias)
        .or_else(|| parent.and_then(|p| p.lookup(alias)))
}

/// Get-or-create the join for one association segment. The dedup key is
/// (base alias, property name): the same path prefix always shares a join.
#[allow(clippy::too_many_arguments)]
pub(crate) fn association_join(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    base_alias: &str,
    fk_owner_alias: &str,
    owner_entity: &str,
    property: &str,
    target_entity: &str,
    kind: AssociationKind,
    join: &AssociationJoin,
    requested: JoinKind,
    explicit_alias: Option<&str>,
) -> Result<String, ResolverError> {
    if let Some(existing) = scope.implicit_join_alias(base_alias, property) {
        return Ok(existing.clone());
    }

    let target = ctx
        .catalog
        .entity(target_entity)
        .ok_or_else(|| ResolverError::UnknownEntity(target_entity.to_string()))?;
    let target_id_col = target.id.first_column().to_string();
    let target_id_type = target.id.sql_type();
    let target_source = table_source_for(ctx.catalog, target_entity);

    let owner_id_col = id_mapping(ctx.catalog, owner_entity)
        .map(|id| id.first_column().to_string())
        .unwrap_or_else(|| "id".to_string());
    let owner_id_type = id_mapping(ctx.catalog, owner_entity).and_then(|id| id.sql_type());

    let alias = match explicit_alias {
        Some(a) => a.to_string(),
        None => ctx.next_alias(property),
    };

    match join {
        AssociationJoin::ForeignKey { fk_column } => {
            let on = match kind {
                AssociationKind::ManyToOne | AssociationKind::OneToOne => equality(
                    column(&alias, &target_id_col, target_id_type),
                    column(fk_owner_alias, fk_column, target_id_type),
                ),
                // FK on the target side (one-to-many mapped by a child
                // column, or an inverse one-to-one).
                AssociationKind::OneToMany | AssociationKind::ManyToMany => equality(
                    column(&alias, fk_column, owner_id_type),
                    column(base_alias, &owner_id_col, owner_id_type),
                ),
            };
            scope.push_join(ResolvedJoin {
                kind: requested,
                source: target_source,
                alias: alias.clone(),
                on,
                with: None,
            });
        }
        AssociationJoin::JoinTable {
            table,
            owner_fk,
            target_fk,
        } => {
            let jt_alias = ctx.next_alias(&format!("{}_jt", property));
            scope.push_join(ResolvedJoin {
                kind: requested,
                source: TableSource::Table(table.clone()),
                alias: jt_alias.clone(),
                on: equality(
                    column(&jt_alias, owner_fk, owner_id_type),
                    column(base_alias, &owner_id_col, owner_id_type),
                ),
                with: None,
            });
            scope.push_join(ResolvedJoin {
                kind: requested,
                source: target_source,
                alias: alias.clone(),
                on: equality(
                    column(&alias, &target_id_col, target_id_type),
                    column(&jt_alias, target_fk, target_id_type),
                ),
                with: None,
            });
        }
    }

    scope.record_implicit_join(base_alias, property, &alias);
    Ok(alias)
}

/// Joined-strategy inherited columns live on the ancestor table; reuse or
/// create the supertype join for `alias`.
pub(crate) fn column_owner_alias(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    alias: &str,
    entity: &str,
    declaring: &str,
) -> Result<String, ResolverError> {
    if declaring == entity {
        return Ok(alias.to_string());
    }
    let entity_desc = ctx
        .catalog
        .entity(entity)
        .ok_or_else(|| ResolverError::UnknownEntity(entity.to_string()))?;
    if entity_desc.strategy != InheritanceStrategy::Joined {
        // Single-table and table-per-class keep inherited columns on the
        // entity's own table.
        return Ok(alias.to_string());
    }

    let key = format!("#super:{}", declaring);
    if let Some(existing) = scope.implicit_join_alias(alias, &key) {
        return Ok(existing.clone());
    }

    let declaring_desc = ctx
        .catalog
        .entity(declaring)
        .ok_or_else(|| ResolverError::UnknownEntity(declaring.to_string()))?;
    let id_col = id_mapping(ctx.catalog, entity)
        .map(|id| id.first_column().to_string())
        .unwrap_or_else(|| "id".to_string());
    let id_type = id_mapping(ctx.catalog, entity).and_then(|id| id.sql_type());

    let super_alias = ctx.next_alias(&declaring.to_ascii_lowercase());
    scope.push_join(ResolvedJoin {
        kind: JoinKind::Inner,
        source: TableSource::Table(declaring_desc.table.clone()),
        alias: super_alias.clone(),
        on: equality(
            column(&super_alias, &id_col, id_type),
            column(alias, &id_col, id_type),
        ),
        with: None,
    });
    scope.record_implicit_join(alias, &key, &super_alias);
    Ok(super_alias)
}

/// Narrow `alias` (static type `entity`) to `subtype`. Joined hierarchies
/// get the subtype table join; single-table ones a discriminator filter.
pub(crate) fn apply_treat(
    ctx: &mut ResolverCtx<'_>,
    scope: &mut Scope,
    alias: &str,
    entity: &str,
    subtype: &str,
    explicit_alias: Option<&str>,
) -> Result<String, ResolverError> {
    let subtype_desc = ctx
        .catalog
        .entity_by_class(subtype)
        .ok_or_else(|| ResolverError::UnknownEntity(subtype.to_string()))?;
    let subtype_name = subtype_desc.name.clone();
    if !ctx.catalog.is_subtype_of(&subtype_name, entity) {
        return Err(ResolverError::InvalidTreatTarget {
            entity: entity.to_string(),
            subtype: subtype_name,
        });
    }
    if subtype_name == entity {
        return Ok(alias.to_string());
    }

    match subtype_desc.strategy {
        InheritanceStrategy::Joined => {
            let key = format!("#treat:{}", subtype_name);
            if let Some(existing) = scope.implicit_join_alias(alias, &key) {
                return Ok(existing.clone());
            }
            let id_col = id_mapping(ctx.catalog, entity)
                .map(|id| id.first_column().to_string())
                .unwrap_or_else(|| "id".to_string());
            let id_type = id_mapping(ctx.catalog, entity).and_then(|id| id.sql_type());
            let table = subtype_desc.table.clone();
            let treat_alias = match explicit_alias {
                Some(a) => a.to_string(),
                None => ctx.next_alias(&subtype_name.to_ascii_lowercase()),
            };
            scope.push_join(ResolvedJoin {
                kind: JoinKind::Inner,
                source: TableSource::Table(table),
                alias: treat_alias.clone(),
                on: equality(
                    column(&treat_alias, &id_col, id_type),
                    column(alias, &id_col, id_type),
                ),
                with: None,
            });
            scope.record_implicit_join(alias, &key, &treat_alias);
            Ok(treat_alias)
        }
        InheritanceStrategy::SingleTable => {
            let key = format!("#treat_filter:{}", subtype_name);
            if scope.implicit_join_alias(alias, &key).is_none() {
                if let Some(filter) =
                    discriminator_filter(ctx.catalog, alias, &subtype_name)
                {
                    scope.filters.push(filter);
                }
                scope.record_implicit_join(alias, &key, alias);
            }
            Ok(alias.to_string())
        }
        InheritanceStrategy::TablePerClass => {
            Err(ResolverError::UnsupportedTreatStrategy(subtype_name))
        }
    }
}

/// Discriminator restriction for a single-table entity: matches the entity
/// and all of its subtypes. None when the entity is the hierarchy root.
pub(crate) fn discriminator_filter(
    catalog: &EntityCatalog,
    alias: &str,
    entity: &str,
) -> Option<ResolvedExpr> {
    let values = catalog.discriminator_values(entity);
    if values.is_empty() {
        return None;
    }
    let disc_column = catalog
        .hierarchy_root(entity)
        .and_then(|root| root.discriminator_column.clone())?;
    let column_ref = ResolvedExpr::Column(ColumnRef {
        alias: alias.to_string(),
        column: disc_column,
        sql_type: Some(crate::entity_catalog::SqlType::String),
        nullable: false,
    });
    if values.len() == 1 {
        return Some(equality(
            column_ref,
            ResolvedExpr::Literal(LiteralValue::String(values.into_iter().next().unwrap())),
        ));
    }
    Some(ResolvedExpr::In {
        negated: false,
        expr: Box::new(column_ref),
        list: super::plan::ResolvedInList::Items(
            values
                .into_iter()
                .map(|v| ResolvedExpr::Literal(LiteralValue::String(v)))
                .collect(),
        ),
    })
}

/// Table source for an entity alias: a union-all for polymorphic
/// table-per-class roots, otherwise the plain table.
pub(crate) fn table_source_for(catalog: &EntityCatalog, entity: &str) -> TableSource {
    let desc = match catalog.entity(entity) {
        Some(d) => d,
        None => return TableSource::Table(entity.to_string()),
    };
    if desc.strategy == InheritanceStrategy::TablePerClass && !desc.children.is_empty() {
        let columns = visible_columns(catalog, entity);
        let branches = catalog
            .concrete_tables(entity)
            .into_iter()
            .map(|(entity, table)| super::plan::UnionBranch {
                entity,
                table,
                columns: columns.clone(),
            })
            .collect();
        return TableSource::UnionAll { branches };
    }
    TableSource::Table(desc.table.clone())
}

/// Columns visible on an entity: identifier first, then own and inherited
/// basic/embedded/FK columns in declaration order (ancestors first).
pub(crate) fn visible_columns(catalog: &EntityCatalog, entity: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = catalog.entity(entity);
    while let Some(desc) = current {
        chain.push(desc);
        current = desc.parent.as_deref().and_then(|p| catalog.entity(p));
    }
    chain.reverse();

    let mut columns = Vec::new();
    if let Some(root_id) = id_mapping(catalog, entity) {
        for col in root_id.columns() {
            columns.push(col.to_string());
        }
    }
    for desc in chain {
        for prop in &desc.properties {
            match &prop.kind {
                PropertyKind::Basic { column, .. } => columns.push(column.clone()),
                PropertyKind::Embedded { fields } => {
                    columns.extend(fields.iter().map(|f| f.column.clone()))
                }
                PropertyKind::Association {
                    kind,
                    join: AssociationJoin::ForeignKey { fk_column },
                    ..
                } if matches!(
                    kind,
                    AssociationKind::ManyToOne | AssociationKind::OneToOne
                ) =>
                {
                    columns.push(fk_column.clone())
                }
                _ => {}
            }
        }
    }
    columns
}

pub(crate) fn column(
    alias: &str,
    name: &str,
    sql_type: Option<crate::entity_catalog::SqlType>,
) -> ResolvedExpr {
    ResolvedExpr::Column(ColumnRef {
        alias: alias.to_string(),
        column: name.to_string(),
        sql_type,
        nullable: false,
    })
}

pub(crate) fn equality(left: ResolvedExpr, right: ResolvedExpr) -> ResolvedExpr {
    ResolvedExpr::Op {
        operator: SqlOperator::Eq,
        operands: vec![left, right],
    }
}
