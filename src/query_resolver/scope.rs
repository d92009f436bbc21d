//! Query scopes: alias bindings for one query level, chained for
//! correlated subqueries. Variable lookup walks current → parent → root.

use std::collections::HashMap;

use crate::entity_catalog::SqlType;

use super::plan::{FromTable, ResolvedJoin};

/// What a collection alias exposes: the element column plus optional map
/// key / list index columns, all on the collection-table join alias.
#[derive(Debug, Clone)]
pub(crate) struct CollectionElementBinding {
    pub element_column: String,
    pub element_type: SqlType,
    pub key_column: Option<String>,
    pub key_type: Option<SqlType>,
    pub index_column: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) enum AliasBinding {
    /// Alias over an entity table (from root, association join, treat).
    Entity {
        entity: String,
        /// Introduced by a left join: paths through it stay optional.
        optional: bool,
    },
    /// Alias over an element-collection table.
    CollectionElement {
        binding: CollectionElementBinding,
        optional: bool,
    },
}

impl AliasBinding {
    pub fn is_optional(&self) -> bool {
        match self {
            AliasBinding::Entity { optional, .. } => *optional,
            AliasBinding::CollectionElement { optional, .. } => *optional,
        }
    }
}

/// One query level's aliases, from-tables, joins, and implicit-join dedup
/// map. Subqueries get their own scope with a parent pointer for
/// correlation.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    aliases: HashMap<String, AliasBinding>,
    /// (base alias, path key) → join alias. The same path prefix used
    /// twice resolves to the same join.
    implicit_joins: HashMap<(String, String), String>,
    /// From-clause root aliases, in declaration order. Unqualified
    /// properties resolve against these.
    pub roots: Vec<String>,
    pub from: Vec<FromTable>,
    pub joins: Vec<ResolvedJoin>,
    /// Predicates injected by resolution (discriminators, treat
    /// narrowing); ANDed into the where clause.
    pub filters: Vec<super::plan::ResolvedExpr>,
}

impl Scope {
    pub fn declare(&mut self, alias: &str, binding: AliasBinding) -> Result<(), String> {
        if self.aliases.contains_key(alias) {
            return Err(alias.to_string());
        }
        self.aliases.insert(alias.to_string(), binding);
        Ok(())
    }

    /// Rebind an alias in place (treat narrowing of an existing alias).
    pub fn rebind(&mut self, alias: &str, binding: AliasBinding) {
        self.aliases.insert(alias.to_string(), binding);
    }

    pub fn lookup_local(&self, alias: &str) -> Option<&AliasBinding> {
        self.aliases.get(alias)
    }

    pub fn implicit_join_alias(&self, base: &str, path_key: &str) -> Option<&String> {
        self.implicit_joins
            .get(&(base.to_string(), path_key.to_string()))
    }

    pub fn record_implicit_join(&mut self, base: &str, path_key: &str, alias: &str) {
        self.implicit_joins
            .insert((base.to_string(), path_key.to_string()), alias.to_string());
    }

    pub fn push_join(&mut self, join: ResolvedJoin) {
        self.joins.push(join);
    }
}

/// Immutable view of the enclosing scopes for correlated lookup.
pub(crate) struct ScopeChain<'a> {
    pub parent: Option<&'a ScopeChain<'a>>,
    pub scope: &'a Scope,
}

impl<'a> ScopeChain<'a> {
    pub fn lookup(&self, alias: &str) -> Option<&AliasBinding> {
        if let Some(binding) = self.scope.lookup_local(alias) {
            return Some(binding);
        }
        self.parent.and_then(|p| p.lookup(alias))
    }
}
