use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ResolverError {
    #[error("Unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("Unknown alias or unresolvable property '{name}' in path '{path}'")]
    UnresolvablePath { name: String, path: String },

    #[error("Duplicate alias '{0}' in the same query scope")]
    DuplicateAlias(String),

    #[error("Property '{property}' is not declared on '{entity}' or its supertypes; it exists on subtype '{subtype}' (use treat(... as {subtype}))")]
    IllegalSubtypeAccess {
        entity: String,
        property: String,
        subtype: String,
    },

    #[error("'{subtype}' is not a subtype of '{entity}'")]
    InvalidTreatTarget { entity: String, subtype: String },

    #[error("Path '{0}' navigates through a collection-valued association; join it explicitly")]
    ImplicitCollectionJoin(String),

    #[error("Collection-valued path '{0}' cannot be used as a value here")]
    CollectionValuedPath(String),

    #[error("Path '{path}' is not a collection ('{property}' is single-valued)")]
    NotACollection { path: String, property: String },

    #[error("Unable to infer a type for {context}: no typed operand anchors the bound parameter(s); add an explicit cast")]
    AmbiguousParameter { context: String },

    #[error("Unknown cast target type '{0}'")]
    UnknownCastTarget(String),

    #[error("Unqualified property '{0}' is ambiguous across multiple from-clause roots")]
    AmbiguousUnqualifiedProperty(String),

    #[error("'{function}' requires a collection alias; '{alias}' is not one")]
    NotACollectionAlias { function: String, alias: String },

    #[error("Collection alias '{alias}' has no {what} column mapped")]
    MissingCollectionColumn { alias: String, what: String },

    #[error("treat over a table-per-class hierarchy is not supported for '{0}'")]
    UnsupportedTreatStrategy(String),

    #[error("'{0}' is only supported inside membership predicates (in/member of)")]
    UnsupportedCollectionContext(String),

    #[error("Bulk {statement} may target only a single entity; '{property}' is an association path")]
    IllegalBulkPath { statement: String, property: String },
}
