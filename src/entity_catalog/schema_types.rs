use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::custom_type::ScalarCodec;

/// SQL-level scalar type attached to columns and inferred for parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    String,
    Integer,
    Long,
    Float,
    Double,
    BigDecimal,
    BigInteger,
    Boolean,
    Date,
    Timestamp,
    Binary,
}

impl SqlType {
    /// Map a mapping-file / cast-target type name to a SqlType.
    ///
    /// Accepts the short names used in queries (`string`, `long`, ...) as
    /// well as fully qualified class names (`java.lang.String`,
    /// `java.math.BigDecimal`) so `cast(x as java.lang.String)` resolves the
    /// same way as `cast(x as string)`.
    pub fn from_type_name(name: &str) -> Option<SqlType> {
        let short = name.rsplit('.').next().unwrap_or(name);
        match short.to_ascii_lowercase().as_str() {
            "string" | "text" | "character" | "char" => Some(SqlType::String),
            "integer" | "int" => Some(SqlType::Integer),
            "long" => Some(SqlType::Long),
            "float" => Some(SqlType::Float),
            "double" => Some(SqlType::Double),
            "bigdecimal" | "big_decimal" => Some(SqlType::BigDecimal),
            "biginteger" | "big_integer" => Some(SqlType::BigInteger),
            "boolean" | "bool" => Some(SqlType::Boolean),
            "date" => Some(SqlType::Date),
            "timestamp" | "datetime" => Some(SqlType::Timestamp),
            "binary" | "blob" => Some(SqlType::Binary),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SqlType::Integer
                | SqlType::Long
                | SqlType::Float
                | SqlType::Double
                | SqlType::BigDecimal
                | SqlType::BigInteger
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::String => "string",
            SqlType::Integer => "integer",
            SqlType::Long => "long",
            SqlType::Float => "float",
            SqlType::Double => "double",
            SqlType::BigDecimal => "big_decimal",
            SqlType::BigInteger => "big_integer",
            SqlType::Boolean => "boolean",
            SqlType::Date => "date",
            SqlType::Timestamp => "timestamp",
            SqlType::Binary => "binary",
        };
        write!(f, "{}", name)
    }
}

/// How a hierarchy maps classes to tables. Fixed at the hierarchy root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritanceStrategy {
    SingleTable,
    Joined,
    TablePerClass,
}

impl fmt::Display for InheritanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InheritanceStrategy::SingleTable => "single_table",
            InheritanceStrategy::Joined => "joined",
            InheritanceStrategy::TablePerClass => "table_per_class",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

impl AssociationKind {
    /// Many-valued associations bind collection aliases; single-valued ones
    /// can terminate a path expression.
    pub fn is_collection(&self) -> bool {
        matches!(self, AssociationKind::OneToMany | AssociationKind::ManyToMany)
    }
}

/// Physical join metadata for an association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationJoin {
    /// Foreign key held on the owning side (many-to-one, one-to-one) or on
    /// the target side (one-to-many mapped by a column on the child table).
    ForeignKey { fk_column: String },
    /// Intermediate join table (many-to-many, or one-to-many via a bridge).
    JoinTable {
        table: String,
        owner_fk: String,
        target_fk: String,
    },
}

/// One column of an embedded value or a composite identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedField {
    pub name: String,
    pub column: String,
    pub sql_type: SqlType,
}

#[derive(Debug, Clone)]
pub enum PropertyKind {
    Basic {
        column: String,
        sql_type: SqlType,
        nullable: bool,
        /// Optional custom column codec registered in the catalog.
        codec: Option<String>,
    },
    /// Embedded value: decomposes into its fields in declared order.
    Embedded { fields: Vec<EmbeddedField> },
    Association {
        target_entity: String,
        kind: AssociationKind,
        join: AssociationJoin,
        nullable: bool,
    },
    /// Collection of basic values (or map entries) persisted in its own table.
    ElementCollection {
        table: String,
        owner_fk: String,
        element_column: String,
        element_type: SqlType,
        /// List index column, when the collection is ordered.
        index_column: Option<String>,
        /// Map key column and type, when the collection is a map.
        key_column: Option<String>,
        key_type: Option<SqlType>,
    },
}

#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: PropertyKind,
}

impl PropertyDescriptor {
    pub fn is_association(&self) -> bool {
        matches!(self.kind, PropertyKind::Association { .. })
    }

    pub fn is_collection_valued(&self) -> bool {
        match &self.kind {
            PropertyKind::Association { kind, .. } => kind.is_collection(),
            PropertyKind::ElementCollection { .. } => true,
            _ => false,
        }
    }
}

/// Identifier mapping: a single column or an ordered set of columns.
#[derive(Debug, Clone)]
pub enum IdentifierMapping {
    Single {
        property: String,
        column: String,
        sql_type: SqlType,
    },
    Composite { fields: Vec<EmbeddedField> },
}

impl IdentifierMapping {
    pub fn property_name(&self) -> &str {
        match self {
            IdentifierMapping::Single { property, .. } => property,
            IdentifierMapping::Composite { .. } => "id",
        }
    }

    /// All identifier columns, in declared order.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            IdentifierMapping::Single { column, .. } => vec![column.as_str()],
            IdentifierMapping::Composite { fields } => {
                fields.iter().map(|f| f.column.as_str()).collect()
            }
        }
    }

    /// The first identifier column; used for null tests where any component
    /// being null means the row is absent.
    pub fn first_column(&self) -> &str {
        match self {
            IdentifierMapping::Single { column, .. } => column,
            IdentifierMapping::Composite { fields } => &fields[0].column,
        }
    }

    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            IdentifierMapping::Single { sql_type, .. } => Some(*sql_type),
            IdentifierMapping::Composite { .. } => None,
        }
    }
}

/// Immutable mapping of one entity class to its table(s).
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub name: String,
    pub table: String,
    pub id: IdentifierMapping,
    pub strategy: InheritanceStrategy,
    pub parent: Option<String>,
    pub children: Vec<String>,
    /// Single-table hierarchies only.
    pub discriminator_column: Option<String>,
    pub discriminator_value: Option<String>,
    /// Declaration order preserved; composite decomposition depends on it.
    pub properties: Vec<PropertyDescriptor>,
}

impl EntityDescriptor {
    /// Look up a property declared directly on this entity (not inherited).
    pub fn declared_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        if name == self.id.property_name() {
            return None; // identifier handled separately by the catalog
        }
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_hierarchy_member(&self) -> bool {
        self.parent.is_some() || !self.children.is_empty()
    }
}

/// The Schema Model: built once, read-only afterwards. Concurrent reads are
/// safe; the resolver and generator hold `&EntityCatalog` only.
#[derive(Clone, Default)]
pub struct EntityCatalog {
    entities: HashMap<String, EntityDescriptor>,
    codecs: HashMap<String, Arc<dyn ScalarCodec>>,
    /// Mapping-file version string; participates in translation cache keys.
    pub version: String,
}

impl fmt::Debug for EntityCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCatalog")
            .field("entities", &self.entities.keys().collect::<Vec<_>>())
            .field("codecs", &self.codecs.keys().collect::<Vec<_>>())
            .field("version", &self.version)
            .finish()
    }
}

impl EntityCatalog {
    pub fn new(
        entities: HashMap<String, EntityDescriptor>,
        codecs: HashMap<String, Arc<dyn ScalarCodec>>,
        version: String,
    ) -> Self {
        EntityCatalog {
            entities,
            codecs,
            version,
        }
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entities.get(name)
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(|s| s.as_str())
    }

    /// Resolve an entity by short name or fully qualified class name, as
    /// used by `cast(... as com.acme.Person)` and `select new` targets.
    pub fn entity_by_class(&self, class_name: &str) -> Option<&EntityDescriptor> {
        if let Some(e) = self.entities.get(class_name) {
            return Some(e);
        }
        let short = class_name.rsplit('.').next()?;
        self.entities.get(short)
    }

    pub fn codec(&self, name: &str) -> Option<&Arc<dyn ScalarCodec>> {
        self.codecs.get(name)
    }

    /// Look up `property` on `entity`, walking the inheritance chain upward.
    /// Returns the declaring entity together with the descriptor.
    pub fn property(
        &self,
        entity: &str,
        property: &str,
    ) -> Option<(&EntityDescriptor, &PropertyDescriptor)> {
        let mut current = self.entities.get(entity)?;
        loop {
            if let Some(p) = current.declared_property(property) {
                return Some((current, p));
            }
            match &current.parent {
                Some(parent) => current = self.entities.get(parent)?,
                None => return None,
            }
        }
    }

    /// True when `property` resolves on `entity` or any of its ancestors.
    pub fn has_property(&self, entity: &str, property: &str) -> bool {
        self.property(entity, property).is_some()
    }

    /// True when the name is the identifier property of `entity` (possibly
    /// declared on an ancestor in a joined hierarchy).
    pub fn is_identifier(&self, entity: &str, property: &str) -> bool {
        let mut current = match self.entities.get(entity) {
            Some(e) => e,
            None => return false,
        };
        loop {
            if current.id.property_name() == property {
                return true;
            }
            match &current.parent {
                Some(parent) => match self.entities.get(parent) {
                    Some(p) => current = p,
                    None => return false,
                },
                None => return false,
            }
        }
    }

    /// Transitive subtypes of `entity`, not including itself.
    pub fn subtypes(&self, entity: &str) -> Vec<&EntityDescriptor> {
        let mut out = Vec::new();
        let mut stack: Vec<&str> = match self.entities.get(entity) {
            Some(e) => e.children.iter().map(|c| c.as_str()).collect(),
            None => return out,
        };
        while let Some(name) = stack.pop() {
            if let Some(child) = self.entities.get(name) {
                stack.extend(child.children.iter().map(|c| c.as_str()));
                out.push(child);
            }
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Is `candidate` equal to, or a transitive subtype of, `base`?
    pub fn is_subtype_of(&self, candidate: &str, base: &str) -> bool {
        if candidate == base {
            return true;
        }
        let mut current = match self.entities.get(candidate) {
            Some(e) => e,
            None => return false,
        };
        while let Some(parent) = &current.parent {
            if parent == base {
                return true;
            }
            match self.entities.get(parent) {
                Some(p) => current = p,
                None => return false,
            }
        }
        false
    }

    /// Does any transitive subtype of `base` declare `property`? Used to
    /// distinguish "needs treat" from plain unresolvable in diagnostics.
    pub fn subtype_declaring(&self, base: &str, property: &str) -> Option<&EntityDescriptor> {
        self.subtypes(base)
            .into_iter()
            .find(|sub| sub.declared_property(property).is_some())
    }

    /// Topmost ancestor of the hierarchy containing `entity`.
    pub fn hierarchy_root<'a>(&'a self, entity: &str) -> Option<&'a EntityDescriptor> {
        let mut current = self.entities.get(entity)?;
        while let Some(parent) = &current.parent {
            current = self.entities.get(parent)?;
        }
        Some(current)
    }

    /// Tables to union for a table-per-class polymorphic query: the queried
    /// entity's own table plus every transitive subtype table. Sorted so the
    /// generated union is deterministic.
    pub fn concrete_tables(&self, entity: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(e) = self.entities.get(entity) {
            out.push((e.name.clone(), e.table.clone()));
        }
        for sub in self.subtypes(entity) {
            out.push((sub.name.clone(), sub.table.clone()));
        }
        out.sort();
        out
    }

    /// Discriminator values matched by a query against `entity`: its own
    /// value plus every transitive subtype's. Empty when the entity is the
    /// hierarchy root (all rows qualify, no predicate needed).
    pub fn discriminator_values(&self, entity: &str) -> Vec<String> {
        let desc = match self.entities.get(entity) {
            Some(e) => e,
            None => return Vec::new(),
        };
        if desc.parent.is_none() {
            return Vec::new();
        }
        let mut values = Vec::new();
        if let Some(v) = &desc.discriminator_value {
            values.push(v.clone());
        }
        for sub in self.subtypes(entity) {
            if let Some(v) = &sub.discriminator_value {
                values.push(v.clone());
            }
        }
        values.sort();
        values
    }
}
