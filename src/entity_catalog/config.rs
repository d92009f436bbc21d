/// Entity mapping configuration.
///
/// Mappings are defined in YAML:
///
/// ```yaml
/// name: zoo_domain
/// version: "1"
/// entities:
///   - name: Animal
///     table: animal
///     id: { property: id, column: id, type: long }
///     properties:
///       - { name: description, column: description, type: string }
///       - { name: mother, kind: many_to_one, target: Animal, fk_column: mother_id, nullable: true }
///   - name: Human
///     extends: Animal
///     table: human
///     strategy: joined
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::custom_type::ScalarCodec;
use super::errors::CatalogError;
use super::schema_types::{
    AssociationJoin, AssociationKind, EmbeddedField, EntityCatalog, EntityDescriptor,
    IdentifierMapping, InheritanceStrategy, PropertyDescriptor, PropertyKind, SqlType,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub entities: Vec<EntityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub id: Option<IdConfig>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub strategy: Option<InheritanceStrategy>,
    #[serde(default)]
    pub discriminator: Option<DiscriminatorConfig>,
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
}

/// Identifier: single column or composite field list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdConfig {
    Composite { fields: Vec<FieldConfig> },
    Single {
        #[serde(default = "default_id_property")]
        property: String,
        column: String,
        #[serde(rename = "type", default = "default_id_type")]
        sql_type: String,
    },
}

fn default_id_property() -> String {
    "id".to_string()
}

fn default_id_type() -> String {
    "long".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub column: String,
    #[serde(rename = "type")]
    pub sql_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscriminatorConfig {
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub name: String,
    /// basic | embedded | one_to_one | many_to_one | one_to_many |
    /// many_to_many | element_collection. Defaults to basic.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(rename = "type", default)]
    pub sql_type: Option<String>,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub codec: Option<String>,
    // association fields
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub fk_column: Option<String>,
    #[serde(default)]
    pub join_table: Option<JoinTableConfig>,
    // embedded fields
    #[serde(default)]
    pub fields: Option<Vec<FieldConfig>>,
    // element collection fields
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub owner_fk: Option<String>,
    #[serde(default)]
    pub element_column: Option<String>,
    #[serde(default)]
    pub element_type: Option<String>,
    #[serde(default)]
    pub index_column: Option<String>,
    #[serde(default)]
    pub key_column: Option<String>,
    #[serde(default)]
    pub key_type: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinTableConfig {
    pub table: String,
    pub owner_fk: String,
    pub target_fk: String,
}

/// Load and build a catalog from a YAML mapping file.
pub fn load_catalog(path: &Path) -> Result<EntityCatalog, CatalogError> {
    let text = fs::read_to_string(path).map_err(|e| CatalogError::FileRead {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_catalog(&text, HashMap::new())
}

/// Parse a YAML mapping and build the catalog, registering the supplied
/// custom codecs.
pub fn parse_catalog(
    yaml: &str,
    codecs: HashMap<String, Arc<dyn ScalarCodec>>,
) -> Result<EntityCatalog, CatalogError> {
    let config: MappingConfig =
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::InvalidYaml(e.to_string()))?;
    build_catalog(config, codecs)
}

pub fn build_catalog(
    config: MappingConfig,
    codecs: HashMap<String, Arc<dyn ScalarCodec>>,
) -> Result<EntityCatalog, CatalogError> {
    let mut entities: HashMap<String, EntityDescriptor> = HashMap::new();

    // First pass: build descriptors without hierarchy links.
    for entity_cfg in &config.entities {
        if entities.contains_key(&entity_cfg.name) {
            return Err(CatalogError::DuplicateEntity(entity_cfg.name.clone()));
        }
        let descriptor = build_entity(entity_cfg, &codecs)?;
        entities.insert(entity_cfg.name.clone(), descriptor);
    }

    // Second pass: resolve parents, children, strategies, associations.
    for entity_cfg in &config.entities {
        if let Some(parent) = &entity_cfg.extends {
            if !entities.contains_key(parent) {
                return Err(CatalogError::UnknownParent {
                    entity: entity_cfg.name.clone(),
                    parent: parent.clone(),
                });
            }
            entities
                .get_mut(parent)
                .map(|p| p.children.push(entity_cfg.name.clone()));
        }
        for prop in &entity_cfg.properties {
            if let Some(target) = &prop.target {
                if !entities.contains_key(target) {
                    return Err(CatalogError::UnknownAssociationTarget {
                        entity: entity_cfg.name.clone(),
                        property: prop.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
    }

    validate_hierarchies(&mut entities)?;

    let version = config.version.unwrap_or_else(|| "0".to_string());
    log::debug!(
        "built entity catalog '{}' v{} with {} entities",
        config.name.as_deref().unwrap_or("unnamed"),
        version,
        entities.len()
    );
    Ok(EntityCatalog::new(entities, codecs, version))
}

fn build_entity(
    cfg: &EntityConfig,
    codecs: &HashMap<String, Arc<dyn ScalarCodec>>,
) -> Result<EntityDescriptor, CatalogError> {
    let id = match &cfg.id {
        Some(IdConfig::Single {
            property,
            column,
            sql_type,
        }) => IdentifierMapping::Single {
            property: property.clone(),
            column: column.clone(),
            sql_type: parse_sql_type(&cfg.name, property, sql_type)?,
        },
        Some(IdConfig::Composite { fields }) => IdentifierMapping::Composite {
            fields: build_fields(&cfg.name, fields)?,
        },
        // Subclasses inherit the root identifier; standalone entities get
        // the conventional single "id" column.
        None => IdentifierMapping::Single {
            property: "id".to_string(),
            column: "id".to_string(),
            sql_type: SqlType::Long,
        },
    };

    let mut properties = Vec::with_capacity(cfg.properties.len());
    for prop in &cfg.properties {
        properties.push(build_property(&cfg.name, prop, codecs)?);
    }

    Ok(EntityDescriptor {
        name: cfg.name.clone(),
        table: cfg.table.clone(),
        id,
        strategy: cfg.strategy.unwrap_or(InheritanceStrategy::SingleTable),
        parent: cfg.extends.clone(),
        children: Vec::new(),
        discriminator_column: cfg.discriminator.as_ref().and_then(|d| d.column.clone()),
        discriminator_value: cfg.discriminator.as_ref().and_then(|d| d.value.clone()),
        properties,
    })
}

fn build_property(
    entity: &str,
    cfg: &PropertyConfig,
    codecs: &HashMap<String, Arc<dyn ScalarCodec>>,
) -> Result<PropertyDescriptor, CatalogError> {
    if let Some(codec) = &cfg.codec {
        if !codecs.contains_key(codec) {
            return Err(CatalogError::UnknownCodec {
                entity: entity.to_string(),
                property: cfg.name.clone(),
                codec: codec.clone(),
            });
        }
    }

    let kind = match cfg.kind.as_deref().unwrap_or("basic") {
        "basic" => PropertyKind::Basic {
            column: cfg.column.clone().unwrap_or_else(|| cfg.name.clone()),
            sql_type: parse_sql_type(
                entity,
                &cfg.name,
                cfg.sql_type.as_deref().unwrap_or("string"),
            )?,
            nullable: cfg.nullable,
            codec: cfg.codec.clone(),
        },
        "embedded" => PropertyKind::Embedded {
            fields: build_fields(entity, cfg.fields.as_deref().unwrap_or(&[]))?,
        },
        kind @ ("one_to_one" | "many_to_one" | "one_to_many" | "many_to_many") => {
            let assoc_kind = match kind {
                "one_to_one" => AssociationKind::OneToOne,
                "many_to_one" => AssociationKind::ManyToOne,
                "one_to_many" => AssociationKind::OneToMany,
                _ => AssociationKind::ManyToMany,
            };
            let join = match (&cfg.join_table, &cfg.fk_column) {
                (Some(jt), _) => AssociationJoin::JoinTable {
                    table: jt.table.clone(),
                    owner_fk: jt.owner_fk.clone(),
                    target_fk: jt.target_fk.clone(),
                },
                (None, Some(fk)) => AssociationJoin::ForeignKey {
                    fk_column: fk.clone(),
                },
                (None, None) => {
                    return Err(CatalogError::UnknownPropertyType {
                        entity: entity.to_string(),
                        property: cfg.name.clone(),
                        type_name: format!("{} without fk_column or join_table", kind),
                    })
                }
            };
            PropertyKind::Association {
                target_entity: cfg.target.clone().unwrap_or_default(),
                kind: assoc_kind,
                join,
                nullable: cfg.nullable,
            }
        }
        "element_collection" => {
            let missing = |field: &str| CatalogError::UnknownPropertyType {
                entity: entity.to_string(),
                property: cfg.name.clone(),
                type_name: format!("element_collection missing '{}'", field),
            };
            PropertyKind::ElementCollection {
                table: cfg.table.clone().ok_or_else(|| missing("table"))?,
                owner_fk: cfg.owner_fk.clone().ok_or_else(|| missing("owner_fk"))?,
                element_column: cfg
                    .element_column
                    .clone()
                    .ok_or_else(|| missing("element_column"))?,
                element_type: parse_sql_type(
                    entity,
                    &cfg.name,
                    cfg.element_type.as_deref().unwrap_or("string"),
                )?,
                index_column: cfg.index_column.clone(),
                key_column: cfg.key_column.clone(),
                key_type: match &cfg.key_type {
                    Some(t) => Some(parse_sql_type(entity, &cfg.name, t)?),
                    None => None,
                },
            }
        }
        other => {
            return Err(CatalogError::UnknownPropertyType {
                entity: entity.to_string(),
                property: cfg.name.clone(),
                type_name: other.to_string(),
            })
        }
    };

    Ok(PropertyDescriptor {
        name: cfg.name.clone(),
        kind,
    })
}

fn build_fields(entity: &str, fields: &[FieldConfig]) -> Result<Vec<EmbeddedField>, CatalogError> {
    fields
        .iter()
        .map(|f| {
            Ok(EmbeddedField {
                name: f.name.clone(),
                column: f.column.clone(),
                sql_type: parse_sql_type(entity, &f.name, &f.sql_type)?,
            })
        })
        .collect()
}

fn parse_sql_type(entity: &str, property: &str, name: &str) -> Result<SqlType, CatalogError> {
    SqlType::from_type_name(name).ok_or_else(|| CatalogError::UnknownPropertyType {
        entity: entity.to_string(),
        property: property.to_string(),
        type_name: name.to_string(),
    })
}

/// Enforce that every hierarchy uses the strategy of its root, detect
/// extends cycles, and check single-table subclasses carry a discriminator
/// value.
fn validate_hierarchies(
    entities: &mut HashMap<String, EntityDescriptor>,
) -> Result<(), CatalogError> {
    let names: Vec<String> = entities.keys().cloned().collect();
    for name in &names {
        // Walk to the root, bounded by the entity count to catch cycles.
        let mut current = name.clone();
        let mut hops = 0usize;
        while let Some(parent) = entities.get(&current).and_then(|e| e.parent.clone()) {
            hops += 1;
            if hops > entities.len() {
                return Err(CatalogError::InheritanceCycle {
                    entity: name.clone(),
                });
            }
            current = parent;
        }
        let root = entities
            .get(&current)
            .ok_or_else(|| CatalogError::InconsistentHierarchy(current.clone()))?;
        let root_strategy = root.strategy;
        let root_table = root.table.clone();

        let entity = entities
            .get_mut(name)
            .ok_or_else(|| CatalogError::InconsistentHierarchy(name.clone()))?;
        if entity.parent.is_some() {
            if entity.strategy != root_strategy {
                // A subclass that omitted the strategy defaulted to
                // single_table; inherit the root's instead of erroring.
                if entity.strategy == InheritanceStrategy::SingleTable
                    && root_strategy != InheritanceStrategy::SingleTable
                {
                    entity.strategy = root_strategy;
                } else {
                    return Err(CatalogError::StrategyMismatch {
                        entity: name.clone(),
                        strategy: entity.strategy.to_string(),
                        root_strategy: root_strategy.to_string(),
                    });
                }
            }
            if entity.strategy == InheritanceStrategy::SingleTable {
                if entity.discriminator_value.is_none() {
                    return Err(CatalogError::MissingDiscriminatorValue {
                        entity: name.clone(),
                    });
                }
                // Single-table subclasses share the root table.
                entity.table = root_table;
            }
        }
    }
    Ok(())
}
