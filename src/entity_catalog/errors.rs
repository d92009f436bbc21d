use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Failed to read mapping file '{path}': {message}")]
    FileRead { path: String, message: String },

    #[error("Invalid mapping YAML: {0}")]
    InvalidYaml(String),

    #[error("Duplicate entity name '{0}' in mapping")]
    DuplicateEntity(String),

    #[error("Entity '{entity}' extends unknown entity '{parent}'")]
    UnknownParent { entity: String, parent: String },

    #[error("Property '{property}' of entity '{entity}' targets unknown entity '{target}'")]
    UnknownAssociationTarget {
        entity: String,
        property: String,
        target: String,
    },

    #[error("Entity '{entity}' declares inheritance strategy '{strategy}' but its hierarchy root uses '{root_strategy}' (strategy is fixed per hierarchy)")]
    StrategyMismatch {
        entity: String,
        strategy: String,
        root_strategy: String,
    },

    #[error("Entity '{entity}': single-table subclasses must declare a discriminator value")]
    MissingDiscriminatorValue { entity: String },

    #[error("Unknown property type '{type_name}' on '{entity}.{property}'")]
    UnknownPropertyType {
        entity: String,
        property: String,
        type_name: String,
    },

    #[error("Property '{property}' of entity '{entity}' references unregistered codec '{codec}'")]
    UnknownCodec {
        entity: String,
        property: String,
        codec: String,
    },

    #[error("Entity '{entity}' cycle detected in extends chain")]
    InheritanceCycle { entity: String },

    #[error("Entity '{0}' missing from the catalog during hierarchy validation")]
    InconsistentHierarchy(String),
}
