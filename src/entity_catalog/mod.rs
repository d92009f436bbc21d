//! The Schema Model: entity and property descriptors, inheritance metadata,
//! and the YAML mapping loader. Built once at startup and treated as
//! immutable; every translator invocation reads it concurrently.

pub mod config;
pub mod custom_type;
pub mod errors;
pub mod schema_types;

pub use config::{load_catalog, parse_catalog};
pub use custom_type::ScalarCodec;
pub use errors::CatalogError;
pub use schema_types::{
    AssociationJoin, AssociationKind, EmbeddedField, EntityCatalog, EntityDescriptor,
    IdentifierMapping, InheritanceStrategy, PropertyDescriptor, PropertyKind, SqlType,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const ZOO_MAPPING: &str = r#"
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
"#;

    fn zoo_catalog() -> EntityCatalog {
        parse_catalog(ZOO_MAPPING, HashMap::new()).unwrap()
    }

    #[test]
    fn builds_hierarchy_links() {
        let catalog = zoo_catalog();
        let animal = catalog.entity("Animal").unwrap();
        assert_eq!(animal.children, vec!["Mammal".to_string()]);
        let human = catalog.entity("Human").unwrap();
        assert_eq!(human.parent.as_deref(), Some("Mammal"));
        assert_eq!(catalog.hierarchy_root("Human").unwrap().name, "Animal");
    }

    #[test]
    fn property_lookup_walks_ancestors() {
        let catalog = zoo_catalog();
        let (declaring, prop) = catalog.property("Human", "bodyWeight").unwrap();
        assert_eq!(declaring.name, "Animal");
        assert_eq!(prop.name, "bodyWeight");
        // Declared on Human itself.
        let (declaring, _) = catalog.property("Human", "nickName").unwrap();
        assert_eq!(declaring.name, "Human");
        // Not visible upward from Animal.
        assert!(catalog.property("Animal", "nickName").is_none());
        assert!(catalog.subtype_declaring("Animal", "nickName").is_some());
    }

    #[test]
    fn subtype_queries() {
        let catalog = zoo_catalog();
        assert!(catalog.is_subtype_of("Human", "Animal"));
        assert!(catalog.is_subtype_of("Human", "Human"));
        assert!(!catalog.is_subtype_of("Animal", "Human"));
        let subs: Vec<&str> = catalog
            .subtypes("Animal")
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(subs, vec!["Human", "Mammal"]);
    }

    #[test]
    fn identifier_detection_includes_inherited_id() {
        let catalog = zoo_catalog();
        assert!(catalog.is_identifier("Animal", "id"));
        assert!(catalog.is_identifier("Human", "id"));
        assert!(!catalog.is_identifier("Human", "nickName"));
        assert!(catalog.is_identifier("Zoo", "id"));
    }

    #[test]
    fn entity_by_class_accepts_qualified_names() {
        let catalog = zoo_catalog();
        assert!(catalog.entity_by_class("Zoo").is_some());
        assert!(catalog.entity_by_class("org.example.zoo.Zoo").is_some());
        assert!(catalog.entity_by_class("org.example.zoo.Missing").is_none());
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let yaml = r#"
entities:
  - name: Cat
    table: cat
    extends: Feline
"#;
        let err = parse_catalog(yaml, HashMap::new()).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownParent { .. }));
    }

    #[test]
    fn single_table_subclass_requires_discriminator_value() {
        let yaml = r#"
entities:
  - name: Payment
    table: payment
    strategy: single_table
    discriminator: { column: payment_type }
  - name: CreditCardPayment
    table: payment
    extends: Payment
"#;
        let err = parse_catalog(yaml, HashMap::new()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingDiscriminatorValue { .. }
        ));
    }

    #[test]
    fn single_table_subclass_inherits_root_table_and_discriminators() {
        let yaml = r#"
entities:
  - name: Payment
    table: payment
    strategy: single_table
    discriminator: { column: payment_type }
  - name: CreditCardPayment
    table: ignored
    extends: Payment
    discriminator: { value: CC }
  - name: CashPayment
    table: ignored
    extends: Payment
    discriminator: { value: CASH }
"#;
        let catalog = parse_catalog(yaml, HashMap::new()).unwrap();
        assert_eq!(catalog.entity("CreditCardPayment").unwrap().table, "payment");
        // Root matches everything: no discriminator restriction.
        assert!(catalog.discriminator_values("Payment").is_empty());
        assert_eq!(
            catalog.discriminator_values("CreditCardPayment"),
            vec!["CC".to_string()]
        );
    }

    #[test]
    fn concrete_tables_for_table_per_class() {
        let yaml = r#"
entities:
  - name: Account
    table: account
    strategy: table_per_class
  - name: SavingsAccount
    table: savings_account
    extends: Account
    strategy: table_per_class
  - name: CheckingAccount
    table: checking_account
    extends: Account
    strategy: table_per_class
"#;
        let catalog = parse_catalog(yaml, HashMap::new()).unwrap();
        let tables = catalog.concrete_tables("Account");
        assert_eq!(
            tables,
            vec![
                ("Account".to_string(), "account".to_string()),
                ("CheckingAccount".to_string(), "checking_account".to_string()),
                ("SavingsAccount".to_string(), "savings_account".to_string()),
            ]
        );
        assert_eq!(
            catalog.concrete_tables("SavingsAccount"),
            vec![("SavingsAccount".to_string(), "savings_account".to_string())]
        );
    }

    #[test]
    fn inheritance_cycle_is_detected() {
        let yaml = r#"
entities:
  - name: A
    table: a
    extends: B
  - name: B
    table: b
    extends: A
"#;
        let err = parse_catalog(yaml, HashMap::new()).unwrap_err();
        assert!(matches!(err, CatalogError::InheritanceCycle { .. }));
    }
}
