//! Stack discipline of the WHERE and HAVING builders.

use entityql::entity_catalog::EntityCatalog;
use entityql::errors::{PredicateStructureError, QueryError, SchemaError};
use entityql::predicate::{
    AggregatedProperty, AggregationFunction, ComparisonType, ConditionBuilder, HavingBuilder,
    OperandValue, Predicate, QueryBuilder,
};
use entityql::{EntityType, JsonPredicateFactory, PropertyValue};
use serde_json::{json, Value};

const CATALOG: &str = r#"
entities:
  - name: Book
    properties:
      id: { type: long }
      isbn: { type: string }
      price: { type: double }
"#;

fn catalog() -> EntityCatalog {
    EntityCatalog::from_yaml_str(CATALOG).unwrap()
}

fn path(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

fn literal(text: &str) -> OperandValue {
    OperandValue::Literal(text.to_string())
}

#[test]
fn test_root_accepts_a_single_child() {
    let catalog = catalog();
    let mut builder: QueryBuilder<'_, Value> =
        QueryBuilder::new(EntityType::new("Book"), &JsonPredicateFactory, &catalog);

    builder
        .add_comparison(&path("id"), ComparisonType::Equals, literal("1"))
        .unwrap();
    let err = builder
        .add_comparison(&path("id"), ComparisonType::Equals, literal("2"))
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::PredicateStructure(PredicateStructureError::TooManyChildren { parent: "Root" })
    );
    assert_eq!(
        builder.push_and(),
        Err(PredicateStructureError::TooManyChildren { parent: "Root" })
    );
}

#[test]
fn test_not_accepts_a_single_child() {
    let catalog = catalog();
    let mut builder: QueryBuilder<'_, Value> =
        QueryBuilder::new(EntityType::new("Book"), &JsonPredicateFactory, &catalog);

    builder.push_not().unwrap();
    builder.push_or().unwrap();
    builder.add_is_null(&path("isbn")).unwrap();
    builder.pop().unwrap();
    assert_eq!(
        builder.push_and(),
        Err(PredicateStructureError::TooManyChildren { parent: "Not" })
    );
    assert!(matches!(
        builder.add_is_null(&path("price")),
        Err(QueryError::PredicateStructure(
            PredicateStructureError::TooManyChildren { parent: "Not" }
        ))
    ));
}

#[test]
fn test_scopes_must_balance() {
    let catalog = catalog();
    let mut builder: QueryBuilder<'_, Value> =
        QueryBuilder::new(EntityType::new("Book"), &JsonPredicateFactory, &catalog);
    assert_eq!(builder.pop(), Err(PredicateStructureError::NoOpenScope));

    builder.push_and().unwrap();
    builder.push_or().unwrap();
    assert_eq!(builder.open_scopes(), 2);
    assert_eq!(
        builder.build(),
        Err(PredicateStructureError::UnclosedScopes { count: 2 })
    );
}

#[test]
fn test_empty_negation_fails_at_build() {
    let catalog = catalog();
    let mut builder: QueryBuilder<'_, Value> =
        QueryBuilder::new(EntityType::new("Book"), &JsonPredicateFactory, &catalog);
    builder.push_not().unwrap();
    builder.pop().unwrap();
    assert_eq!(builder.build(), Err(PredicateStructureError::EmptyNegation));
}

#[test]
fn test_built_tree_and_query() {
    let catalog = catalog();
    let mut builder: QueryBuilder<'_, Value> =
        QueryBuilder::new(EntityType::new("Book"), &JsonPredicateFactory, &catalog);

    builder.push_and().unwrap();
    builder
        .add_range(&path("price"), literal("1.5"), OperandValue::Parameter(PropertyValue::Double(9.0)))
        .unwrap();
    builder.push_not().unwrap();
    builder
        .add_in(&path("id"), vec![literal("1"), literal("2")])
        .unwrap();
    builder.pop().unwrap();
    builder.pop().unwrap();

    assert_eq!(
        builder.build().unwrap(),
        json!({
            "bool": {
                "must": [{ "range": { "price": { "gte": 1.5, "lte": 9.0 } } }],
                "must_not": [{ "terms": { "id": [1, 2] } }]
            }
        })
    );
}

#[test]
fn test_into_predicate_exposes_tree() {
    let catalog = catalog();
    let mut builder: QueryBuilder<'_, Value> =
        QueryBuilder::new(EntityType::new("Book"), &JsonPredicateFactory, &catalog);
    builder
        .add_like(&path("isbn"), literal("978%"), None)
        .unwrap();

    match builder.into_predicate().unwrap() {
        Predicate::Root { child: Some(child) } => {
            assert!(matches!(*child, Predicate::Leaf { aggregation: None, .. }));
        }
        other => panic!("expected a root with one leaf, got {:?}", other),
    }
}

#[test]
fn test_literal_conversion_failure() {
    let catalog = catalog();
    let mut builder: QueryBuilder<'_, Value> =
        QueryBuilder::new(EntityType::new("Book"), &JsonPredicateFactory, &catalog);
    let err = builder
        .add_comparison(&path("id"), ComparisonType::Less, literal("ten"))
        .unwrap_err();
    assert!(matches!(
        err,
        QueryError::Schema(SchemaError::InvalidPropertyValue { ref expected, .. }) if expected == "long"
    ));
}

#[test]
fn test_having_builder_converts_by_function() {
    let catalog = catalog();
    let mut builder: HavingBuilder<'_, Value> = HavingBuilder::new(
        EntityType::new("Book"),
        &JsonPredicateFactory,
        &JsonPredicateFactory,
        &catalog,
    );

    builder.push_and().unwrap();
    builder
        .add_comparison(
            &AggregatedProperty::new(AggregationFunction::Count, path("isbn")),
            ComparisonType::Greater,
            literal("3"),
        )
        .unwrap();
    builder
        .add_comparison(
            &AggregatedProperty::new(AggregationFunction::Avg, path("id")),
            ComparisonType::Less,
            literal("2.5"),
        )
        .unwrap();
    builder.pop().unwrap();

    assert_eq!(
        builder.build().unwrap(),
        json!({
            "bool": {
                "must": [
                    { "having": { "function": "count", "field": "isbn", "op": "gt", "value": 3 } },
                    { "having": { "function": "avg", "field": "id", "op": "lt", "value": 2.5 } }
                ]
            }
        })
    );
}
