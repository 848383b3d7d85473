//! Named parameter substitution, checked against a mocked property helper so
//! literal conversion can be observed.

use std::collections::HashMap;

use entityql::entity_catalog::PropertyHelper;
use entityql::errors::SchemaError;
use entityql::query_engine::QueryDelegates;
use entityql::{EntityType, PropertyValue, QueryError, QueryParser, QueryParsingResult};
use mockall::mock;
use mockall::predicate::always;

use super::common::{library, parse_with, StringFactory};

mock! {
    pub Helper {}

    impl PropertyHelper for Helper {
        fn has_property(&self, entity_type: &EntityType, path: &[String]) -> bool;
        fn is_embedded(&self, entity_type: &EntityType, path: &[String]) -> bool;
        fn is_analyzed(&self, entity_type: &EntityType, path: &[String]) -> bool;
        fn convert_to_property_type(
            &self,
            entity_type: &EntityType,
            path: &[String],
            literal: &str,
        ) -> Result<PropertyValue, SchemaError>;
    }
}

/// Helper knowing a single scalar `name` property
fn name_only_helper() -> MockHelper {
    let mut helper = MockHelper::new();
    helper
        .expect_has_property()
        .returning(|_, path| path.len() == 1 && path[0] == "name");
    helper.expect_is_embedded().returning(|_, _| false);
    helper.expect_is_analyzed().returning(|_, _| false);
    helper
}

fn parse_mocked(
    helper: &MockHelper,
    query: &str,
    parameters: &HashMap<String, PropertyValue>,
) -> Result<QueryParsingResult<String>, QueryError> {
    let catalog = library();
    let delegates = QueryDelegates {
        names_resolver: &catalog,
        property_helper: helper,
        predicate_factory: &StringFactory,
        aggregation_factory: &StringFactory,
        named_parameters: parameters,
    };
    QueryParser::default().parse(query, &delegates)
}

#[test]
fn test_parameter_skips_literal_conversion() {
    let mut helper = name_only_helper();
    helper.expect_convert_to_property_type().never();

    let parameters = HashMap::from([("x".to_string(), PropertyValue::from("Bob"))]);
    let result = parse_mocked(&helper, "from Book e where e.name = :x", &parameters).unwrap();
    assert_eq!(result.query, r#"Comparison(name,EQ,"Bob")"#);
}

#[test]
fn test_literal_goes_through_conversion() {
    let mut helper = name_only_helper();
    helper
        .expect_convert_to_property_type()
        .with(always(), always(), mockall::predicate::eq("Bob"))
        .times(1)
        .returning(|_, _, literal| Ok(PropertyValue::from(literal.to_uppercase())));

    let result = parse_mocked(&helper, "from Book e where e.name = 'Bob'", &HashMap::new()).unwrap();
    assert_eq!(result.query, r#"Comparison(name,EQ,"BOB")"#);
}

#[test]
fn test_mixed_literals_and_parameters() {
    let parameters = HashMap::from([
        ("low".to_string(), PropertyValue::Long(10)),
        ("isbns".to_string(), PropertyValue::from("111")),
    ]);
    let result = parse_with(
        "from Book b where b.pages between :low and 500 and b.isbn in (:isbns, '222')",
        &parameters,
    )
    .unwrap();
    assert_eq!(
        result.query,
        r#"And[Range(pages,10,500), In(isbn,["111", "222"])]"#
    );
}

#[test]
fn test_unbound_parameter() {
    let err = parse_with("from Book b where b.isbn = :missing", &HashMap::new()).unwrap_err();
    assert_eq!(
        err,
        QueryError::UnboundParameter {
            name: "missing".to_string()
        }
    );
    assert_eq!(err.code(), "ENTITYQL-0601");
}

#[test]
fn test_like_parameter_used_as_pattern() {
    let parameters = HashMap::from([("p".to_string(), PropertyValue::from("978%"))]);
    let result = parse_with("from Book b where b.isbn like :p", &parameters).unwrap();
    assert_eq!(result.query, r#"Like(isbn,"978%")"#);
}
