//! Shared fixtures: the library catalog and a factory that renders predicates
//! as compact strings.

use std::collections::HashMap;

use entityql::entity_catalog::EntityCatalog;
use entityql::predicate::{
    AggregationFunction, AggregationPredicateFactory, ComparisonType, PredicateFactory,
};
use entityql::{EntityType, PropertyValue, QueryDelegates, QueryError, QueryParser, QueryParsingResult};

pub const LIBRARY_SCHEMA: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/library.yaml");

pub fn library() -> EntityCatalog {
    EntityCatalog::from_yaml_file(LIBRARY_SCHEMA).expect("library fixture loads")
}

pub struct StringFactory;

fn value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(_) | PropertyValue::Date(_) => format!("\"{}\"", value),
        other => other.to_string(),
    }
}

fn op(op: ComparisonType) -> &'static str {
    match op {
        ComparisonType::Equals => "EQ",
        ComparisonType::NotEquals => "NE",
        ComparisonType::Less => "LT",
        ComparisonType::LessOrEqual => "LTE",
        ComparisonType::Greater => "GT",
        ComparisonType::GreaterOrEqual => "GTE",
    }
}

fn list(values: &[PropertyValue]) -> String {
    values.iter().map(value).collect::<Vec<_>>().join(", ")
}

impl PredicateFactory<String> for StringFactory {
    fn match_all(&self, entity_type: &EntityType) -> String {
        format!("MatchAll({})", entity_type)
    }

    fn comparison(&self, _: &EntityType, property: &str, o: ComparisonType, v: &PropertyValue) -> String {
        format!("Comparison({},{},{})", property, op(o), value(v))
    }

    fn range(&self, _: &EntityType, property: &str, lower: &PropertyValue, upper: &PropertyValue) -> String {
        format!("Range({},{},{})", property, value(lower), value(upper))
    }

    fn in_(&self, _: &EntityType, property: &str, values: &[PropertyValue]) -> String {
        format!("In({},[{}])", property, list(values))
    }

    fn like(&self, _: &EntityType, property: &str, pattern: &str, escape: Option<char>) -> String {
        match escape {
            Some(c) => format!("Like({},\"{}\",'{}')", property, pattern, c),
            None => format!("Like({},\"{}\")", property, pattern),
        }
    }

    fn is_null(&self, _: &EntityType, property: &str) -> String {
        format!("IsNull({})", property)
    }

    fn and_(&self, must: Vec<String>, must_not: Vec<String>) -> String {
        let mut parts = must;
        parts.extend(must_not.into_iter().map(|q| format!("Not[{}]", q)));
        format!("And[{}]", parts.join(", "))
    }

    fn or_(&self, children: Vec<String>) -> String {
        format!("Or[{}]", children.join(", "))
    }

    fn not_(&self, child: String) -> String {
        format!("Not[{}]", child)
    }
}

impl AggregationPredicateFactory<String> for StringFactory {
    fn comparison(
        &self,
        _: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        o: ComparisonType,
        v: &PropertyValue,
    ) -> String {
        format!("Comparison({}({}),{},{})", aggregation, property, op(o), value(v))
    }

    fn range(
        &self,
        _: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        lower: &PropertyValue,
        upper: &PropertyValue,
    ) -> String {
        format!("Range({}({}),{},{})", aggregation, property, value(lower), value(upper))
    }

    fn in_(
        &self,
        _: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        values: &[PropertyValue],
    ) -> String {
        format!("In({}({}),[{}])", aggregation, property, list(values))
    }

    fn like(
        &self,
        _: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        pattern: &str,
        _escape: Option<char>,
    ) -> String {
        format!("Like({}({}),\"{}\")", aggregation, property, pattern)
    }

    fn is_null(&self, _: &EntityType, aggregation: AggregationFunction, property: &str) -> String {
        format!("IsNull({}({}))", aggregation, property)
    }
}

pub fn parse_with(
    query: &str,
    parameters: &HashMap<String, PropertyValue>,
) -> Result<QueryParsingResult<String>, QueryError> {
    let catalog = library();
    let delegates = QueryDelegates::new(&catalog, &StringFactory, parameters);
    QueryParser::default().parse(query, &delegates)
}

pub fn parse(query: &str) -> Result<QueryParsingResult<String>, QueryError> {
    parse_with(query, &HashMap::new())
}
