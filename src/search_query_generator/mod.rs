//! JSON search DSL backend.
//!
//! [`JsonPredicateFactory`] implements both predicate factories over
//! [`serde_json::Value`], producing Elasticsearch-style bool queries. HAVING
//! leaves have no equivalent in the filter DSL; they are emitted as `having`
//! objects for a post-aggregation step to evaluate.

mod request;
mod wildcard;

pub use request::to_search_request;
pub use wildcard::like_to_wildcard;

use serde_json::{json, Map, Value};

use crate::entity_catalog::{EntityType, PropertyValue};
use crate::predicate::{
    AggregationFunction, AggregationPredicateFactory, ComparisonType, PredicateFactory,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPredicateFactory;

impl JsonPredicateFactory {
    pub fn new() -> Self {
        JsonPredicateFactory
    }
}

pub fn json_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Boolean(b) => Value::Bool(*b),
        PropertyValue::Long(l) => Value::from(*l),
        // NaN and infinities have no JSON representation
        PropertyValue::Double(d) => serde_json::Number::from_f64(*d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        PropertyValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        PropertyValue::String(s) => Value::String(s.clone()),
    }
}

fn range_operator(op: ComparisonType) -> &'static str {
    match op {
        ComparisonType::Less => "lt",
        ComparisonType::LessOrEqual => "lte",
        ComparisonType::Greater => "gt",
        ComparisonType::GreaterOrEqual => "gte",
        ComparisonType::Equals => "eq",
        ComparisonType::NotEquals => "ne",
    }
}

fn single_field(field: &str, body: Value) -> Value {
    let mut map = Map::new();
    map.insert(field.to_string(), body);
    Value::Object(map)
}

fn must_not(clauses: Vec<Value>) -> Value {
    json!({ "bool": { "must_not": clauses } })
}

fn having(aggregation: AggregationFunction, property: &str, op: &str, body: Value) -> Value {
    let mut having = Map::new();
    having.insert("function".to_string(), json!(aggregation.as_str()));
    having.insert("field".to_string(), json!(property));
    having.insert("op".to_string(), json!(op));
    if let Value::Object(fields) = body {
        having.extend(fields);
    }
    json!({ "having": having })
}

impl PredicateFactory<Value> for JsonPredicateFactory {
    fn match_all(&self, _entity_type: &EntityType) -> Value {
        json!({ "match_all": {} })
    }

    fn comparison(
        &self,
        _entity_type: &EntityType,
        property: &str,
        op: ComparisonType,
        value: &PropertyValue,
    ) -> Value {
        let term = json!({ "term": single_field(property, json_value(value)) });
        match op {
            ComparisonType::Equals => term,
            ComparisonType::NotEquals => must_not(vec![term]),
            _ => {
                let bound = single_field(range_operator(op), json_value(value));
                json!({ "range": single_field(property, bound) })
            }
        }
    }

    fn range(
        &self,
        _entity_type: &EntityType,
        property: &str,
        lower: &PropertyValue,
        upper: &PropertyValue,
    ) -> Value {
        json!({
            "range": single_field(
                property,
                json!({ "gte": json_value(lower), "lte": json_value(upper) }),
            )
        })
    }

    fn in_(&self, _entity_type: &EntityType, property: &str, values: &[PropertyValue]) -> Value {
        let values: Vec<Value> = values.iter().map(json_value).collect();
        json!({ "terms": single_field(property, Value::Array(values)) })
    }

    fn like(
        &self,
        _entity_type: &EntityType,
        property: &str,
        pattern: &str,
        escape: Option<char>,
    ) -> Value {
        json!({
            "wildcard": single_field(
                property,
                json!({ "value": like_to_wildcard(pattern, escape) }),
            )
        })
    }

    fn is_null(&self, _entity_type: &EntityType, property: &str) -> Value {
        must_not(vec![json!({ "exists": { "field": property } })])
    }

    fn and_(&self, must: Vec<Value>, must_not: Vec<Value>) -> Value {
        let mut clauses = Map::new();
        if !must.is_empty() {
            clauses.insert("must".to_string(), Value::Array(must));
        }
        if !must_not.is_empty() {
            clauses.insert("must_not".to_string(), Value::Array(must_not));
        }
        json!({ "bool": clauses })
    }

    fn or_(&self, children: Vec<Value>) -> Value {
        json!({ "bool": { "should": children, "minimum_should_match": 1 } })
    }

    fn not_(&self, child: Value) -> Value {
        must_not(vec![child])
    }
}

impl AggregationPredicateFactory<Value> for JsonPredicateFactory {
    fn comparison(
        &self,
        _entity_type: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        op: ComparisonType,
        value: &PropertyValue,
    ) -> Value {
        having(
            aggregation,
            property,
            range_operator(op),
            json!({ "value": json_value(value) }),
        )
    }

    fn range(
        &self,
        _entity_type: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        lower: &PropertyValue,
        upper: &PropertyValue,
    ) -> Value {
        having(
            aggregation,
            property,
            "between",
            json!({ "lower": json_value(lower), "upper": json_value(upper) }),
        )
    }

    fn in_(
        &self,
        _entity_type: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        values: &[PropertyValue],
    ) -> Value {
        let values: Vec<Value> = values.iter().map(json_value).collect();
        having(aggregation, property, "in", json!({ "values": values }))
    }

    fn like(
        &self,
        _entity_type: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        pattern: &str,
        escape: Option<char>,
    ) -> Value {
        having(
            aggregation,
            property,
            "like",
            json!({ "pattern": like_to_wildcard(pattern, escape) }),
        )
    }

    fn is_null(
        &self,
        _entity_type: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
    ) -> Value {
        having(aggregation, property, "is_null", json!({}))
    }
}
