use serde_json::{json, Map, Value};

use crate::predicate::AggregationFunction;
use crate::render_plan::{Projection, QueryParsingResult};

fn metric(function: AggregationFunction, property: &str) -> Value {
    let kind = match function {
        AggregationFunction::Sum => "sum",
        AggregationFunction::Avg => "avg",
        AggregationFunction::Min => "min",
        AggregationFunction::Max => "max",
        AggregationFunction::Count => "value_count",
        AggregationFunction::CountDistinct => "cardinality",
    };
    let mut body = Map::new();
    body.insert(kind.to_string(), json!({ "field": property }));
    Value::Object(body)
}

fn aggregations(result: &QueryParsingResult<Value>) -> Option<Value> {
    let mut metrics = Map::new();
    for projection in &result.projections {
        if let Projection::Aggregate { function, property } = projection {
            metrics.insert(
                format!("{}_{}", function.as_str(), property),
                metric(*function, property),
            );
        }
    }

    if result.group_by.is_empty() {
        return (!metrics.is_empty()).then(|| Value::Object(metrics));
    }

    let sources: Vec<Value> = result
        .group_by
        .iter()
        .map(|property| {
            let mut source = Map::new();
            source.insert(property.clone(), json!({ "terms": { "field": property } }));
            Value::Object(source)
        })
        .collect();

    let mut group = Map::new();
    group.insert("composite".to_string(), json!({ "sources": sources }));
    if !metrics.is_empty() {
        group.insert("aggs".to_string(), Value::Object(metrics));
    }
    Some(json!({ "group_by": group }))
}

/// Assemble a full search request body from a rendered query.
///
/// Property projections become `_source` filters, sort fields become `sort`,
/// aggregates and GROUP BY become an `aggs` section (a composite terms
/// aggregation when grouped) and the HAVING query is passed along untouched.
pub fn to_search_request(result: &QueryParsingResult<Value>) -> Value {
    let mut request = Map::new();
    request.insert("query".to_string(), result.query.clone());

    let fields: Vec<&str> = result
        .projections
        .iter()
        .filter_map(|projection| match projection {
            Projection::Property(property) => Some(property.as_str()),
            _ => None,
        })
        .collect();
    if !fields.is_empty() {
        request.insert("_source".to_string(), json!(fields));
    }

    if !result.sort.is_empty() {
        let sort: Vec<Value> = result
            .sort
            .iter()
            .map(|field| {
                let order = if field.ascending { "asc" } else { "desc" };
                let mut entry = Map::new();
                entry.insert(field.property.clone(), json!({ "order": order }));
                Value::Object(entry)
            })
            .collect();
        request.insert("sort".to_string(), Value::Array(sort));
    }

    if let Some(aggs) = aggregations(result) {
        request.insert("size".to_string(), json!(0));
        request.insert("aggs".to_string(), aggs);
    }

    if let Some(having) = &result.having {
        request.insert("having".to_string(), having.clone());
    }

    Value::Object(request)
}
