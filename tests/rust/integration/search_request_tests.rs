//! JSON search DSL output for complete queries.

use std::collections::HashMap;

use entityql::search_query_generator::to_search_request;
use entityql::{JsonPredicateFactory, PropertyValue, QueryDelegates, QueryParser};
use serde_json::{json, Value};

use super::common::library;

fn search(query: &str, parameters: &HashMap<String, PropertyValue>) -> Value {
    let catalog = library();
    let factory = JsonPredicateFactory::new();
    let delegates = QueryDelegates::new(&catalog, &factory, parameters);
    let result = QueryParser::default()
        .parse::<Value>(query, &delegates)
        .expect("query compiles");
    to_search_request(&result)
}

#[test]
fn test_filter_query() {
    let request = search(
        "from Book b where b.isbn = 'x' and not b.pages between 1 and 10 \
         or b.author.name like 'Le Guin%' or b.published is null",
        &HashMap::new(),
    );
    assert_eq!(
        request,
        json!({
            "query": {
                "bool": {
                    "should": [
                        {
                            "bool": {
                                "must": [{ "term": { "isbn": "x" } }],
                                "must_not": [{ "range": { "pages": { "gte": 1, "lte": 10 } } }]
                            }
                        },
                        { "wildcard": { "author.name": { "value": "Le Guin*" } } },
                        { "bool": { "must_not": [{ "exists": { "field": "published" } }] } }
                    ],
                    "minimum_should_match": 1
                }
            }
        })
    );
}

#[test]
fn test_parameters_and_projection() {
    let parameters = HashMap::from([(
        "since".to_string(),
        PropertyValue::Date(chrono::NaiveDate::from_ymd_opt(2001, 2, 3).unwrap()),
    )]);
    let request = search(
        "select b.isbn, b.author.name from Book b where b.published > :since order by b.price desc",
        &parameters,
    );
    assert_eq!(
        request["query"],
        json!({ "range": { "published": { "gt": "2001-02-03" } } })
    );
    assert_eq!(request["_source"], json!(["isbn", "author.name"]));
    assert_eq!(request["sort"], json!([{ "price": { "order": "desc" } }]));
}

#[test]
fn test_grouped_request_with_having() {
    let request = search(
        "select b.author.name, count(b.id) from Book b \
         group by b.author.name having count(b.id) > 3",
        &HashMap::new(),
    );
    assert_eq!(request["query"], json!({ "match_all": {} }));
    assert_eq!(
        request["aggs"]["group_by"]["aggs"]["count_id"],
        json!({ "value_count": { "field": "id" } })
    );
    assert_eq!(
        request["having"],
        json!({ "having": { "function": "count", "field": "id", "op": "gt", "value": 3 } })
    );
}
