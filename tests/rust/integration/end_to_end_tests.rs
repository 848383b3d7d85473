//! Whole-pipeline behavior: query text in, rendered predicate and result
//! metadata out, against the library fixture.

use entityql::errors::{AliasError, SchemaError, UnsupportedFeatureError};
use entityql::predicate::AggregationFunction;
use entityql::{EntityType, Projection, QueryError, SortField};
use test_case::test_case;

use super::common::parse;

fn where_query(query: &str) -> String {
    parse(query).expect("query parses").query
}

#[test]
fn test_no_where_is_match_all() {
    let result = parse("from Book").unwrap();
    assert_eq!(result.query, "MatchAll(Book)");
    assert_eq!(result.target_entity, EntityType::new("Book"));
    assert!(result.selects_entities());
}

#[test]
fn test_tree_shape_mirrors_text_nesting() {
    assert_eq!(
        where_query("from Book b where b.isbn='same' or (b.id=4 and b.isbn='booh')"),
        r#"Or[Comparison(isbn,EQ,"same"), And[Comparison(id,EQ,4), Comparison(isbn,EQ,"booh")]]"#
    );
}

#[test]
fn test_select_entity_with_negated_conjunct() {
    let result = parse("select b from Book b where b.isbn='same' and not b.id=5").unwrap();
    assert_eq!(result.target_entity, EntityType::new("Book"));
    assert_eq!(result.projections, vec![Projection::Entity]);
    assert_eq!(
        result.query,
        r#"And[Comparison(isbn,EQ,"same"), Not[Comparison(id,EQ,5)]]"#
    );
}

#[test]
fn test_qualified_and_unqualified_references_agree() {
    assert_eq!(
        where_query("from Book b where b.isbn = 'x'"),
        where_query("from Book b where isbn = 'x'")
    );
}

#[test_case("from Book b where b.foo = 1"; "qualified")]
#[test_case("from Book b where foo = 1"; "unqualified")]
#[test_case("select b.author.nickname from Book b"; "embedded")]
fn test_unknown_property(query: &str) {
    assert!(matches!(
        parse(query),
        Err(QueryError::Schema(SchemaError::UnknownProperty { .. }))
    ));
}

#[test]
fn test_unknown_property_message() {
    let err = parse("from Book b where b.foo = 1").unwrap_err();
    assert_eq!(err.to_string(), "Schema error: no property 'foo' on type 'Book'");
    assert_eq!(err.code(), "ENTITYQL-0302");
}

#[test]
fn test_literal_types_follow_the_property() {
    assert_eq!(
        where_query(
            "from Book b where b.price < 9.5 and b.available = true \
             and b.published >= '2020-01-01'"
        ),
        r#"And[Comparison(price,LT,9.5), Comparison(available,EQ,true), Comparison(published,GTE,"2020-01-01")]"#
    );
}

#[test]
fn test_between_and_in() {
    assert_eq!(
        where_query("from Book b where b.isbn between 'aaa' and 'zzz'"),
        r#"Range(isbn,"aaa","zzz")"#
    );
    assert_eq!(
        where_query("from Book b where b.pages in (100, 200, 300)"),
        "In(pages,[100, 200, 300])"
    );
}

#[test]
fn test_like_pattern_is_verbatim() {
    assert_eq!(
        where_query("from Book b where b.isbn like '978!_%' escape '!'"),
        r#"Like(isbn,"978!_%",'!')"#
    );
}

#[test]
fn test_embedded_paths() {
    assert_eq!(
        where_query("from Book b where b.author.address.city = 'Oslo'"),
        r#"Comparison(author.address.city,EQ,"Oslo")"#
    );
    assert_eq!(
        where_query("from Book b join b.author a join a.address ad where ad.city = 'Oslo'"),
        r#"Comparison(author.address.city,EQ,"Oslo")"#
    );
}

#[test]
fn test_whole_embedded_projection_rejected() {
    assert!(matches!(
        parse("select b.author from Book b"),
        Err(QueryError::Schema(SchemaError::WholeEmbeddedProjection { .. }))
    ));
    let result = parse("select b.author.name from Book b").unwrap();
    assert_eq!(result.projections, vec![Projection::Property("author.name".into())]);
}

#[test]
fn test_join_alias_projection_rejected() {
    assert!(matches!(
        parse("select a from Book b join b.author a"),
        Err(QueryError::Schema(SchemaError::WholeEmbeddedProjection { .. }))
    ));
    let result = parse("select b, a.name from Book b join b.author a").unwrap();
    assert_eq!(
        result.projections,
        vec![Projection::Entity, Projection::Property("author.name".into())]
    );
}

#[test]
fn test_join_alias_operand_names_embedded_object() {
    let err = parse("from Book b join b.author a where a = 1").unwrap_err();
    assert_eq!(err.code(), "ENTITYQL-0306");
    assert!(
        err.to_string().contains("the embedded object 'author'"),
        "{}",
        err
    );
}

#[test]
fn test_deeply_nested_predicate_is_syntax_error() {
    let query = format!(
        "from Book b where {}b.id = 1{}",
        "(".repeat(5_000),
        ")".repeat(5_000)
    );
    assert!(matches!(parse(&query), Err(QueryError::Syntax(_))));
}

#[test_case("from Book b where b.title = 'Dune'"; "where")]
#[test_case("from Book b where b.author.address.street = 'Main'"; "nested where")]
#[test_case("from Book b order by b.title"; "order by")]
#[test_case("select b.isbn from Book b group by b.title"; "group by")]
fn test_analyzed_property_rejected(query: &str) {
    assert!(matches!(
        parse(query),
        Err(QueryError::Schema(SchemaError::AnalyzedPropertyInPredicate { .. }))
    ));
}

#[test]
fn test_analyzed_property_selectable() {
    let result = parse("select b.title, b.author.address.street from Book b").unwrap();
    assert_eq!(
        result.projections,
        vec![
            Projection::Property("title".into()),
            Projection::Property("author.address.street".into()),
        ]
    );
}

#[test]
fn test_qualified_entity_name() {
    let result = parse("from com.acme.library.Book b where b.id = 1").unwrap();
    assert_eq!(result.target_entity, EntityType::new("Book"));
    assert_eq!(result.target_entity_name, "com.acme.library.Book");
}

#[test]
fn test_sort_and_projection() {
    let result = parse("select b.isbn from Book b order by b.id desc").unwrap();
    assert_eq!(result.projections, vec![Projection::Property("isbn".into())]);
    assert_eq!(
        result.sort,
        vec![SortField {
            property: "id".into(),
            ascending: false,
        }]
    );
}

#[test]
fn test_having_sum() {
    let result = parse(
        "select b.author.name, sum(b.pages) from Book b \
         group by b.author.name having sum(b.pages) > 10",
    )
    .unwrap();
    assert_eq!(result.group_by, vec!["author.name"]);
    assert_eq!(
        result.projections[1],
        Projection::Aggregate {
            function: AggregationFunction::Sum,
            property: "pages".into(),
        }
    );
    assert_eq!(result.having.as_deref(), Some("Comparison(sum(pages),GT,10)"));
}

#[test]
fn test_having_count_and_avg_literals() {
    let result = parse(
        "select b.isbn from Book b group by b.isbn \
         having count(distinct b.id) >= 2 or avg(b.pages) < 100",
    )
    .unwrap();
    assert_eq!(
        result.having.as_deref(),
        Some("Or[Comparison(count_distinct(id),GTE,2), Comparison(avg(pages),LT,100)]")
    );
}

#[test]
fn test_aggregate_in_where_rejected() {
    assert!(matches!(
        parse("from Book b where sum(b.pages) > 10"),
        Err(QueryError::UnsupportedFeature(
            UnsupportedFeatureError::AggregateOutsideHaving { .. }
        ))
    ));
}

#[test]
fn test_from_clause_errors() {
    assert!(matches!(
        parse("from Magazine m"),
        Err(QueryError::Schema(SchemaError::UnknownEntity { .. }))
    ));
    assert!(matches!(
        parse("from Book b, Member b"),
        Err(QueryError::Alias(AliasError::Conflict { .. }))
    ));
    assert!(matches!(
        parse("from Book b, Member m"),
        Err(QueryError::UnsupportedFeature(
            UnsupportedFeatureError::MultipleTargetEntities { .. }
        ))
    ));
    assert!(matches!(
        parse("from Book b, Book c where b.id = 1"),
        Err(QueryError::UnsupportedFeature(
            UnsupportedFeatureError::MultiRootQuery
        ))
    ));
}

#[test]
fn test_unsupported_operands() {
    assert!(matches!(
        parse("from Book b where b.id = ?1"),
        Err(QueryError::UnsupportedFeature(
            UnsupportedFeatureError::PositionalParameter
        ))
    ));
    assert!(matches!(
        parse("from Book b where b.id[0] = 1"),
        Err(QueryError::UnsupportedFeature(
            UnsupportedFeatureError::CollectionIndex { .. }
        ))
    ));
    assert!(matches!(
        parse("from Book b where b = 1"),
        Err(QueryError::Schema(SchemaError::EntityInPredicate { .. }))
    ));
    assert!(matches!(
        parse("from Book b where x.id = 1"),
        Err(QueryError::Alias(AliasError::Unknown { .. }))
    ));
}

#[test]
fn test_invalid_literal() {
    let err = parse("from Book b where b.published = 'yesterday'").unwrap_err();
    assert_eq!(err.code(), "ENTITYQL-0307");
    assert!(err.to_string().contains("not a valid date"));
}
