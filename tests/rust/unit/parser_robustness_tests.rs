//! Unit tests for query parsing edge cases and error handling
//!
//! Tests malformed queries, edge cases, and error conditions to ensure
//! robust parsing without panics.

#[cfg(test)]
mod parser_robustness_tests {
    use entityql::hql_parser::ast::{BooleanExpression, JoinType, Literal, Operand};
    use entityql::hql_parser::{parse_query, MAX_NESTING_DEPTH};
    use test_case::test_case;

    /// Malformed queries return errors, never panic
    #[test]
    fn test_malformed_queries_rejected() {
        let malformed_queries = vec![
            "",                                  // Empty query
            "select",                            // Incomplete SELECT
            "select e",                          // Missing FROM
            "from",                              // Missing entity
            "from where",                        // Keyword as entity
            "from E e where",                    // Empty WHERE
            "from E e where (e.id = 1",          // Unclosed parenthesis
            "from E e where e.id = 1)",          // Stray parenthesis
            "from E e where e.id between 1",     // Incomplete BETWEEN
            "from E e where e.id in ()",         // Empty IN list
            "from E e where e.name like",        // Missing pattern
            "from E e order e.id",               // ORDER without BY
            "from E e group by",                 // Empty GROUP BY
            "from E e where e.name = 'unclosed", // Unterminated string
            "from E e where e.id = 1 garbage",   // Trailing tokens
            "from E e join e.author",            // Join without alias
        ];

        for query in malformed_queries {
            assert!(parse_query(query).is_err(), "expected an error for: {}", query);
        }
    }

    #[test]
    fn test_trailing_input_offset() {
        let query = "from E e where e.id = 1 garbage";
        let err = parse_query(query).unwrap_err();
        assert_eq!(query[err.offset..].trim_start(), "garbage");
        assert!(err.message.contains("garbage"));
    }

    #[test_case("FROM E e WHERE e.id = 1"; "upper case")]
    #[test_case("from E e where e.id = 1"; "lower case")]
    #[test_case("FrOm E e wHeRe e.id = 1;"; "mixed case with semicolon")]
    #[test_case("  from   E   e\n where\te.id=1  "; "irregular whitespace")]
    fn test_keywords_case_insensitive(query: &str) {
        let statement = parse_query(query).unwrap();
        assert_eq!(statement.from_clause.persister_spaces[0].entity_name, "E");
        assert!(statement.where_clause.is_some());
    }

    #[test]
    fn test_quote_escaping_in_string_literal() {
        let statement = parse_query("from E e where e.name = 'it''s'").unwrap();
        match statement.where_clause.unwrap().conditions {
            BooleanExpression::Comparison { right, .. } => {
                assert_eq!(right, Operand::Literal(Literal::String("it's".into())));
            }
            other => panic!("expected a comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_full_statement_shape() {
        let statement = parse_query(
            "select distinct e.name, count(e.id) from com.acme.E as e \
             left outer join fetch e.author a \
             where a.name is not null \
             group by e.name having count(e.id) > 1 \
             order by e.name asc, e.id desc",
        )
        .unwrap();

        let select = statement.select_clause.unwrap();
        assert!(select.distinct);
        assert_eq!(select.select_items.len(), 2);
        assert_eq!(statement.from_clause.persister_spaces[0].entity_name, "com.acme.E");
        let join = &statement.from_clause.joins[0];
        assert_eq!(join.join_type, JoinType::LeftOuter);
        assert!(join.fetch);
        assert_eq!(join.alias, "a");
        assert!(statement.group_by_clause.is_some());
        assert!(statement.having_clause.is_some());
        let order = statement.order_by_clause.unwrap();
        assert!(order.order_by_items[0].ascending);
        assert!(!order.order_by_items[1].ascending);
    }

    #[test]
    fn test_parameters_recognized() {
        let statement = parse_query("from E e where e.id = :id or e.id = ?2").unwrap();
        match statement.where_clause.unwrap().conditions {
            BooleanExpression::Or(children) => {
                assert!(matches!(
                    &children[0],
                    BooleanExpression::Comparison { right: Operand::NamedParameter("id"), .. }
                ));
                assert!(matches!(
                    &children[1],
                    BooleanExpression::Comparison { right: Operand::PositionalParameter(Some(2)), .. }
                ));
            }
            other => panic!("expected a disjunction, got {:?}", other),
        }
    }

    /// Deeply nested predicates fail with a syntax error instead of
    /// exhausting the stack
    #[test_case(5_000; "five thousand")]
    #[test_case(30_000; "thirty thousand")]
    fn test_deeply_nested_parentheses_rejected(depth: usize) {
        let query = format!(
            "from E e where {}e.id = 1{}",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let err = parse_query(&query).unwrap_err();
        assert!(err.message.contains("maximum depth"), "{}", err.message);
        assert!(err.offset > "from E e where ".len());
    }

    #[test]
    fn test_long_not_chain_rejected() {
        let query = format!("from E e where {}e.id = 1", "not ".repeat(10_000));
        let err = parse_query(&query).unwrap_err();
        assert!(err.message.contains("maximum depth"), "{}", err.message);
    }

    #[test]
    fn test_nesting_up_to_limit_accepted() {
        let query = format!(
            "from E e where {}e.id = 1{}",
            "(not ".repeat(MAX_NESTING_DEPTH / 2),
            ")".repeat(MAX_NESTING_DEPTH / 2)
        );
        assert!(parse_query(&query).is_ok());
    }

    #[test]
    fn test_nested_collection_index_rejected() {
        let query = format!("from E e where e.tags{} = 1", "[e.tags".repeat(5_000));
        assert!(parse_query(&query).is_err());
    }
}
