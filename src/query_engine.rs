//! Query orchestration: parse, resolve, render.
//!
//! [`QueryParser`] is the entry point integrators call. It owns nothing but
//! its [`EngineConfig`]; every `parse` call builds fresh resolver and builder
//! state, so one parser can serve any number of threads.

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::entity_catalog::{EntityNamesResolver, PropertyHelper, PropertyValue};
use crate::errors::{QueryError, SyntaxError};
use crate::hql_parser;
use crate::predicate::{AggregationPredicateFactory, PredicateFactory};
use crate::query_resolver::Resolver;
use crate::render_plan::{self, QueryParsingResult};

/// Collaborators for one `parse` call.
pub struct QueryDelegates<'a, Q> {
    pub names_resolver: &'a dyn EntityNamesResolver,
    pub property_helper: &'a dyn PropertyHelper,
    pub predicate_factory: &'a dyn PredicateFactory<Q>,
    pub aggregation_factory: &'a dyn AggregationPredicateFactory<Q>,
    pub named_parameters: &'a HashMap<String, PropertyValue>,
}

impl<'a, Q> QueryDelegates<'a, Q> {
    /// Delegates backed by one schema adapter and one backend factory
    pub fn new<C, F>(
        catalog: &'a C,
        factory: &'a F,
        named_parameters: &'a HashMap<String, PropertyValue>,
    ) -> Self
    where
        C: EntityNamesResolver + PropertyHelper,
        F: PredicateFactory<Q> + AggregationPredicateFactory<Q>,
    {
        QueryDelegates {
            names_resolver: catalog,
            property_helper: catalog,
            predicate_factory: factory,
            aggregation_factory: factory,
            named_parameters,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    config: EngineConfig,
}

impl QueryParser {
    pub fn new(config: EngineConfig) -> Self {
        QueryParser { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn parse<Q>(
        &self,
        query: &str,
        delegates: &QueryDelegates<'_, Q>,
    ) -> Result<QueryParsingResult<Q>, QueryError> {
        if self.config.log_queries {
            log::info!("Parsing query: {}", query);
        }

        self.parse_inner(query, delegates).inspect_err(|e| {
            log::warn!("Rejected query [{}]: {}", e.code(), e);
        })
    }

    fn parse_inner<Q>(
        &self,
        query: &str,
        delegates: &QueryDelegates<'_, Q>,
    ) -> Result<QueryParsingResult<Q>, QueryError> {
        if query.len() > self.config.max_query_length {
            return Err(SyntaxError::new(
                format!(
                    "query is {} bytes long, the limit is {}",
                    query.len(),
                    self.config.max_query_length
                ),
                self.config.max_query_length,
            )
            .into());
        }

        let statement = hql_parser::parse_query(query)?;
        log::debug!("Parsed statement: {:?}", statement);

        let depth = statement.predicate_depth();
        if depth > self.config.max_expression_depth {
            return Err(SyntaxError::new(
                format!(
                    "boolean nesting depth {} exceeds the limit of {}",
                    depth, self.config.max_expression_depth
                ),
                0,
            )
            .into());
        }

        let resolved = Resolver::new(
            delegates.names_resolver,
            delegates.property_helper,
            delegates.named_parameters,
        )
        .resolve(&statement)?;
        log::debug!(
            "Resolved target entity {} with {} alias(es)",
            resolved.target_entity,
            resolved.alias_table.len()
        );

        let result = render_plan::render(
            &resolved,
            delegates.property_helper,
            delegates.predicate_factory,
            delegates.aggregation_factory,
        )?;
        log::debug!("Rendered query for {}", result.target_entity);

        Ok(result)
    }
}
