//! entityql - entity query language front end
//!
//! This crate compiles HQL/JPQL-style entity queries into backend search queries:
//! - Query text parsing (`hql_parser`)
//! - Alias and property path resolution against a pluggable schema (`query_resolver`)
//! - Backend-agnostic predicate trees and builders (`predicate`)
//! - Rendering into any backend query type (`render_plan`)
//! - A JSON search DSL backend (`search_query_generator`)
//!
//! ```no_run
//! use std::collections::HashMap;
//! use entityql::{EntityCatalog, JsonPredicateFactory, QueryDelegates, QueryParser};
//!
//! let catalog = EntityCatalog::from_yaml_file("schema.yaml")?;
//! let factory = JsonPredicateFactory::new();
//! let parameters = HashMap::new();
//! let delegates = QueryDelegates::new(&catalog, &factory, &parameters);
//!
//! let result = QueryParser::default()
//!     .parse::<serde_json::Value>("from Book b where b.id = 4", &delegates)?;
//! println!("{}", result.query);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod entity_catalog;
pub mod errors;
pub mod hql_parser;
pub mod predicate;
pub mod query_engine;
pub mod query_resolver;
pub mod render_plan;
pub mod search_query_generator;

pub use config::EngineConfig;
pub use entity_catalog::{EntityCatalog, EntityType, PropertyValue};
pub use errors::QueryError;
pub use query_engine::{QueryDelegates, QueryParser};
pub use render_plan::{Projection, QueryParsingResult, SortField};
pub use search_query_generator::JsonPredicateFactory;
