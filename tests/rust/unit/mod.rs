//! Unit tests - public building blocks exercised without the orchestrator
//!
//! These tests drive the parser, the predicate builders and the resolution pass
//! through the crate's public API.

mod parser_robustness_tests;
mod predicate_builder_tests;
