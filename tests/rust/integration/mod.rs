//! Integration tests - the whole pipeline against file-backed schemas
//!
//! These tests verify that parsing, resolution and rendering work together
//! through the public API.

mod common;
mod end_to_end_tests;
mod named_parameter_tests;
mod schema_loading_tests;
mod search_request_tests;
