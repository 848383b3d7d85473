use nom::error::{ContextError, ParseError};
use std::fmt;

use crate::errors::SyntaxError;

#[derive(Debug, PartialEq)]
pub struct HqlParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> HqlParsingError<'a> {
    pub fn new(input: &'a str, message: &'static str) -> Self {
        HqlParsingError {
            errors: vec![(input, message)],
        }
    }

    /// Convert into a [`SyntaxError`] positioned relative to the full query text.
    ///
    /// The first recorded entry is the innermost failure; later entries are the
    /// contexts it bubbled through.
    pub fn to_syntax_error(&self, query: &str) -> SyntaxError {
        let offset = self
            .errors
            .first()
            .map_or(0, |(rest, _)| query.len().saturating_sub(rest.len()));

        let contexts: Vec<&str> = self
            .errors
            .iter()
            .map(|(_, ctx)| *ctx)
            .filter(|ctx| !ctx.starts_with("unknown error"))
            .collect();

        let message = if contexts.is_empty() {
            "unable to parse query".to_string()
        } else {
            contexts.join(": ")
        };
        SyntaxError::new(message, offset)
    }
}

impl<'a> ParseError<&'a str> for HqlParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        HqlParsingError {
            errors: vec![(input, "unknown error")],
        }
    }

    fn append(input: &'a str, _kind: nom::error::ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "unknown error (appended)"));
        other
    }
}

impl<'a> ContextError<&'a str> for HqlParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for HqlParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            writeln!(f, "{}: {:}", ctx, input)?;
        }
        Ok(())
    }
}

impl<'a> From<nom::error::Error<&'a str>> for HqlParsingError<'a> {
    fn from(err: nom::error::Error<&'a str>) -> Self {
        HqlParsingError {
            errors: vec![(err.input, "Unable to parse")],
        }
    }
}
