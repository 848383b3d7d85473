//! HQL-style query text parser.
//!
//! Accepts a single statement of the shape
//! `[SELECT ...] FROM ... [WHERE ...] [GROUP BY ...] [HAVING ...] [ORDER BY ...] [;]`
//! and produces the borrowed [`ast::HqlStatement`] tree.

use ast::{
    FromClause, GroupByClause, HavingClause, HqlStatement, OrderByClause, SelectClause,
    WhereClause,
};
use common::{ws, PResult};
use nom::character::complete::{char, multispace0};
use nom::combinator::{cut, opt};
use nom::error::context;
use nom::Parser;

use crate::errors::SyntaxError;

pub mod ast;
mod common;
pub(crate) mod errors;
mod expression;
mod from_clause;
mod order_by_clause;
mod select_clause;
mod where_clause;

pub use expression::MAX_NESTING_DEPTH;

/// Parse one statement, leaving any unconsumed input to the caller.
pub fn parse_statement(input: &'_ str) -> PResult<'_, HqlStatement<'_>> {
    let (input, _) = multispace0.parse(input)?;

    let (input, select_clause): (&str, Option<SelectClause>) =
        opt(select_clause::parse_select_clause).parse(input)?;

    let (input, from_clause): (&str, FromClause) = context(
        "expected a FROM clause",
        cut(from_clause::parse_from_clause),
    )
    .parse(input)?;

    let (input, where_clause): (&str, Option<WhereClause>) =
        opt(where_clause::parse_where_clause).parse(input)?;
    let (input, group_by_clause): (&str, Option<GroupByClause>) =
        opt(order_by_clause::parse_group_by_clause).parse(input)?;
    let (input, having_clause): (&str, Option<HavingClause>) =
        opt(where_clause::parse_having_clause).parse(input)?;
    let (input, order_by_clause): (&str, Option<OrderByClause>) =
        opt(order_by_clause::parse_order_by_clause).parse(input)?;

    // Optional trailing semicolon
    let (input, _) = opt(ws(char(';'))).parse(input)?;

    Ok((
        input,
        HqlStatement {
            select_clause,
            from_clause,
            where_clause,
            group_by_clause,
            having_clause,
            order_by_clause,
        },
    ))
}

/// Parse a complete query text. Trailing input that is not part of the
/// statement is a syntax error.
pub fn parse_query(query: &str) -> Result<HqlStatement<'_>, SyntaxError> {
    match parse_statement(query) {
        Ok(("", statement)) => Ok(statement),
        Ok((rest, _)) => Err(SyntaxError::new(
            format!("unexpected input near '{}'", truncate(rest)),
            query.len() - rest.len(),
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e.to_syntax_error(query)),
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError::new("incomplete query", query.len())),
    }
}

fn truncate(rest: &str) -> &str {
    match rest.char_indices().nth(20) {
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}
