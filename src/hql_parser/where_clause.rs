use nom::{combinator::cut, error::context, Parser};

use super::{
    ast::{HavingClause, WhereClause},
    common::{keyword, PResult},
    expression::parse_expression,
};

pub fn parse_where_clause(input: &'_ str) -> PResult<'_, WhereClause<'_>> {
    let (input, _) = keyword("WHERE").parse(input)?;

    let (input, conditions) =
        context("Error in where clause", cut(parse_expression)).parse(input)?;

    Ok((input, WhereClause { conditions }))
}

pub fn parse_having_clause(input: &'_ str) -> PResult<'_, HavingClause<'_>> {
    let (input, _) = keyword("HAVING").parse(input)?;

    let (input, conditions) =
        context("Error in having clause", cut(parse_expression)).parse(input)?;

    Ok((input, HavingClause { conditions }))
}
