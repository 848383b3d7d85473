use nom::{
    branch::alt,
    character::complete::char,
    combinator::{cut, map, opt},
    error::context,
    multi::separated_list1,
    Parser,
};

use super::{
    ast::{SelectClause, SelectItem},
    common::{keyword, ws, PResult},
    expression::{parse_aggregate_expression, parse_path_expression},
};

pub fn parse_select_clause(input: &'_ str) -> PResult<'_, SelectClause<'_>> {
    let (input, _) = keyword("SELECT").parse(input)?;
    let (input, distinct) = opt(keyword("DISTINCT")).parse(input)?;

    let (input, select_items) = context(
        "Error in select clause: expected a property path or aggregate",
        cut(separated_list1(ws(char(',')), parse_select_item)),
    )
    .parse(input)?;

    Ok((
        input,
        SelectClause {
            distinct: distinct.is_some(),
            select_items,
        },
    ))
}

fn parse_select_item(input: &'_ str) -> PResult<'_, SelectItem<'_>> {
    alt((
        map(parse_aggregate_expression, SelectItem::Aggregate),
        map(parse_path_expression, SelectItem::Path),
    ))
    .parse(input)
}
