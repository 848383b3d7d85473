use nom::{
    branch::alt,
    character::complete::char,
    combinator::{cut, map, opt},
    error::context,
    multi::separated_list1,
    Parser,
};

use super::{
    ast::{GroupByClause, OrderByClause, OrderByItem},
    common::{keyword, ws, PResult},
    expression::parse_path_expression,
};

pub fn parse_order_by_clause(input: &'_ str) -> PResult<'_, OrderByClause<'_>> {
    let (input, _) = keyword("ORDER").parse(input)?;
    let (input, _) = context("expected BY after ORDER", cut(keyword("BY"))).parse(input)?;

    let (input, order_by_items) = context(
        "Error in order by clause",
        cut(separated_list1(ws(char(',')), parse_order_by_item)),
    )
    .parse(input)?;

    Ok((input, OrderByClause { order_by_items }))
}

fn parse_order_by_item(input: &'_ str) -> PResult<'_, OrderByItem<'_>> {
    let (input, path) = parse_path_expression(input)?;
    let (input, direction) = opt(alt((
        map(keyword("ASC"), |_| true),
        map(keyword("DESC"), |_| false),
    )))
    .parse(input)?;

    Ok((
        input,
        OrderByItem {
            path,
            ascending: direction.unwrap_or(true),
        },
    ))
}

pub fn parse_group_by_clause(input: &'_ str) -> PResult<'_, GroupByClause<'_>> {
    let (input, _) = keyword("GROUP").parse(input)?;
    let (input, _) = context("expected BY after GROUP", cut(keyword("BY"))).parse(input)?;

    let (input, paths) = context(
        "Error in group by clause",
        cut(separated_list1(ws(char(',')), parse_path_expression)),
    )
    .parse(input)?;

    Ok((input, GroupByClause { paths }))
}
