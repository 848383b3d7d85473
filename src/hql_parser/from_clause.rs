use nom::{
    branch::alt,
    character::complete::char,
    combinator::{cut, opt, value},
    error::context,
    multi::{many0, separated_list1},
    sequence::{pair, preceded},
    Parser,
};

use super::{
    ast::{FromClause, JoinClause, JoinType, PersisterSpace},
    common::{keyword, parse_alias, parse_entity_name, ws, PResult},
    expression::parse_path_expression,
};

pub fn parse_from_clause(input: &'_ str) -> PResult<'_, FromClause<'_>> {
    let (input, _) = keyword("FROM").parse(input)?;

    let (input, persister_spaces) = context(
        "Error in from clause: expected an entity name",
        cut(separated_list1(ws(char(',')), parse_persister_space)),
    )
    .parse(input)?;

    let (input, joins) = many0(parse_join_clause).parse(input)?;

    Ok((
        input,
        FromClause {
            persister_spaces,
            joins,
        },
    ))
}

fn parse_persister_space(input: &'_ str) -> PResult<'_, PersisterSpace<'_>> {
    let (input, entity_name) = parse_entity_name(input)?;
    let (input, alias) = opt(preceded(opt(keyword("AS")), parse_alias)).parse(input)?;
    Ok((input, PersisterSpace { entity_name, alias }))
}

fn parse_join_type(input: &str) -> PResult<'_, JoinType> {
    alt((
        value(
            JoinType::LeftOuter,
            pair(keyword("LEFT"), opt(keyword("OUTER"))),
        ),
        value(JoinType::Inner, keyword("INNER")),
    ))
    .parse(input)
}

fn parse_join_clause(input: &'_ str) -> PResult<'_, JoinClause<'_>> {
    let (input, join_type) = opt(parse_join_type).parse(input)?;
    let (input, _) = keyword("JOIN").parse(input)?;
    let (input, fetch) = opt(keyword("FETCH")).parse(input)?;
    let (input, path) = context(
        "Error in join: expected an association path",
        cut(parse_path_expression),
    )
    .parse(input)?;
    let (input, alias) = context(
        "Error in join: expected an alias",
        cut(preceded(opt(keyword("AS")), parse_alias)),
    )
    .parse(input)?;

    Ok((
        input,
        JoinClause {
            join_type: join_type.unwrap_or(JoinType::Inner),
            fetch: fetch.is_some(),
            path,
            alias,
        },
    ))
}
