use nom::{
    bytes::complete::{tag_no_case, take_while},
    character::complete::{char, multispace0, satisfy},
    combinator::{not, peek, recognize},
    error::ParseError,
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    IResult, Parser,
};

use super::errors::HqlParsingError;

pub type PResult<'a, O> = IResult<&'a str, O, HqlParsingError<'a>>;

const RESERVED_KEYWORDS: &[&str] = &[
    "SELECT", "DISTINCT", "FROM", "AS", "JOIN", "INNER", "LEFT", "OUTER", "FETCH", "WHERE",
    "GROUP", "BY", "HAVING", "ORDER", "ASC", "DESC", "AND", "OR", "NOT", "BETWEEN", "IN",
    "LIKE", "ESCAPE", "IS", "NULL", "TRUE", "FALSE",
];

pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn is_reserved_keyword(s: &str) -> bool {
    RESERVED_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(s))
}

/// Case-insensitive keyword that must not run into a longer identifier,
/// so `OR` does not match the start of `ORDER`.
pub fn keyword<'a>(
    kw: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = HqlParsingError<'a>> {
    ws(terminated(
        tag_no_case(kw),
        not(peek(satisfy(is_identifier_char))),
    ))
}

pub fn parse_identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        satisfy(is_identifier_start),
        take_while(is_identifier_char),
    ))
    .parse(input)
}

/// Identifier that may introduce or reference an alias (never a keyword).
pub fn parse_alias(input: &str) -> PResult<'_, &str> {
    let (remaining, ident) = ws(parse_identifier).parse(input)?;
    if is_reserved_keyword(ident) {
        return Err(nom::Err::Error(HqlParsingError::new(
            input,
            "reserved keyword cannot be used as an alias",
        )));
    }
    Ok((remaining, ident))
}

/// Simple or dotted entity name, e.g. `Book` or `com.acme.Book`.
pub fn parse_entity_name(input: &str) -> PResult<'_, &str> {
    let (remaining, name) = ws(recognize(pair(
        parse_identifier,
        many0(preceded(char('.'), parse_identifier)),
    )))
    .parse(input)?;
    if is_reserved_keyword(name) {
        return Err(nom::Err::Error(HqlParsingError::new(
            input,
            "expected an entity name",
        )));
    }
    Ok((remaining, name))
}
