use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{cut, map, opt, recognize},
    error::context,
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded},
    Parser,
};

use super::{
    ast::{
        AggregateExpression, AggregateFunction, BooleanExpression, ComparisonOperator, Literal,
        Operand, PathExpression,
    },
    common::{is_identifier_char, is_reserved_keyword, keyword, parse_identifier, ws, PResult},
    errors::HqlParsingError,
};

/// Maximum number of nested parentheses and NOT operators in one predicate.
pub const MAX_NESTING_DEPTH: usize = 64;

pub fn parse_expression(input: &'_ str) -> PResult<'_, BooleanExpression<'_>> {
    parse_logical_or(input, 0)
}

fn parse_logical_or(input: &'_ str, depth: usize) -> PResult<'_, BooleanExpression<'_>> {
    let (input, first) = parse_logical_and(input, depth)?;
    let (input, rest) = many0(preceded(
        keyword("OR"),
        context(
            "expected a predicate after OR",
            cut(|i| parse_logical_and(i, depth)),
        ),
    ))
    .parse(input)?;

    if rest.is_empty() {
        Ok((input, first))
    } else {
        let mut operands = vec![first];
        operands.extend(rest);
        Ok((input, BooleanExpression::Or(operands)))
    }
}

fn parse_logical_and(input: &'_ str, depth: usize) -> PResult<'_, BooleanExpression<'_>> {
    let (input, first) = parse_not_expression(input, depth)?;
    let (input, rest) = many0(preceded(
        keyword("AND"),
        context(
            "expected a predicate after AND",
            cut(|i| parse_not_expression(i, depth)),
        ),
    ))
    .parse(input)?;

    if rest.is_empty() {
        Ok((input, first))
    } else {
        let mut operands = vec![first];
        operands.extend(rest);
        Ok((input, BooleanExpression::And(operands)))
    }
}

// NOT binds looser than comparisons: "NOT a = b" is "NOT (a = b)"
fn parse_not_expression(input: &'_ str, depth: usize) -> PResult<'_, BooleanExpression<'_>> {
    if depth > MAX_NESTING_DEPTH {
        return Err(nom::Err::Failure(HqlParsingError::new(
            input,
            "predicate nesting exceeds the maximum depth of 64",
        )));
    }

    alt((
        map(
            preceded(keyword("NOT"), cut(|i| parse_not_expression(i, depth + 1))),
            |expr| BooleanExpression::Not(Box::new(expr)),
        ),
        |i| parse_primary(i, depth),
    ))
    .parse(input)
}

fn parse_primary(input: &'_ str, depth: usize) -> PResult<'_, BooleanExpression<'_>> {
    alt((
        delimited(
            ws(char('(')),
            |i| parse_logical_or(i, depth + 1),
            context("expected ')'", cut(ws(char(')')))),
        ),
        parse_predicate,
    ))
    .parse(input)
}

fn parse_comparison_operator(input: &str) -> PResult<'_, ComparisonOperator> {
    ws(alt((
        map(tag(">="), |_| ComparisonOperator::GreaterThanEqual),
        map(tag("<="), |_| ComparisonOperator::LessThanEqual),
        map(tag("<>"), |_| ComparisonOperator::NotEqual),
        map(tag("!="), |_| ComparisonOperator::NotEqual),
        map(tag(">"), |_| ComparisonOperator::GreaterThan),
        map(tag("<"), |_| ComparisonOperator::LessThan),
        map(tag("="), |_| ComparisonOperator::Equal),
    )))
    .parse(input)
}

/// A single condition: comparison, BETWEEN, IN, LIKE or IS NULL.
fn parse_predicate(input: &'_ str) -> PResult<'_, BooleanExpression<'_>> {
    let (input, operand) = parse_operand(input)?;

    // IS [NOT] NULL
    if let Ok((rest, _)) = keyword("IS").parse(input) {
        let (rest, negated) = opt(keyword("NOT")).parse(rest)?;
        let (rest, _) = context("expected NULL after IS", cut(keyword("NULL"))).parse(rest)?;
        return Ok((
            rest,
            BooleanExpression::IsNull {
                operand,
                negated: negated.is_some(),
            },
        ));
    }

    let (after_not, negated) = opt(keyword("NOT")).parse(input)?;
    let negated = negated.is_some();

    if let Ok((rest, _)) = keyword("BETWEEN").parse(after_not) {
        let (rest, lower) = context("expected lower bound", cut(parse_operand)).parse(rest)?;
        let (rest, _) = context("expected AND in BETWEEN", cut(keyword("AND"))).parse(rest)?;
        let (rest, upper) = context("expected upper bound", cut(parse_operand)).parse(rest)?;
        return Ok((
            rest,
            BooleanExpression::Between {
                operand,
                lower,
                upper,
                negated,
            },
        ));
    }

    if let Ok((rest, _)) = keyword("IN").parse(after_not) {
        let (rest, values) = context(
            "expected a parenthesized value list after IN",
            cut(delimited(
                ws(char('(')),
                separated_list1(ws(char(',')), parse_operand),
                ws(char(')')),
            )),
        )
        .parse(rest)?;
        return Ok((
            rest,
            BooleanExpression::In {
                operand,
                values,
                negated,
            },
        ));
    }

    if let Ok((rest, _)) = keyword("LIKE").parse(after_not) {
        let (rest, pattern) = context("expected LIKE pattern", cut(parse_operand)).parse(rest)?;
        let (rest, escape) = opt(preceded(
            keyword("ESCAPE"),
            context(
                "ESCAPE expects a single character literal",
                cut(parse_escape_character),
            ),
        ))
        .parse(rest)?;
        return Ok((
            rest,
            BooleanExpression::Like {
                operand,
                pattern,
                escape,
                negated,
            },
        ));
    }

    if negated {
        return Err(nom::Err::Failure(HqlParsingError::new(
            after_not,
            "expected BETWEEN, IN or LIKE after NOT",
        )));
    }

    let (input, operator) = context(
        "expected a comparison operator, BETWEEN, IN, LIKE or IS",
        parse_comparison_operator,
    )
    .parse(input)?;
    let (input, right) = context("expected a right-hand operand", cut(parse_operand)).parse(input)?;

    Ok((
        input,
        BooleanExpression::Comparison {
            left: operand,
            operator,
            right,
        },
    ))
}

fn parse_escape_character(input: &str) -> PResult<'_, char> {
    let (rest, literal) = ws(parse_string_literal).parse(input)?;
    let mut chars = literal.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok((rest, c)),
        _ => Err(nom::Err::Error(HqlParsingError::new(
            input,
            "escape must be exactly one character",
        ))),
    }
}

pub fn parse_operand(input: &'_ str) -> PResult<'_, Operand<'_>> {
    ws(alt((
        map(parse_string_literal, |s| Operand::Literal(Literal::String(s))),
        map(parse_numeric_literal, |n| Operand::Literal(Literal::Numeric(n))),
        parse_boolean_literal,
        parse_named_parameter,
        parse_positional_parameter,
        map(parse_aggregate_expression, Operand::Aggregate),
        map(parse_path_expression, Operand::Path),
    )))
    .parse(input)
}

/// `'...'` with `''` standing for one quote.
pub fn parse_string_literal(input: &str) -> PResult<'_, String> {
    let (mut rest, _) = char('\'').parse(input)?;
    let mut value = String::new();
    loop {
        let Some(pos) = rest.find('\'') else {
            return Err(nom::Err::Failure(HqlParsingError::new(
                input,
                "unterminated string literal",
            )));
        };
        value.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if let Some(stripped) = after.strip_prefix('\'') {
            value.push('\'');
            rest = stripped;
        } else {
            return Ok((after, value));
        }
    }
}

/// Matches: 123, -123, 3.14, -0.5
fn parse_numeric_literal(input: &str) -> PResult<'_, &str> {
    let (rest, number) = recognize(pair(
        opt(char('-')),
        alt((recognize((digit1, char('.'), digit1)), digit1)),
    ))
    .parse(input)?;

    // "4abc" is neither a number nor an identifier
    if rest.starts_with(is_identifier_char) {
        return Err(nom::Err::Error(HqlParsingError::new(
            input,
            "malformed numeric literal",
        )));
    }
    Ok((rest, number))
}

fn parse_boolean_literal(input: &'_ str) -> PResult<'_, Operand<'_>> {
    alt((
        map(keyword("TRUE"), |_| Operand::Literal(Literal::Boolean(true))),
        map(keyword("FALSE"), |_| Operand::Literal(Literal::Boolean(false))),
    ))
    .parse(input)
}

fn parse_named_parameter(input: &'_ str) -> PResult<'_, Operand<'_>> {
    map(
        preceded(char(':'), take_while1(is_identifier_char)),
        Operand::NamedParameter,
    )
    .parse(input)
}

fn parse_positional_parameter(input: &'_ str) -> PResult<'_, Operand<'_>> {
    let (input, _) = char('?').parse(input)?;
    let (input, position) = opt(digit1).parse(input)?;
    Ok((
        input,
        Operand::PositionalParameter(position.and_then(|p: &str| p.parse().ok())),
    ))
}

pub fn parse_aggregate_expression(input: &'_ str) -> PResult<'_, AggregateExpression<'_>> {
    let (input, function) = alt((
        map(keyword("SUM"), |_| AggregateFunction::Sum),
        map(keyword("AVG"), |_| AggregateFunction::Avg),
        map(keyword("MIN"), |_| AggregateFunction::Min),
        map(keyword("MAX"), |_| AggregateFunction::Max),
        map(keyword("COUNT"), |_| AggregateFunction::Count),
    ))
    .parse(input)?;
    // Only an aggregate when a parenthesis follows; `e.count` stays a property
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, distinct) = opt(keyword("DISTINCT")).parse(input)?;
    let (input, path) = context(
        "expected a property path inside the aggregate function",
        cut(parse_path_expression),
    )
    .parse(input)?;
    let (input, _) = context("expected ')'", cut(ws(char(')')))).parse(input)?;

    Ok((
        input,
        AggregateExpression {
            function,
            distinct: distinct.is_some(),
            path,
        },
    ))
}

/// `alias.property.nested`, an unqualified `property`, or a bare `alias`,
/// optionally followed by an index `[operand]`. Index operands cannot be
/// indexed themselves.
pub fn parse_path_expression(input: &'_ str) -> PResult<'_, PathExpression<'_>> {
    let (input, mut path) = parse_plain_path(input)?;
    let (input, index) = opt(delimited(
        ws(char('[')),
        context("expected an index expression", cut(parse_index_operand)),
        context("expected ']'", cut(ws(char(']')))),
    ))
    .parse(input)?;
    path.index = index.map(Box::new);
    Ok((input, path))
}

fn parse_plain_path(input: &'_ str) -> PResult<'_, PathExpression<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let start = input;
    let (input, first) = parse_identifier(input)?;
    if is_reserved_keyword(first) {
        return Err(nom::Err::Error(HqlParsingError::new(
            start,
            "expected a property path",
        )));
    }
    let (input, rest) = many0(preceded(char('.'), parse_identifier)).parse(input)?;
    let (input, _) = multispace0.parse(input)?;

    let mut segments = vec![first];
    segments.extend(rest);
    Ok((input, PathExpression::new(segments)))
}

fn parse_index_operand(input: &'_ str) -> PResult<'_, Operand<'_>> {
    ws(alt((
        map(parse_string_literal, |s| Operand::Literal(Literal::String(s))),
        map(parse_numeric_literal, |n| Operand::Literal(Literal::Numeric(n))),
        parse_named_parameter,
        parse_positional_parameter,
        map(parse_plain_path, Operand::Path),
    )))
    .parse(input)
}
