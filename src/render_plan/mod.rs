//! Rendering pass.
//!
//! Walks a [`ResolvedStatement`] a second time and produces the
//! [`QueryParsingResult`]: projections, the WHERE query built through a
//! [`QueryBuilder`], the HAVING query built through a [`HavingBuilder`], sort
//! fields and group-by properties. Every property path is canonicalized through
//! the statement's [`AliasTable`] before it reaches a builder.

mod parsing_result;

pub use parsing_result::{Projection, QueryParsingResult, SortField};

use crate::entity_catalog::PropertyHelper;
use crate::errors::{QueryError, UnsupportedFeatureError};
use crate::hql_parser::ast::ComparisonOperator;
use crate::predicate::{
    AggregatedProperty, AggregationPredicateFactory, ComparisonType, ConditionBuilder,
    HavingBuilder, OperandValue, PredicateFactory, QueryBuilder,
};
use crate::query_resolver::{
    AliasBinding, AliasTable, ResolvedExpression, ResolvedOperand, ResolvedProjection,
    ResolvedStatement,
};

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, QueryError>;

/// Maps a condition operand to the property a builder leaf is keyed by;
/// `None` for literal and parameter operands.
type SubjectFn<'a, P> = dyn Fn(&ResolvedOperand) -> RenderResult<Option<P>> + 'a;

pub fn render<Q>(
    statement: &ResolvedStatement,
    property_helper: &dyn PropertyHelper,
    predicate_factory: &dyn PredicateFactory<Q>,
    aggregation_factory: &dyn AggregationPredicateFactory<Q>,
) -> RenderResult<QueryParsingResult<Q>> {
    let aliases = &statement.alias_table;

    let projections = statement
        .projections
        .iter()
        .map(|projection| render_projection(aliases, projection))
        .collect::<RenderResult<Vec<_>>>()?;

    let mut builder = QueryBuilder::new(
        statement.target_entity.clone(),
        predicate_factory,
        property_helper,
    );
    if let Some(expression) = &statement.where_clause {
        let subject = |operand: &ResolvedOperand| where_subject(aliases, operand);
        render_condition(&mut builder, expression, &subject)?;
    }
    let query = builder.build()?;

    let having = match &statement.having {
        Some(expression) => {
            let mut builder = HavingBuilder::new(
                statement.target_entity.clone(),
                predicate_factory,
                aggregation_factory,
                property_helper,
            );
            let subject = |operand: &ResolvedOperand| having_subject(aliases, operand);
            render_condition(&mut builder, expression, &subject)?;
            Some(builder.build()?)
        }
        None => None,
    };

    let sort = statement
        .order_by
        .iter()
        .map(|item| -> RenderResult<SortField> {
            Ok(SortField {
                property: aliases.canonical_path(&item.path)?.join("."),
                ascending: item.ascending,
            })
        })
        .collect::<RenderResult<Vec<_>>>()?;

    let group_by = statement
        .group_by
        .iter()
        .map(|path| -> RenderResult<String> { Ok(aliases.canonical_path(path)?.join(".")) })
        .collect::<RenderResult<Vec<_>>>()?;

    log::debug!(
        "rendered query over '{}': {} projection(s), {} sort field(s), having: {}",
        statement.target_entity,
        projections.len(),
        sort.len(),
        having.is_some()
    );

    Ok(QueryParsingResult {
        query,
        target_entity: statement.target_entity.clone(),
        target_entity_name: statement.target_entity_name.clone(),
        projections,
        sort,
        group_by,
        having,
        distinct: statement.distinct,
    })
}

fn render_projection(
    aliases: &AliasTable,
    projection: &ResolvedProjection,
) -> RenderResult<Projection> {
    match projection {
        ResolvedProjection::Path(path)
            if path.is_alias_only()
                && matches!(
                    path.root_alias().and_then(|alias| aliases.get(alias)),
                    Some(AliasBinding::Root(_))
                ) =>
        {
            Ok(Projection::Entity)
        }
        ResolvedProjection::Path(path) => Ok(Projection::Property(
            aliases.canonical_path(path)?.join("."),
        )),
        ResolvedProjection::Aggregate(aggregate) => Ok(Projection::Aggregate {
            function: aggregate.aggregation,
            property: aliases.canonical_path(&aggregate.path)?.join("."),
        }),
    }
}

fn where_subject(
    aliases: &AliasTable,
    operand: &ResolvedOperand,
) -> RenderResult<Option<Vec<String>>> {
    match operand {
        ResolvedOperand::Path(path) => Ok(Some(aliases.canonical_path(path)?)),
        ResolvedOperand::Aggregate(aggregate) => {
            Err(UnsupportedFeatureError::AggregateOutsideHaving {
                expression: aggregate.to_string(),
            }
            .into())
        }
        ResolvedOperand::Literal(_) | ResolvedOperand::Parameter { .. } => Ok(None),
    }
}

fn having_subject(
    aliases: &AliasTable,
    operand: &ResolvedOperand,
) -> RenderResult<Option<AggregatedProperty>> {
    match operand {
        ResolvedOperand::Aggregate(aggregate) => Ok(Some(AggregatedProperty::new(
            aggregate.aggregation,
            aliases.canonical_path(&aggregate.path)?,
        ))),
        ResolvedOperand::Path(path) => Err(UnsupportedFeatureError::PlainPropertyInHaving {
            property: path.to_string(),
        }
        .into()),
        ResolvedOperand::Literal(_) | ResolvedOperand::Parameter { .. } => Ok(None),
    }
}

fn comparison_type(operator: ComparisonOperator) -> ComparisonType {
    match operator {
        ComparisonOperator::Equal => ComparisonType::Equals,
        ComparisonOperator::NotEqual => ComparisonType::NotEquals,
        ComparisonOperator::LessThan => ComparisonType::Less,
        ComparisonOperator::LessThanEqual => ComparisonType::LessOrEqual,
        ComparisonOperator::GreaterThan => ComparisonType::Greater,
        ComparisonOperator::GreaterThanEqual => ComparisonType::GreaterOrEqual,
    }
}

fn describe(operand: &ResolvedOperand) -> String {
    match operand {
        ResolvedOperand::Path(path) => path.to_string(),
        ResolvedOperand::Aggregate(aggregate) => aggregate.to_string(),
        ResolvedOperand::Literal(text) => format!("'{}'", text),
        ResolvedOperand::Parameter { name, .. } => format!(":{}", name),
    }
}

/// Value side of a condition whose property side is `property`
fn operand_value(property: &ResolvedOperand, operand: &ResolvedOperand) -> RenderResult<OperandValue> {
    match operand {
        ResolvedOperand::Literal(text) => Ok(OperandValue::Literal(text.clone())),
        ResolvedOperand::Parameter { value, .. } => Ok(OperandValue::Parameter(value.clone())),
        ResolvedOperand::Path(_) | ResolvedOperand::Aggregate(_) => {
            Err(UnsupportedFeatureError::PropertyComparison {
                left: describe(property),
                right: describe(operand),
            }
            .into())
        }
    }
}

/// Property side of a BETWEEN/IN/LIKE/IS NULL condition
fn required_subject<P>(
    operand: &ResolvedOperand,
    subject: &SubjectFn<'_, P>,
) -> RenderResult<P> {
    subject(operand)?.ok_or_else(|| UnsupportedFeatureError::ConstantPredicate.into())
}

/// Wrap a positive leaf in a `Not` scope when the condition is negated
fn negatable<B: ConditionBuilder>(
    builder: &mut B,
    negated: bool,
    add: impl FnOnce(&mut B) -> RenderResult<()>,
) -> RenderResult<()> {
    if !negated {
        return add(builder);
    }
    builder.push_not()?;
    add(builder)?;
    builder.pop()?;
    Ok(())
}

fn render_children<B: ConditionBuilder>(
    builder: &mut B,
    children: &[ResolvedExpression],
    subject: &SubjectFn<'_, B::Property>,
) -> RenderResult<()> {
    for child in children {
        render_condition(builder, child, subject)?;
    }
    builder.pop()?;
    Ok(())
}

fn render_condition<B: ConditionBuilder>(
    builder: &mut B,
    expression: &ResolvedExpression,
    subject: &SubjectFn<'_, B::Property>,
) -> RenderResult<()> {
    match expression {
        ResolvedExpression::And(children) => {
            builder.push_and()?;
            render_children(builder, children, subject)
        }
        ResolvedExpression::Or(children) => {
            builder.push_or()?;
            render_children(builder, children, subject)
        }
        ResolvedExpression::Not(child) => {
            builder.push_not()?;
            render_children(builder, std::slice::from_ref(&**child), subject)
        }
        ResolvedExpression::Comparison {
            left,
            operator,
            right,
        } => {
            let op = comparison_type(*operator);
            // `5 < e.id` is rendered as `e.id > 5`
            let (property, op, value) = match (subject(left)?, subject(right)?) {
                (Some(property), None) => (property, op, operand_value(left, right)?),
                (None, Some(property)) => (property, op.mirrored(), operand_value(right, left)?),
                (Some(_), Some(_)) => {
                    return Err(UnsupportedFeatureError::PropertyComparison {
                        left: describe(left),
                        right: describe(right),
                    }
                    .into())
                }
                (None, None) => return Err(UnsupportedFeatureError::ConstantPredicate.into()),
            };
            builder.add_comparison(&property, op, value)
        }
        ResolvedExpression::Between {
            operand,
            lower,
            upper,
            negated,
        } => {
            let property = required_subject(operand, subject)?;
            let lower = operand_value(operand, lower)?;
            let upper = operand_value(operand, upper)?;
            negatable(builder, *negated, |b| b.add_range(&property, lower, upper))
        }
        ResolvedExpression::In {
            operand,
            values,
            negated,
        } => {
            let property = required_subject(operand, subject)?;
            let values = values
                .iter()
                .map(|value| operand_value(operand, value))
                .collect::<RenderResult<Vec<_>>>()?;
            negatable(builder, *negated, |b| b.add_in(&property, values))
        }
        ResolvedExpression::Like {
            operand,
            pattern,
            escape,
            negated,
        } => {
            let property = required_subject(operand, subject)?;
            let pattern = operand_value(operand, pattern)?;
            negatable(builder, *negated, |b| b.add_like(&property, pattern, *escape))
        }
        ResolvedExpression::IsNull { operand, negated } => {
            let property = required_subject(operand, subject)?;
            negatable(builder, *negated, |b| b.add_is_null(&property))
        }
    }
}
