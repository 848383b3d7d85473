use crate::entity_catalog::{EntityType, PropertyValue};
use crate::hql_parser::ast::ComparisonOperator;
use crate::predicate::AggregationPropertyPath;

use super::{alias_table::AliasTable, property_path::PropertyPath};

/// Statement after the resolution pass: every property reference is a
/// validated [`PropertyPath`] and every named parameter carries its value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStatement {
    pub target_entity: EntityType,
    /// Entity name as written in the FROM clause
    pub target_entity_name: String,
    pub distinct: bool,
    pub projections: Vec<ResolvedProjection>,
    pub where_clause: Option<ResolvedExpression>,
    pub group_by: Vec<PropertyPath>,
    pub having: Option<ResolvedExpression>,
    pub order_by: Vec<ResolvedSortItem>,
    pub alias_table: AliasTable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedProjection {
    Path(PropertyPath),
    Aggregate(AggregationPropertyPath),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSortItem {
    pub path: PropertyPath,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedOperand {
    Path(PropertyPath),
    Aggregate(AggregationPropertyPath),
    /// Literal text, converted during rendering
    Literal(String),
    Parameter { name: String, value: PropertyValue },
}

impl ResolvedOperand {
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            ResolvedOperand::Literal(_) | ResolvedOperand::Parameter { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedExpression {
    And(Vec<ResolvedExpression>),
    Or(Vec<ResolvedExpression>),
    Not(Box<ResolvedExpression>),
    Comparison {
        left: ResolvedOperand,
        operator: ComparisonOperator,
        right: ResolvedOperand,
    },
    Between {
        operand: ResolvedOperand,
        lower: ResolvedOperand,
        upper: ResolvedOperand,
        negated: bool,
    },
    In {
        operand: ResolvedOperand,
        values: Vec<ResolvedOperand>,
        negated: bool,
    },
    Like {
        operand: ResolvedOperand,
        pattern: ResolvedOperand,
        escape: Option<char>,
        negated: bool,
    },
    IsNull {
        operand: ResolvedOperand,
        negated: bool,
    },
}
