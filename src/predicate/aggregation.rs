//! HAVING conditions over aggregated properties.

use serde::Serialize;
use std::fmt;

use crate::entity_catalog::{EntityType, PropertyHelper, PropertyValue};
use crate::errors::{PredicateStructureError, QueryError, SchemaError};
use crate::query_resolver::PropertyPath;

use super::{
    builder::{ConditionBuilder, OperandValue, PredicateStack},
    factory::{AggregationPredicateFactory, PredicateFactory},
    tree::{ComparisonType, Condition, Predicate},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationFunction {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    CountDistinct,
}

impl AggregationFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationFunction::Sum => "sum",
            AggregationFunction::Avg => "avg",
            AggregationFunction::Min => "min",
            AggregationFunction::Max => "max",
            AggregationFunction::Count => "count",
            AggregationFunction::CountDistinct => "count_distinct",
        }
    }

    pub fn is_count(&self) -> bool {
        matches!(
            self,
            AggregationFunction::Count | AggregationFunction::CountDistinct
        )
    }
}

impl fmt::Display for AggregationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved property path under an aggregation function, e.g. `sum(e.size)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationPropertyPath {
    pub path: PropertyPath,
    pub aggregation: AggregationFunction,
}

impl fmt::Display for AggregationPropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.aggregation, self.path)
    }
}

/// Canonical property path paired with its aggregation, as HAVING leaves take it.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedProperty {
    pub aggregation: AggregationFunction,
    pub path: Vec<String>,
}

impl AggregatedProperty {
    pub fn new(aggregation: AggregationFunction, path: Vec<String>) -> Self {
        AggregatedProperty { aggregation, path }
    }

    fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// Builds the HAVING predicate of one query.
///
/// Same scope discipline as [`super::QueryBuilder`]. Literals compared with a
/// count convert to `Long`, with an average to `Double`; the remaining
/// functions keep the type of the aggregated property.
pub struct HavingBuilder<'b, Q> {
    entity_type: EntityType,
    factory: &'b dyn PredicateFactory<Q>,
    aggregation_factory: &'b dyn AggregationPredicateFactory<Q>,
    property_helper: &'b dyn PropertyHelper,
    stack: PredicateStack<Q>,
}

impl<'b, Q> HavingBuilder<'b, Q> {
    pub fn new(
        entity_type: EntityType,
        factory: &'b dyn PredicateFactory<Q>,
        aggregation_factory: &'b dyn AggregationPredicateFactory<Q>,
        property_helper: &'b dyn PropertyHelper,
    ) -> Self {
        HavingBuilder {
            entity_type,
            factory,
            aggregation_factory,
            property_helper,
            stack: PredicateStack::new(),
        }
    }

    fn convert(
        &self,
        property: &AggregatedProperty,
        value: OperandValue,
    ) -> Result<PropertyValue, SchemaError> {
        let literal = match value {
            OperandValue::Parameter(value) => return Ok(value),
            OperandValue::Literal(literal) => literal,
        };

        let invalid = |expected: &str| SchemaError::InvalidPropertyValue {
            property: format!("{}({})", property.aggregation, property.dotted()),
            value: literal.clone(),
            expected: expected.to_string(),
        };

        match property.aggregation {
            AggregationFunction::Count | AggregationFunction::CountDistinct => literal
                .trim()
                .parse::<i64>()
                .map(PropertyValue::Long)
                .map_err(|_| invalid("long")),
            AggregationFunction::Avg => literal
                .trim()
                .parse::<f64>()
                .map(PropertyValue::Double)
                .map_err(|_| invalid("double")),
            _ => self.property_helper.convert_to_property_type(
                &self.entity_type,
                &property.path,
                &literal,
            ),
        }
    }

    fn attach_leaf(
        &mut self,
        condition: Condition,
        aggregation: AggregationFunction,
        query: Q,
    ) -> Result<(), QueryError> {
        self.stack.attach(Predicate::Leaf {
            condition,
            aggregation: Some(aggregation),
            query,
        })?;
        Ok(())
    }

    pub fn into_predicate(self) -> Result<Predicate<Q>, PredicateStructureError> {
        self.stack.finish()
    }

    pub fn build(self) -> Result<Q, PredicateStructureError> {
        let factory = self.factory;
        let entity_type = self.entity_type.clone();
        self.stack.finish()?.render(factory, &entity_type)
    }
}

impl<Q> ConditionBuilder for HavingBuilder<'_, Q> {
    type Property = AggregatedProperty;

    fn push_and(&mut self) -> Result<(), PredicateStructureError> {
        self.stack.push(Predicate::and())
    }

    fn push_or(&mut self) -> Result<(), PredicateStructureError> {
        self.stack.push(Predicate::or())
    }

    fn push_not(&mut self) -> Result<(), PredicateStructureError> {
        self.stack.push(Predicate::not())
    }

    fn pop(&mut self) -> Result<(), PredicateStructureError> {
        self.stack.pop()
    }

    fn add_comparison(
        &mut self,
        property: &AggregatedProperty,
        op: ComparisonType,
        value: OperandValue,
    ) -> Result<(), QueryError> {
        let value = self.convert(property, value)?;
        let name = property.dotted();
        let query = self.aggregation_factory.comparison(
            &self.entity_type,
            property.aggregation,
            &name,
            op,
            &value,
        );
        self.attach_leaf(
            Condition::Comparison {
                property: name,
                op,
                value,
            },
            property.aggregation,
            query,
        )
    }

    fn add_range(
        &mut self,
        property: &AggregatedProperty,
        lower: OperandValue,
        upper: OperandValue,
    ) -> Result<(), QueryError> {
        let lower = self.convert(property, lower)?;
        let upper = self.convert(property, upper)?;
        let name = property.dotted();
        let query = self.aggregation_factory.range(
            &self.entity_type,
            property.aggregation,
            &name,
            &lower,
            &upper,
        );
        self.attach_leaf(
            Condition::Range {
                property: name,
                lower,
                upper,
            },
            property.aggregation,
            query,
        )
    }

    fn add_in(
        &mut self,
        property: &AggregatedProperty,
        values: Vec<OperandValue>,
    ) -> Result<(), QueryError> {
        let values = values
            .into_iter()
            .map(|value| self.convert(property, value))
            .collect::<Result<Vec<_>, _>>()?;
        let name = property.dotted();
        let query =
            self.aggregation_factory
                .in_(&self.entity_type, property.aggregation, &name, &values);
        self.attach_leaf(
            Condition::In {
                property: name,
                values,
            },
            property.aggregation,
            query,
        )
    }

    fn add_like(
        &mut self,
        property: &AggregatedProperty,
        pattern: OperandValue,
        escape: Option<char>,
    ) -> Result<(), QueryError> {
        let pattern = pattern.pattern_text();
        let name = property.dotted();
        let query = self.aggregation_factory.like(
            &self.entity_type,
            property.aggregation,
            &name,
            &pattern,
            escape,
        );
        self.attach_leaf(
            Condition::Like {
                property: name,
                pattern,
                escape,
            },
            property.aggregation,
            query,
        )
    }

    fn add_is_null(&mut self, property: &AggregatedProperty) -> Result<(), QueryError> {
        let name = property.dotted();
        let query =
            self.aggregation_factory
                .is_null(&self.entity_type, property.aggregation, &name);
        self.attach_leaf(
            Condition::IsNull { property: name },
            property.aggregation,
            query,
        )
    }
}
