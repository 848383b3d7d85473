use crate::entity_catalog::{EntityType, PropertyValue};

use super::{aggregation::AggregationFunction, tree::ComparisonType};

/// Backend code generation for filter predicates.
///
/// Leaf constructors are called once per condition while the tree is built;
/// the combinators are called bottom-up when the tree is rendered. `property`
/// is always the canonical dotted path below `entity_type`.
pub trait PredicateFactory<Q> {
    fn match_all(&self, entity_type: &EntityType) -> Q;

    fn comparison(
        &self,
        entity_type: &EntityType,
        property: &str,
        op: ComparisonType,
        value: &PropertyValue,
    ) -> Q;

    /// Inclusive range
    fn range(
        &self,
        entity_type: &EntityType,
        property: &str,
        lower: &PropertyValue,
        upper: &PropertyValue,
    ) -> Q;

    fn in_(&self, entity_type: &EntityType, property: &str, values: &[PropertyValue]) -> Q;

    fn like(
        &self,
        entity_type: &EntityType,
        property: &str,
        pattern: &str,
        escape: Option<char>,
    ) -> Q;

    fn is_null(&self, entity_type: &EntityType, property: &str) -> Q;

    fn and_(&self, must: Vec<Q>, must_not: Vec<Q>) -> Q;

    fn or_(&self, children: Vec<Q>) -> Q;

    fn not_(&self, child: Q) -> Q;
}

/// Leaf constructors for HAVING conditions over aggregated properties.
///
/// Combinators and the match-all query come from the companion [`PredicateFactory`].
pub trait AggregationPredicateFactory<Q> {
    fn comparison(
        &self,
        entity_type: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        op: ComparisonType,
        value: &PropertyValue,
    ) -> Q;

    fn range(
        &self,
        entity_type: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        lower: &PropertyValue,
        upper: &PropertyValue,
    ) -> Q;

    fn in_(
        &self,
        entity_type: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        values: &[PropertyValue],
    ) -> Q;

    fn like(
        &self,
        entity_type: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
        pattern: &str,
        escape: Option<char>,
    ) -> Q;

    fn is_null(
        &self,
        entity_type: &EntityType,
        aggregation: AggregationFunction,
        property: &str,
    ) -> Q;
}
