use serde::Serialize;

use crate::entity_catalog::EntityType;
use crate::predicate::AggregationFunction;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// The alias alone was selected: the whole entity
    Entity,
    /// Canonical dotted property name
    Property(String),
    Aggregate {
        function: AggregationFunction,
        property: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortField {
    pub property: String,
    pub ascending: bool,
}

/// Output of a successful parse: the backend query plus what the caller needs
/// to execute it and shape the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParsingResult<Q> {
    pub query: Q,
    pub target_entity: EntityType,
    /// Entity name as written in the query
    pub target_entity_name: String,
    pub projections: Vec<Projection>,
    pub sort: Vec<SortField>,
    pub group_by: Vec<String>,
    pub having: Option<Q>,
    pub distinct: bool,
}

impl<Q> QueryParsingResult<Q> {
    /// No SELECT clause, or only the entity alias selected
    pub fn selects_entities(&self) -> bool {
        self.projections.is_empty()
            || self
                .projections
                .iter()
                .all(|projection| *projection == Projection::Entity)
    }
}
