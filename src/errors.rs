//! # Query Error Taxonomy
//!
//! Every failure of a `parse` call surfaces as one [`QueryError`]. The variants
//! group the individual error enums by category:
//!
//! - **Syntax**: malformed input, trailing tokens, engine limits
//! - **Alias**: conflicting alias reuse, unknown alias reference
//! - **Schema**: unknown entity/property, misuse of analyzed or embedded properties
//! - **Predicate structure**: builder invariants (single-child `Root`/`Not`, balanced scopes)
//! - **Unsupported feature**: constructs the engine recognizes but deliberately rejects
//!
//! Each error carries a stable [`QueryError::code`] so integrators can match on
//! failures without parsing messages.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message} (at offset {offset})")]
pub struct SyntaxError {
    pub message: String,
    /// Byte offset into the query text where the problem was detected
    pub offset: usize,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        SyntaxError {
            message: message.into(),
            offset,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AliasError {
    #[error("alias '{alias}' is already bound to type '{existing}', cannot rebind it to '{requested}'")]
    Conflict {
        alias: String,
        existing: String,
        requested: String,
    },

    #[error("unknown alias '{alias}'")]
    Unknown { alias: String },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("unknown entity '{name}'")]
    UnknownEntity { name: String },

    #[error("no property '{property}' on type '{entity}'")]
    UnknownProperty { property: String, entity: String },

    #[error("property '{property}' of type '{entity}' is analyzed and cannot be used in predicates, sorting or grouping")]
    AnalyzedPropertyInPredicate { property: String, entity: String },

    #[error("embedded property '{property}' of type '{entity}' cannot be projected as a whole, select its properties instead")]
    WholeEmbeddedProjection { property: String, entity: String },

    #[error("property '{property}' of type '{entity}' is not an embedded entity")]
    NotEmbedded { property: String, entity: String },

    #[error("alias '{alias}' denotes {denotes} and cannot be used as a predicate operand")]
    EntityInPredicate { alias: String, denotes: String },

    #[error("value '{value}' is not a valid {expected} for property '{property}'")]
    InvalidPropertyValue {
        property: String,
        value: String,
        expected: String,
    },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredicateStructureError {
    #[error("{parent} predicate already has a child, cannot add another one")]
    TooManyChildren { parent: &'static str },

    #[error("no open predicate scope to close")]
    NoOpenScope,

    #[error("{count} predicate scope(s) still open")]
    UnclosedScopes { count: usize },

    #[error("negation predicate has no child")]
    EmptyNegation,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UnsupportedFeatureError {
    #[error("queries over more than one root entity alias are not supported")]
    MultiRootQuery,

    #[error("only one target entity can be queried, '{existing}' is already selected but '{requested}' was given")]
    MultipleTargetEntities { existing: String, requested: String },

    #[error("collection index operations are not supported: '{path}'")]
    CollectionIndex { path: String },

    #[error("positional parameters are not supported, use named parameters")]
    PositionalParameter,

    #[error("comparing property '{left}' with property '{right}' is not supported")]
    PropertyComparison { left: String, right: String },

    #[error("aggregate '{expression}' can only be used in SELECT or HAVING")]
    AggregateOutsideHaving { expression: String },

    #[error("HAVING conditions must compare aggregates, found property '{property}'")]
    PlainPropertyInHaving { property: String },

    #[error("predicate does not reference any property")]
    ConstantPredicate,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Alias error: {0}")]
    Alias(#[from] AliasError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Predicate structure error: {0}")]
    PredicateStructure(#[from] PredicateStructureError),

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(#[from] UnsupportedFeatureError),

    #[error("named parameter ':{name}' has no value")]
    UnboundParameter { name: String },
}

impl QueryError {
    /// Stable identifier of the error condition.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Syntax(_) => "ENTITYQL-0100",
            QueryError::Alias(e) => match e {
                AliasError::Conflict { .. } => "ENTITYQL-0201",
                AliasError::Unknown { .. } => "ENTITYQL-0202",
            },
            QueryError::Schema(e) => match e {
                SchemaError::UnknownEntity { .. } => "ENTITYQL-0301",
                SchemaError::UnknownProperty { .. } => "ENTITYQL-0302",
                SchemaError::AnalyzedPropertyInPredicate { .. } => "ENTITYQL-0303",
                SchemaError::WholeEmbeddedProjection { .. } => "ENTITYQL-0304",
                SchemaError::NotEmbedded { .. } => "ENTITYQL-0305",
                SchemaError::EntityInPredicate { .. } => "ENTITYQL-0306",
                SchemaError::InvalidPropertyValue { .. } => "ENTITYQL-0307",
            },
            QueryError::PredicateStructure(e) => match e {
                PredicateStructureError::TooManyChildren { .. } => "ENTITYQL-0401",
                PredicateStructureError::NoOpenScope => "ENTITYQL-0402",
                PredicateStructureError::UnclosedScopes { .. } => "ENTITYQL-0403",
                PredicateStructureError::EmptyNegation => "ENTITYQL-0404",
            },
            QueryError::UnsupportedFeature(e) => match e {
                UnsupportedFeatureError::MultiRootQuery => "ENTITYQL-0501",
                UnsupportedFeatureError::MultipleTargetEntities { .. } => "ENTITYQL-0502",
                UnsupportedFeatureError::CollectionIndex { .. } => "ENTITYQL-0503",
                UnsupportedFeatureError::PositionalParameter => "ENTITYQL-0504",
                UnsupportedFeatureError::PropertyComparison { .. } => "ENTITYQL-0505",
                UnsupportedFeatureError::AggregateOutsideHaving { .. } => "ENTITYQL-0506",
                UnsupportedFeatureError::PlainPropertyInHaving { .. } => "ENTITYQL-0507",
                UnsupportedFeatureError::ConstantPredicate => "ENTITYQL-0508",
            },
            QueryError::UnboundParameter { .. } => "ENTITYQL-0601",
        }
    }
}
