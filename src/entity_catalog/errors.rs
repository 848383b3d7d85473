use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {error}")]
    ReadError { error: String },

    #[error("Failed to parse catalog: {error}")]
    ParseError { error: String },

    #[error("Duplicate entity name: {name}")]
    DuplicateEntity { name: String },

    #[error("Embedded property '{property}' of entity '{entity}' declares no properties")]
    EmptyEmbedded { entity: String, property: String },

    #[error("Property '{property}' of entity '{entity}' is {kind} and cannot declare nested properties")]
    NestedPropertiesOnScalar {
        entity: String,
        property: String,
        kind: String,
    },

    #[error("Invalid catalog: {message}")]
    InvalidConfig { message: String },
}
