//! Entity metadata consumed by the query passes.
//!
//! The resolution and rendering passes never look at a concrete schema. They talk
//! to two collaborator traits:
//!
//! - [`EntityNamesResolver`] - entity name (simple or qualified) to [`EntityType`]
//! - [`PropertyHelper`] - shape questions about property paths and literal conversion
//!
//! [`EntityCatalog`] is the bundled implementation of both, loaded from YAML.
//! Other backends plug in their own adapters.

mod catalog;
pub mod config;
pub mod errors;
pub mod value;

pub use catalog::EntityCatalog;
pub use config::{EntityCatalogConfig, EntityDefinition, PropertyDefinition, PropertyKind};
pub use errors::CatalogError;
pub use value::PropertyValue;

use serde::Serialize;
use std::fmt;

use crate::errors::SchemaError;

/// Identity of a queryable (root) entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        EntityType(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait EntityNamesResolver {
    fn resolve_entity_type(&self, name: &str) -> Option<EntityType>;
}

/// Schema-shape questions and literal conversion, asked relative to a root entity.
///
/// `path` is always the full dotted path from the entity root, e.g.
/// `["author", "address", "city"]`.
#[cfg_attr(test, mockall::automock)]
pub trait PropertyHelper {
    fn has_property(&self, entity_type: &EntityType, path: &[String]) -> bool;

    fn is_embedded(&self, entity_type: &EntityType, path: &[String]) -> bool;

    fn is_analyzed(&self, entity_type: &EntityType, path: &[String]) -> bool;

    fn convert_to_property_type(
        &self,
        entity_type: &EntityType,
        path: &[String],
        literal: &str,
    ) -> Result<PropertyValue, SchemaError>;
}

/// The type reached while navigating a property path: a root entity, or an
/// embedded sub-object identified by its path below that root.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    entity_type: EntityType,
    path: Vec<String>,
}

impl TypeDescriptor {
    pub fn entity(entity_type: EntityType) -> Self {
        TypeDescriptor {
            entity_type,
            path: Vec::new(),
        }
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Path of this type below the root entity; empty for the root itself
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_embedded_type(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn property_path(&self, property: &str) -> Vec<String> {
        let mut path = self.path.clone();
        path.push(property.to_string());
        path
    }

    pub fn has_property(&self, helper: &dyn PropertyHelper, property: &str) -> bool {
        helper.has_property(&self.entity_type, &self.property_path(property))
    }

    pub fn is_embedded(&self, helper: &dyn PropertyHelper, property: &str) -> bool {
        helper.is_embedded(&self.entity_type, &self.property_path(property))
    }

    pub fn is_analyzed(&self, helper: &dyn PropertyHelper, property: &str) -> bool {
        helper.is_analyzed(&self.entity_type, &self.property_path(property))
    }

    /// Descriptor of the embedded type stored under `property`
    pub fn embedded(&self, property: &str) -> TypeDescriptor {
        TypeDescriptor {
            entity_type: self.entity_type.clone(),
            path: self.property_path(property),
        }
    }

    /// Human readable name used in error messages, e.g. `Book` or `Book.author`
    pub fn type_name(&self) -> String {
        if self.path.is_empty() {
            self.entity_type.name().to_string()
        } else {
            format!("{}.{}", self.entity_type, self.path.join("."))
        }
    }
}
