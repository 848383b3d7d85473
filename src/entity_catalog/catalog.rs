use std::collections::HashMap;
use std::path::Path;

use super::config::{EntityCatalogConfig, EntityDefinition, PropertyDefinition, PropertyKind};
use super::errors::CatalogError;
use super::value::PropertyValue;
use super::{EntityNamesResolver, EntityType, PropertyHelper};
use crate::errors::SchemaError;

/// In-memory entity metadata, the bundled adapter for both collaborator traits.
///
/// Immutable after construction, so one catalog can serve concurrent `parse` calls.
#[derive(Debug, Clone)]
pub struct EntityCatalog {
    entities: HashMap<String, EntityDefinition>,
    /// simple and qualified names -> canonical (simple) name
    names: HashMap<String, String>,
}

impl EntityCatalog {
    pub fn from_config(config: EntityCatalogConfig) -> Result<Self, CatalogError> {
        config.validate()?;

        let mut entities = HashMap::new();
        let mut names = HashMap::new();
        for entity in config.entities {
            names.insert(entity.name.clone(), entity.name.clone());
            if let Some(qualified) = &entity.qualified_name {
                names.insert(qualified.clone(), entity.name.clone());
            }
            entities.insert(entity.name.clone(), entity);
        }

        log::debug!("Entity catalog loaded with {} entities", entities.len());
        Ok(EntityCatalog { entities, names })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Self::from_config(EntityCatalogConfig::from_yaml_str(yaml)?)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        Self::from_config(EntityCatalogConfig::from_yaml_file(path)?)
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Definition of the property at `path`, walking through embedded objects.
    pub fn property(&self, entity_type: &EntityType, path: &[String]) -> Option<&PropertyDefinition> {
        let entity = self.entities.get(entity_type.name())?;
        let (first, rest) = path.split_first()?;
        let mut current = entity.properties.get(first)?;
        for segment in rest {
            current = current.properties.get(segment)?;
        }
        Some(current)
    }
}

impl EntityNamesResolver for EntityCatalog {
    fn resolve_entity_type(&self, name: &str) -> Option<EntityType> {
        self.names.get(name).map(|canonical| EntityType::new(canonical.clone()))
    }
}

impl PropertyHelper for EntityCatalog {
    fn has_property(&self, entity_type: &EntityType, path: &[String]) -> bool {
        self.property(entity_type, path).is_some()
    }

    fn is_embedded(&self, entity_type: &EntityType, path: &[String]) -> bool {
        self.property(entity_type, path)
            .is_some_and(|p| p.kind == PropertyKind::Embedded)
    }

    fn is_analyzed(&self, entity_type: &EntityType, path: &[String]) -> bool {
        self.property(entity_type, path).is_some_and(|p| p.analyzed)
    }

    fn convert_to_property_type(
        &self,
        entity_type: &EntityType,
        path: &[String],
        literal: &str,
    ) -> Result<PropertyValue, SchemaError> {
        let definition =
            self.property(entity_type, path)
                .ok_or_else(|| SchemaError::UnknownProperty {
                    property: path.join("."),
                    entity: entity_type.to_string(),
                })?;

        definition.kind.convert(literal).map_err(|e| {
            log::debug!("Literal conversion failed: {}", e);
            SchemaError::InvalidPropertyValue {
                property: path.join("."),
                value: literal.to_string(),
                expected: definition.kind.to_string(),
            }
        })
    }
}
