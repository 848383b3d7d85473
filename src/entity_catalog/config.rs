//! YAML model of the bundled entity catalog.
//!
//! ```yaml
//! entities:
//!   - name: Book
//!     qualified_name: com.acme.Book
//!     properties:
//!       id: { type: long }
//!       title: { type: string, analyzed: true }
//!       author:
//!         type: embedded
//!         properties:
//!           name: { type: string }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use super::errors::CatalogError;
use super::value::PropertyValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Long,
    Double,
    Boolean,
    /// ISO `YYYY-MM-DD`
    Date,
    Embedded,
}

impl PropertyKind {
    /// Convert a query literal to a value of this kind.
    pub fn convert(&self, literal: &str) -> Result<PropertyValue, String> {
        match self {
            PropertyKind::String => Ok(PropertyValue::String(literal.to_string())),
            PropertyKind::Long => literal
                .trim()
                .parse::<i64>()
                .map(PropertyValue::Long)
                .map_err(|_| format!("Invalid long: '{}'", literal)),
            PropertyKind::Double => literal
                .trim()
                .parse::<f64>()
                .map(PropertyValue::Double)
                .map_err(|_| format!("Invalid double: '{}'", literal)),
            PropertyKind::Boolean => match literal.to_lowercase().trim() {
                "true" => Ok(PropertyValue::Boolean(true)),
                "false" => Ok(PropertyValue::Boolean(false)),
                _ => Err(format!(
                    "Invalid boolean: '{}' (expected: true or false)",
                    literal
                )),
            },
            PropertyKind::Date => NaiveDate::parse_from_str(literal.trim(), "%Y-%m-%d")
                .map(PropertyValue::Date)
                .map_err(|e| format!("Invalid date: '{}' ({})", literal, e)),
            PropertyKind::Embedded => Err(format!(
                "Cannot convert '{}' to an embedded entity",
                literal
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::String => "string",
            PropertyKind::Long => "long",
            PropertyKind::Double => "double",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Date => "date",
            PropertyKind::Embedded => "embedded",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    /// Tokenized for full-text search; such properties are only selectable
    #[serde(default)]
    pub analyzed: bool,
    /// Nested properties of an embedded sub-object
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub name: String,
    #[serde(default)]
    pub qualified_name: Option<String>,
    pub properties: BTreeMap<String, PropertyDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCatalogConfig {
    pub entities: Vec<EntityDefinition>,
}

impl EntityCatalogConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|e| CatalogError::ReadError {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::ParseError {
            error: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.entities.is_empty() {
            return Err(CatalogError::InvalidConfig {
                message: "Catalog must contain at least one entity definition".to_string(),
            });
        }

        let mut seen_names = HashSet::new();
        for entity in &self.entities {
            if entity.name.trim().is_empty() {
                return Err(CatalogError::InvalidConfig {
                    message: "Entity name cannot be empty".to_string(),
                });
            }
            let names = std::iter::once(&entity.name).chain(entity.qualified_name.as_ref());
            for name in names {
                if !seen_names.insert(name.as_str()) {
                    return Err(CatalogError::DuplicateEntity { name: name.clone() });
                }
            }
            validate_properties(&entity.name, "", &entity.properties)?;
        }
        Ok(())
    }
}

fn validate_properties(
    entity: &str,
    prefix: &str,
    properties: &BTreeMap<String, PropertyDefinition>,
) -> Result<(), CatalogError> {
    for (name, definition) in properties {
        let property = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        match definition.kind {
            PropertyKind::Embedded if definition.properties.is_empty() => {
                return Err(CatalogError::EmptyEmbedded {
                    entity: entity.to_string(),
                    property,
                });
            }
            PropertyKind::Embedded => {
                validate_properties(entity, &property, &definition.properties)?;
            }
            kind if !definition.properties.is_empty() => {
                return Err(CatalogError::NestedPropertiesOnScalar {
                    entity: entity.to_string(),
                    property,
                    kind: kind.to_string(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}
