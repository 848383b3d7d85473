use std::collections::HashMap;

use crate::entity_catalog::EntityType;
use crate::errors::AliasError;

use super::property_path::PropertyPath;

#[derive(Debug, Clone, PartialEq)]
pub enum AliasBinding {
    /// Persister space alias of a root entity
    Root(EntityType),
    /// Join alias for an embedded association
    Join(PropertyPath),
}

/// Alias symbol table of one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasTable {
    bindings: HashMap<String, AliasBinding>,
    root_aliases: Vec<String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a root alias. Rebinding to the same type is a no-op, to any other
    /// type an error.
    pub fn register_root(
        &mut self,
        alias: &str,
        entity_type: &EntityType,
    ) -> Result<(), AliasError> {
        match self.bindings.get(alias) {
            Some(AliasBinding::Root(existing)) if existing == entity_type => Ok(()),
            Some(AliasBinding::Root(existing)) => Err(AliasError::Conflict {
                alias: alias.to_string(),
                existing: existing.to_string(),
                requested: entity_type.to_string(),
            }),
            Some(AliasBinding::Join(path)) => Err(AliasError::Conflict {
                alias: alias.to_string(),
                existing: path.to_string(),
                requested: entity_type.to_string(),
            }),
            None => {
                self.bindings
                    .insert(alias.to_string(), AliasBinding::Root(entity_type.clone()));
                self.root_aliases.push(alias.to_string());
                Ok(())
            }
        }
    }

    /// Bind a join alias; the first binding wins. Returns whether it was bound.
    pub fn register_join(&mut self, alias: &str, path: PropertyPath) -> bool {
        if self.bindings.contains_key(alias) {
            log::debug!("alias '{}' already bound, ignoring join to '{}'", alias, path);
            return false;
        }
        self.bindings
            .insert(alias.to_string(), AliasBinding::Join(path));
        true
    }

    pub fn get(&self, alias: &str) -> Option<&AliasBinding> {
        self.bindings.get(alias)
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn root_aliases(&self) -> &[String] {
        &self.root_aliases
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Property names of `path` relative to the target entity, with aliases
    /// replaced by what they stand for.
    pub fn canonical_path(&self, path: &PropertyPath) -> Result<Vec<String>, AliasError> {
        let Some(alias) = path.root_alias() else {
            return Ok(path.node_names());
        };

        let mut canonical = match self.bindings.get(alias) {
            Some(AliasBinding::Root(_)) => Vec::new(),
            Some(AliasBinding::Join(join_path)) => self.canonical_path(join_path)?,
            None => {
                return Err(AliasError::Unknown {
                    alias: alias.to_string(),
                })
            }
        };
        canonical.extend(path.property_names());
        Ok(canonical)
    }
}
