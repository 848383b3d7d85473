use std::fmt;

use crate::entity_catalog::TypeDescriptor;

/// One step of a property path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    pub name: String,
    pub is_alias: bool,
    /// Type reached at this node; `None` for scalar leaves
    pub type_descriptor: Option<TypeDescriptor>,
}

impl PathNode {
    pub fn alias(name: impl Into<String>, type_descriptor: TypeDescriptor) -> Self {
        PathNode {
            name: name.into(),
            is_alias: true,
            type_descriptor: Some(type_descriptor),
        }
    }

    pub fn embedded(name: impl Into<String>, type_descriptor: TypeDescriptor) -> Self {
        PathNode {
            name: name.into(),
            is_alias: false,
            type_descriptor: Some(type_descriptor),
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        PathNode {
            name: name.into(),
            is_alias: false,
            type_descriptor: None,
        }
    }
}

/// Chain of property navigations, optionally starting at an alias.
///
/// Only the first node may be an alias. `root_type` is the type the first
/// property step is resolved against: the alias type for alias-rooted paths,
/// the target entity otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPath {
    root_type: TypeDescriptor,
    nodes: Vec<PathNode>,
}

impl PropertyPath {
    /// Path over the properties of `root_type` without a leading alias
    pub fn unqualified(root_type: TypeDescriptor) -> Self {
        PropertyPath {
            root_type,
            nodes: Vec::new(),
        }
    }

    pub fn from_alias(alias: impl Into<String>, type_descriptor: TypeDescriptor) -> Self {
        PropertyPath {
            root_type: type_descriptor.clone(),
            nodes: vec![PathNode::alias(alias, type_descriptor)],
        }
    }

    pub fn push(&mut self, node: PathNode) {
        debug_assert!(!node.is_alias, "only the first node may be an alias");
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root_type(&self) -> &TypeDescriptor {
        &self.root_type
    }

    pub fn root_alias(&self) -> Option<&str> {
        self.nodes
            .first()
            .filter(|node| node.is_alias)
            .map(|node| node.name.as_str())
    }

    pub fn last(&self) -> Option<&PathNode> {
        self.nodes.last()
    }

    /// The type the next navigation step resolves against, `None` past a scalar leaf
    pub fn terminal_type(&self) -> Option<&TypeDescriptor> {
        match self.nodes.last() {
            Some(node) => node.type_descriptor.as_ref(),
            None => Some(&self.root_type),
        }
    }

    /// A lone alias, i.e. the whole entity
    pub fn is_alias_only(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].is_alias
    }

    /// Ends in an embedded sub-object rather than a scalar
    pub fn ends_in_embedded(&self) -> bool {
        self.nodes
            .last()
            .is_some_and(|node| !node.is_alias && node.type_descriptor.is_some())
    }

    pub fn node_names(&self) -> Vec<String> {
        self.nodes.iter().map(|node| node.name.clone()).collect()
    }

    /// Node names after the root alias, if any
    pub fn property_names(&self) -> Vec<String> {
        let skip = usize::from(self.root_alias().is_some());
        self.nodes
            .iter()
            .skip(skip)
            .map(|node| node.name.clone())
            .collect()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.nodes.iter().map(|node| node.name.as_str()).collect();
        f.write_str(&names.join("."))
    }
}
