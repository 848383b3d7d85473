use serde::Serialize;
use std::fmt;

use crate::entity_catalog::{EntityType, PropertyValue};
use crate::errors::PredicateStructureError;

use super::{aggregation::AggregationFunction, factory::PredicateFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComparisonType {
    Equals,
    NotEquals,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonType {
    /// Operator to use when the operands swap sides (`5 < x` is `x > 5`)
    pub fn mirrored(self) -> Self {
        match self {
            ComparisonType::Less => ComparisonType::Greater,
            ComparisonType::LessOrEqual => ComparisonType::GreaterOrEqual,
            ComparisonType::Greater => ComparisonType::Less,
            ComparisonType::GreaterOrEqual => ComparisonType::LessOrEqual,
            other => other,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonType::Equals => "=",
            ComparisonType::NotEquals => "<>",
            ComparisonType::Less => "<",
            ComparisonType::LessOrEqual => "<=",
            ComparisonType::Greater => ">",
            ComparisonType::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// What a leaf tests. `property` is the canonical dotted path below the target entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Comparison {
        property: String,
        op: ComparisonType,
        value: PropertyValue,
    },
    /// Inclusive on both bounds
    Range {
        property: String,
        lower: PropertyValue,
        upper: PropertyValue,
    },
    In {
        property: String,
        values: Vec<PropertyValue>,
    },
    Like {
        property: String,
        pattern: String,
        escape: Option<char>,
    },
    IsNull {
        property: String,
    },
}

impl Condition {
    pub fn property(&self) -> &str {
        match self {
            Condition::Comparison { property, .. }
            | Condition::Range { property, .. }
            | Condition::In { property, .. }
            | Condition::Like { property, .. }
            | Condition::IsNull { property } => property,
        }
    }
}

/// Node of a WHERE/HAVING filter tree.
///
/// `Root` and `Not` hold at most one child, `And`/`Or` any number. A leaf keeps
/// the backend fragment the factory produced when the leaf was created; parent
/// nodes are combined by the factory in [`Predicate::render`].
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<Q> {
    Root {
        child: Option<Box<Predicate<Q>>>,
    },
    And {
        children: Vec<Predicate<Q>>,
    },
    Or {
        children: Vec<Predicate<Q>>,
    },
    Not {
        child: Option<Box<Predicate<Q>>>,
    },
    Leaf {
        condition: Condition,
        aggregation: Option<AggregationFunction>,
        query: Q,
    },
}

impl<Q> Predicate<Q> {
    pub fn root() -> Self {
        Predicate::Root { child: None }
    }

    pub fn and() -> Self {
        Predicate::And {
            children: Vec::new(),
        }
    }

    pub fn or() -> Self {
        Predicate::Or {
            children: Vec::new(),
        }
    }

    pub fn not() -> Self {
        Predicate::Not { child: None }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Predicate::Root { .. } => "Root",
            Predicate::And { .. } => "And",
            Predicate::Or { .. } => "Or",
            Predicate::Not { .. } => "Not",
            Predicate::Leaf { .. } => "Leaf",
        }
    }

    pub fn is_parent(&self) -> bool {
        !matches!(self, Predicate::Leaf { .. })
    }

    /// Whether another child can still be attached
    pub fn accepts_child(&self) -> bool {
        match self {
            Predicate::Root { child } | Predicate::Not { child } => child.is_none(),
            Predicate::And { .. } | Predicate::Or { .. } => true,
            Predicate::Leaf { .. } => false,
        }
    }

    pub fn add_child(&mut self, node: Predicate<Q>) -> Result<(), PredicateStructureError> {
        let parent = self.kind_name();
        match self {
            Predicate::Root { child } | Predicate::Not { child } => {
                if child.is_some() {
                    return Err(PredicateStructureError::TooManyChildren { parent });
                }
                *child = Some(Box::new(node));
                Ok(())
            }
            Predicate::And { children } | Predicate::Or { children } => {
                children.push(node);
                Ok(())
            }
            Predicate::Leaf { .. } => Err(PredicateStructureError::TooManyChildren { parent }),
        }
    }

    /// Fold the tree into the backend query.
    ///
    /// A `Not` directly under an `And` becomes a must-not clause of that
    /// conjunction instead of a nested negation.
    pub fn render(
        self,
        factory: &dyn PredicateFactory<Q>,
        entity_type: &EntityType,
    ) -> Result<Q, PredicateStructureError> {
        match self {
            Predicate::Root { child } => match child {
                Some(child) => child.render(factory, entity_type),
                None => Ok(factory.match_all(entity_type)),
            },
            Predicate::And { children } => {
                let mut must = Vec::new();
                let mut must_not = Vec::new();
                for child in children {
                    match child {
                        Predicate::Not { child } => {
                            let negated = child.ok_or(PredicateStructureError::EmptyNegation)?;
                            must_not.push(negated.render(factory, entity_type)?);
                        }
                        other => must.push(other.render(factory, entity_type)?),
                    }
                }
                Ok(factory.and_(must, must_not))
            }
            Predicate::Or { children } => {
                let rendered = children
                    .into_iter()
                    .map(|child| child.render(factory, entity_type))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(factory.or_(rendered))
            }
            Predicate::Not { child } => {
                let child = child.ok_or(PredicateStructureError::EmptyNegation)?;
                Ok(factory.not_(child.render(factory, entity_type)?))
            }
            Predicate::Leaf { query, .. } => Ok(query),
        }
    }
}
