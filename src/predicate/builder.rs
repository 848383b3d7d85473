use crate::entity_catalog::{EntityType, PropertyHelper, PropertyValue};
use crate::errors::{PredicateStructureError, QueryError, SchemaError};

use super::{
    factory::PredicateFactory,
    tree::{ComparisonType, Condition, Predicate},
};

/// Right-hand side of a condition before conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum OperandValue {
    /// Query text literal, converted to the property type
    Literal(String),
    /// Named parameter value, used as given
    Parameter(PropertyValue),
}

impl OperandValue {
    /// Text used for LIKE patterns, which are never converted
    pub fn pattern_text(&self) -> String {
        match self {
            OperandValue::Literal(text) => text.clone(),
            OperandValue::Parameter(value) => value.to_string(),
        }
    }
}

/// Scope and leaf operations shared by WHERE and HAVING builders.
///
/// The caller mirrors the boolean structure of the clause: every `push_*` is
/// matched by one `pop`, and leaves are added in between.
pub trait ConditionBuilder {
    /// How a leaf names the property it tests
    type Property;

    fn push_and(&mut self) -> Result<(), PredicateStructureError>;
    fn push_or(&mut self) -> Result<(), PredicateStructureError>;
    fn push_not(&mut self) -> Result<(), PredicateStructureError>;
    fn pop(&mut self) -> Result<(), PredicateStructureError>;

    fn add_comparison(
        &mut self,
        property: &Self::Property,
        op: ComparisonType,
        value: OperandValue,
    ) -> Result<(), QueryError>;

    fn add_range(
        &mut self,
        property: &Self::Property,
        lower: OperandValue,
        upper: OperandValue,
    ) -> Result<(), QueryError>;

    fn add_in(
        &mut self,
        property: &Self::Property,
        values: Vec<OperandValue>,
    ) -> Result<(), QueryError>;

    fn add_like(
        &mut self,
        property: &Self::Property,
        pattern: OperandValue,
        escape: Option<char>,
    ) -> Result<(), QueryError>;

    fn add_is_null(&mut self, property: &Self::Property) -> Result<(), QueryError>;
}

/// Stack of open parent scopes. The bottom entry is always the `Root`.
///
/// A scope is attached to its parent when it is closed; the single-child check
/// happens when it is opened, so the outcome is the same as attaching eagerly.
#[derive(Debug)]
pub(crate) struct PredicateStack<Q> {
    scopes: Vec<Predicate<Q>>,
}

impl<Q> PredicateStack<Q> {
    pub(crate) fn new() -> Self {
        PredicateStack {
            scopes: vec![Predicate::root()],
        }
    }

    fn top(&mut self) -> Result<&mut Predicate<Q>, PredicateStructureError> {
        self.scopes
            .last_mut()
            .ok_or(PredicateStructureError::NoOpenScope)
    }

    pub(crate) fn push(&mut self, scope: Predicate<Q>) -> Result<(), PredicateStructureError> {
        let top = self.top()?;
        if !top.accepts_child() {
            return Err(PredicateStructureError::TooManyChildren {
                parent: top.kind_name(),
            });
        }
        self.scopes.push(scope);
        Ok(())
    }

    pub(crate) fn attach(&mut self, node: Predicate<Q>) -> Result<(), PredicateStructureError> {
        self.top()?.add_child(node)
    }

    pub(crate) fn pop(&mut self) -> Result<(), PredicateStructureError> {
        if self.scopes.len() <= 1 {
            return Err(PredicateStructureError::NoOpenScope);
        }
        let closed = self
            .scopes
            .pop()
            .ok_or(PredicateStructureError::NoOpenScope)?;
        self.attach(closed)
    }

    pub(crate) fn depth(&self) -> usize {
        self.scopes.len().saturating_sub(1)
    }

    /// The finished tree, rooted at `Root`
    pub(crate) fn finish(mut self) -> Result<Predicate<Q>, PredicateStructureError> {
        if self.scopes.len() > 1 {
            return Err(PredicateStructureError::UnclosedScopes {
                count: self.depth(),
            });
        }
        self.scopes
            .pop()
            .ok_or(PredicateStructureError::NoOpenScope)
    }
}

/// Builds the WHERE predicate of one query.
pub struct QueryBuilder<'b, Q> {
    entity_type: EntityType,
    factory: &'b dyn PredicateFactory<Q>,
    property_helper: &'b dyn PropertyHelper,
    stack: PredicateStack<Q>,
}

impl<'b, Q> QueryBuilder<'b, Q> {
    pub fn new(
        entity_type: EntityType,
        factory: &'b dyn PredicateFactory<Q>,
        property_helper: &'b dyn PropertyHelper,
    ) -> Self {
        QueryBuilder {
            entity_type,
            factory,
            property_helper,
            stack: PredicateStack::new(),
        }
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Number of scopes opened and not yet closed
    pub fn open_scopes(&self) -> usize {
        self.stack.depth()
    }

    fn convert(&self, path: &[String], value: OperandValue) -> Result<PropertyValue, SchemaError> {
        match value {
            OperandValue::Literal(literal) => {
                self.property_helper
                    .convert_to_property_type(&self.entity_type, path, &literal)
            }
            OperandValue::Parameter(value) => Ok(value),
        }
    }

    fn attach_leaf(&mut self, condition: Condition, query: Q) -> Result<(), QueryError> {
        self.stack.attach(Predicate::Leaf {
            condition,
            aggregation: None,
            query,
        })?;
        Ok(())
    }

    /// The finished tree without rendering it
    pub fn into_predicate(self) -> Result<Predicate<Q>, PredicateStructureError> {
        self.stack.finish()
    }

    pub fn build(self) -> Result<Q, PredicateStructureError> {
        let factory = self.factory;
        let entity_type = self.entity_type.clone();
        self.stack.finish()?.render(factory, &entity_type)
    }
}

impl<Q> ConditionBuilder for QueryBuilder<'_, Q> {
    type Property = Vec<String>;

    fn push_and(&mut self) -> Result<(), PredicateStructureError> {
        self.stack.push(Predicate::and())
    }

    fn push_or(&mut self) -> Result<(), PredicateStructureError> {
        self.stack.push(Predicate::or())
    }

    fn push_not(&mut self) -> Result<(), PredicateStructureError> {
        self.stack.push(Predicate::not())
    }

    fn pop(&mut self) -> Result<(), PredicateStructureError> {
        self.stack.pop()
    }

    fn add_comparison(
        &mut self,
        path: &Vec<String>,
        op: ComparisonType,
        value: OperandValue,
    ) -> Result<(), QueryError> {
        let value = self.convert(path, value)?;
        let property = path.join(".");
        let query = self
            .factory
            .comparison(&self.entity_type, &property, op, &value);
        self.attach_leaf(
            Condition::Comparison {
                property,
                op,
                value,
            },
            query,
        )
    }

    fn add_range(
        &mut self,
        path: &Vec<String>,
        lower: OperandValue,
        upper: OperandValue,
    ) -> Result<(), QueryError> {
        let lower = self.convert(path, lower)?;
        let upper = self.convert(path, upper)?;
        let property = path.join(".");
        let query = self
            .factory
            .range(&self.entity_type, &property, &lower, &upper);
        self.attach_leaf(
            Condition::Range {
                property,
                lower,
                upper,
            },
            query,
        )
    }

    fn add_in(&mut self, path: &Vec<String>, values: Vec<OperandValue>) -> Result<(), QueryError> {
        let values = values
            .into_iter()
            .map(|value| self.convert(path, value))
            .collect::<Result<Vec<_>, _>>()?;
        let property = path.join(".");
        let query = self.factory.in_(&self.entity_type, &property, &values);
        self.attach_leaf(Condition::In { property, values }, query)
    }

    fn add_like(
        &mut self,
        path: &Vec<String>,
        pattern: OperandValue,
        escape: Option<char>,
    ) -> Result<(), QueryError> {
        let pattern = pattern.pattern_text();
        let property = path.join(".");
        let query = self
            .factory
            .like(&self.entity_type, &property, &pattern, escape);
        self.attach_leaf(
            Condition::Like {
                property,
                pattern,
                escape,
            },
            query,
        )
    }

    fn add_is_null(&mut self, path: &Vec<String>) -> Result<(), QueryError> {
        let property = path.join(".");
        let query = self.factory.is_null(&self.entity_type, &property);
        self.attach_leaf(Condition::IsNull { property }, query)
    }
}
