//! Resolution pass.
//!
//! [`Resolver`] walks a parsed [`HqlStatement`] once, binding aliases to entity
//! types and turning every property reference into a validated
//! [`PropertyPath`]. The result is a [`ResolvedStatement`] that the rendering
//! pass consumes together with the populated [`AliasTable`].
//!
//! # Walk status
//!
//! Which rules apply to a freshly resolved path depends on the clause being
//! walked:
//!
//! | status            | analyzed scalar | whole embedded |
//! |-------------------|-----------------|----------------|
//! | `DefiningSelect`  | allowed         | rejected       |
//! | `DefiningFrom`    | rejected        | allowed        |
//! | `DefiningOrderBy` | rejected        | allowed        |
//! | none (WHERE, ...) | rejected        | allowed        |

pub mod alias_table;
mod property_path;
mod resolved;

pub use alias_table::{AliasBinding, AliasTable};
pub use property_path::{PathNode, PropertyPath};
pub use resolved::{
    ResolvedExpression, ResolvedOperand, ResolvedProjection, ResolvedSortItem, ResolvedStatement,
};

use std::collections::HashMap;

use crate::entity_catalog::{
    EntityNamesResolver, EntityType, PropertyHelper, PropertyValue, TypeDescriptor,
};
use crate::errors::{AliasError, QueryError, SchemaError, SyntaxError, UnsupportedFeatureError};
use crate::hql_parser::ast::{
    AggregateExpression, AggregateFunction, BooleanExpression, HqlStatement, Operand,
    PathExpression, SelectItem,
};
use crate::predicate::{AggregationFunction, AggregationPropertyPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStatus {
    DefiningSelect,
    DefiningFrom,
    DefiningOrderBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    Where,
    Having,
}

pub struct Resolver<'r> {
    names_resolver: &'r dyn EntityNamesResolver,
    property_helper: &'r dyn PropertyHelper,
    named_parameters: &'r HashMap<String, PropertyValue>,
    alias_table: AliasTable,
    /// Target entity and the name it was written as
    target: Option<(EntityType, String)>,
    walk_status: Vec<WalkStatus>,
}

impl<'r> Resolver<'r> {
    pub fn new(
        names_resolver: &'r dyn EntityNamesResolver,
        property_helper: &'r dyn PropertyHelper,
        named_parameters: &'r HashMap<String, PropertyValue>,
    ) -> Self {
        Resolver {
            names_resolver,
            property_helper,
            named_parameters,
            alias_table: AliasTable::new(),
            target: None,
            walk_status: Vec::new(),
        }
    }

    pub fn alias_table(&self) -> &AliasTable {
        &self.alias_table
    }

    pub fn target_entity(&self) -> Option<&EntityType> {
        self.target.as_ref().map(|(entity_type, _)| entity_type)
    }

    pub fn walk_status(&self) -> Option<WalkStatus> {
        self.walk_status.last().copied()
    }

    pub fn push_select_strategy(&mut self) {
        self.walk_status.push(WalkStatus::DefiningSelect);
    }

    pub fn push_from_strategy(&mut self) {
        self.walk_status.push(WalkStatus::DefiningFrom);
    }

    pub fn push_order_by_strategy(&mut self) {
        self.walk_status.push(WalkStatus::DefiningOrderBy);
    }

    pub fn pop_strategy(&mut self) {
        self.walk_status.pop();
    }

    fn in_select(&self) -> bool {
        self.walk_status() == Some(WalkStatus::DefiningSelect)
    }

    pub fn register_persister_space(
        &mut self,
        entity_name: &str,
        alias: Option<&str>,
    ) -> Result<(), QueryError> {
        let entity_type = self
            .names_resolver
            .resolve_entity_type(entity_name)
            .ok_or_else(|| SchemaError::UnknownEntity {
                name: entity_name.to_string(),
            })?;

        let alias = alias.unwrap_or(entity_name);
        self.alias_table.register_root(alias, &entity_type)?;

        match &self.target {
            Some((existing, _)) if existing != &entity_type => {
                Err(UnsupportedFeatureError::MultipleTargetEntities {
                    existing: existing.to_string(),
                    requested: entity_type.to_string(),
                }
                .into())
            }
            Some(_) => Ok(()),
            None => {
                log::debug!("target entity '{}' bound to alias '{}'", entity_type, alias);
                self.target = Some((entity_type, entity_name.to_string()));
                Ok(())
            }
        }
    }

    /// True while exactly one root alias is registered
    pub fn is_persister_reference_alias(&self) -> bool {
        self.alias_table.root_aliases().len() == 1
    }

    fn check_single_root(&self) -> Result<(), QueryError> {
        if self.alias_table.root_aliases().len() > 1 {
            return Err(UnsupportedFeatureError::MultiRootQuery.into());
        }
        Ok(())
    }

    fn target_descriptor(&self) -> Result<TypeDescriptor, QueryError> {
        self.target
            .as_ref()
            .map(|(entity_type, _)| TypeDescriptor::entity(entity_type.clone()))
            .ok_or_else(|| SyntaxError::new("query has no FROM clause", 0).into())
    }

    pub fn resolve_unqualified_property(&self, name: &str) -> Result<PropertyPath, QueryError> {
        if self.alias_table.is_alias(name) {
            return self.resolve_qualified_root(name);
        }
        self.check_single_root()?;
        let path = PropertyPath::unqualified(self.target_descriptor()?);
        self.resolve_path_terminus(path, name)
    }

    pub fn resolve_qualified_root(&self, alias: &str) -> Result<PropertyPath, QueryError> {
        self.check_single_root()?;
        match self.alias_table.get(alias) {
            Some(AliasBinding::Root(entity_type)) => Ok(PropertyPath::from_alias(
                alias,
                TypeDescriptor::entity(entity_type.clone()),
            )),
            Some(AliasBinding::Join(join_path)) => {
                let descriptor = join_path
                    .terminal_type()
                    .cloned()
                    .ok_or_else(|| not_embedded(join_path))?;
                Ok(PropertyPath::from_alias(alias, descriptor))
            }
            None => Err(AliasError::Unknown {
                alias: alias.to_string(),
            }
            .into()),
        }
    }

    pub fn resolve_path_intermediary(
        &self,
        mut path: PropertyPath,
        property_name: &str,
    ) -> Result<PropertyPath, QueryError> {
        let current = path
            .terminal_type()
            .cloned()
            .ok_or_else(|| not_embedded(&path))?;

        if !current.has_property(self.property_helper, property_name) {
            return Err(unknown_property(&current, property_name));
        }
        if !current.is_embedded(self.property_helper, property_name) {
            return Err(SchemaError::NotEmbedded {
                property: property_name.to_string(),
                entity: current.type_name(),
            }
            .into());
        }

        path.push(PathNode::embedded(
            property_name,
            current.embedded(property_name),
        ));
        Ok(path)
    }

    pub fn resolve_path_terminus(
        &self,
        mut path: PropertyPath,
        property_name: &str,
    ) -> Result<PropertyPath, QueryError> {
        let current = path
            .terminal_type()
            .cloned()
            .ok_or_else(|| not_embedded(&path))?;

        if !current.has_property(self.property_helper, property_name) {
            return Err(unknown_property(&current, property_name));
        }

        if current.is_embedded(self.property_helper, property_name) {
            path.push(PathNode::embedded(
                property_name,
                current.embedded(property_name),
            ));
        } else {
            if !self.in_select() && current.is_analyzed(self.property_helper, property_name) {
                return Err(SchemaError::AnalyzedPropertyInPredicate {
                    property: current.property_path(property_name).join("."),
                    entity: current.entity_type().to_string(),
                }
                .into());
            }
            path.push(PathNode::scalar(property_name));
        }
        Ok(path)
    }

    /// Join path behind a lone join alias such as `a` in `join e.author a`
    fn join_alias_target(&self, path: &PropertyPath) -> Option<&PropertyPath> {
        if !path.is_alias_only() {
            return None;
        }
        match self.alias_table.get(path.root_alias()?) {
            Some(AliasBinding::Join(join_path)) => Some(join_path),
            _ => None,
        }
    }

    /// Checks applied once the whole reference is resolved
    fn complete_path(&self, path: PropertyPath) -> Result<PropertyPath, QueryError> {
        if !self.in_select() {
            return Ok(path);
        }
        if path.ends_in_embedded() {
            return Err(SchemaError::WholeEmbeddedProjection {
                property: path.to_string(),
                entity: path.root_type().entity_type().to_string(),
            }
            .into());
        }
        if self.join_alias_target(&path).is_some() {
            return Err(SchemaError::WholeEmbeddedProjection {
                property: self.alias_table.canonical_path(&path)?.join("."),
                entity: path.root_type().entity_type().to_string(),
            }
            .into());
        }
        Ok(path)
    }

    pub fn register_join_alias(
        &mut self,
        alias: &str,
        path: PropertyPath,
    ) -> Result<(), QueryError> {
        if !path.ends_in_embedded() {
            return Err(not_embedded(&path));
        }
        self.alias_table.register_join(alias, path);
        Ok(())
    }

    /// Resolve a dotted reference such as `e.author.name`, `author.name` or `e`.
    pub fn resolve_path_expression(
        &self,
        expression: &PathExpression<'_>,
    ) -> Result<PropertyPath, QueryError> {
        if expression.index.is_some() {
            return Err(UnsupportedFeatureError::CollectionIndex {
                path: expression.to_string(),
            }
            .into());
        }

        let Some((first, rest)) = expression.segments.split_first() else {
            return Err(SyntaxError::new("empty property path", 0).into());
        };
        let Some((last, middle)) = rest.split_last() else {
            let path = self.resolve_unqualified_property(first)?;
            return self.complete_path(path);
        };

        let mut path = if self.alias_table.is_alias(first) {
            self.resolve_qualified_root(first)?
        } else {
            self.check_single_root()?;
            let target = self.target_descriptor()?;
            // `x.name` with `x` neither an alias nor a property of the target
            if !target.has_property(self.property_helper, first) {
                return Err(AliasError::Unknown {
                    alias: first.to_string(),
                }
                .into());
            }
            self.resolve_path_intermediary(PropertyPath::unqualified(target), first)?
        };
        for name in middle {
            path = self.resolve_path_intermediary(path, name)?;
        }
        path = self.resolve_path_terminus(path, last)?;
        self.complete_path(path)
    }

    /// A reference that must denote a property, not a whole entity
    fn resolve_property_reference(
        &self,
        expression: &PathExpression<'_>,
    ) -> Result<PropertyPath, QueryError> {
        let path = self.resolve_path_expression(expression)?;
        if let (true, Some(alias)) = (path.is_alias_only(), path.root_alias()) {
            let denotes = match self.join_alias_target(&path) {
                Some(_) => format!(
                    "the embedded object '{}'",
                    self.alias_table.canonical_path(&path)?.join(".")
                ),
                None => format!("an entity of type '{}'", path.root_type().entity_type()),
            };
            return Err(SchemaError::EntityInPredicate {
                alias: alias.to_string(),
                denotes,
            }
            .into());
        }
        Ok(path)
    }

    fn resolve_aggregate(
        &self,
        aggregate: &AggregateExpression<'_>,
    ) -> Result<AggregationPropertyPath, QueryError> {
        Ok(AggregationPropertyPath {
            path: self.resolve_property_reference(&aggregate.path)?,
            aggregation: aggregation_function(aggregate.function, aggregate.distinct),
        })
    }

    fn resolve_operand(
        &self,
        operand: &Operand<'_>,
        clause: Clause,
    ) -> Result<ResolvedOperand, QueryError> {
        match operand {
            Operand::Path(path) if clause == Clause::Having => {
                Err(UnsupportedFeatureError::PlainPropertyInHaving {
                    property: path.to_string(),
                }
                .into())
            }
            Operand::Path(path) => Ok(ResolvedOperand::Path(
                self.resolve_property_reference(path)?,
            )),
            Operand::Aggregate(aggregate) if clause == Clause::Where => {
                Err(UnsupportedFeatureError::AggregateOutsideHaving {
                    expression: format!(
                        "{}({})",
                        aggregation_function(aggregate.function, aggregate.distinct),
                        aggregate.path
                    ),
                }
                .into())
            }
            Operand::Aggregate(aggregate) => {
                Ok(ResolvedOperand::Aggregate(self.resolve_aggregate(aggregate)?))
            }
            Operand::Literal(literal) => Ok(ResolvedOperand::Literal(literal.text())),
            Operand::NamedParameter(name) => match self.named_parameters.get(*name) {
                Some(value) => Ok(ResolvedOperand::Parameter {
                    name: name.to_string(),
                    value: value.clone(),
                }),
                None => Err(QueryError::UnboundParameter {
                    name: name.to_string(),
                }),
            },
            Operand::PositionalParameter(_) => {
                Err(UnsupportedFeatureError::PositionalParameter.into())
            }
        }
    }

    fn resolve_expression(
        &self,
        expression: &BooleanExpression<'_>,
        clause: Clause,
    ) -> Result<ResolvedExpression, QueryError> {
        let resolved = match expression {
            BooleanExpression::And(children) => ResolvedExpression::And(
                children
                    .iter()
                    .map(|child| self.resolve_expression(child, clause))
                    .collect::<Result<_, _>>()?,
            ),
            BooleanExpression::Or(children) => ResolvedExpression::Or(
                children
                    .iter()
                    .map(|child| self.resolve_expression(child, clause))
                    .collect::<Result<_, _>>()?,
            ),
            BooleanExpression::Not(child) => {
                ResolvedExpression::Not(Box::new(self.resolve_expression(child, clause)?))
            }
            BooleanExpression::Comparison {
                left,
                operator,
                right,
            } => ResolvedExpression::Comparison {
                left: self.resolve_operand(left, clause)?,
                operator: *operator,
                right: self.resolve_operand(right, clause)?,
            },
            BooleanExpression::Between {
                operand,
                lower,
                upper,
                negated,
            } => ResolvedExpression::Between {
                operand: self.resolve_operand(operand, clause)?,
                lower: self.resolve_operand(lower, clause)?,
                upper: self.resolve_operand(upper, clause)?,
                negated: *negated,
            },
            BooleanExpression::In {
                operand,
                values,
                negated,
            } => ResolvedExpression::In {
                operand: self.resolve_operand(operand, clause)?,
                values: values
                    .iter()
                    .map(|value| self.resolve_operand(value, clause))
                    .collect::<Result<_, _>>()?,
                negated: *negated,
            },
            BooleanExpression::Like {
                operand,
                pattern,
                escape,
                negated,
            } => ResolvedExpression::Like {
                operand: self.resolve_operand(operand, clause)?,
                pattern: self.resolve_operand(pattern, clause)?,
                escape: *escape,
                negated: *negated,
            },
            BooleanExpression::IsNull { operand, negated } => ResolvedExpression::IsNull {
                operand: self.resolve_operand(operand, clause)?,
                negated: *negated,
            },
        };
        Ok(resolved)
    }

    /// Run the pass over a whole statement: FROM first, then SELECT, WHERE,
    /// GROUP BY, HAVING and ORDER BY.
    pub fn resolve(mut self, statement: &HqlStatement<'_>) -> Result<ResolvedStatement, QueryError> {
        self.push_from_strategy();
        for space in &statement.from_clause.persister_spaces {
            self.register_persister_space(space.entity_name, space.alias)?;
        }
        for join in &statement.from_clause.joins {
            let path = self.resolve_path_expression(&join.path)?;
            self.register_join_alias(join.alias, path)?;
        }
        self.pop_strategy();

        let mut projections = Vec::new();
        let mut distinct = false;
        if let Some(select) = &statement.select_clause {
            self.push_select_strategy();
            distinct = select.distinct;
            for item in &select.select_items {
                let projection = match item {
                    SelectItem::Path(path) => {
                        ResolvedProjection::Path(self.resolve_path_expression(path)?)
                    }
                    SelectItem::Aggregate(aggregate) => {
                        ResolvedProjection::Aggregate(self.resolve_aggregate(aggregate)?)
                    }
                };
                projections.push(projection);
            }
            self.pop_strategy();
        }

        let where_clause = statement
            .where_clause
            .as_ref()
            .map(|clause| self.resolve_expression(&clause.conditions, Clause::Where))
            .transpose()?;

        let group_by = match &statement.group_by_clause {
            Some(clause) => clause
                .paths
                .iter()
                .map(|path| self.resolve_property_reference(path))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let having = statement
            .having_clause
            .as_ref()
            .map(|clause| self.resolve_expression(&clause.conditions, Clause::Having))
            .transpose()?;

        let mut order_by = Vec::new();
        if let Some(clause) = &statement.order_by_clause {
            self.push_order_by_strategy();
            for item in &clause.order_by_items {
                order_by.push(ResolvedSortItem {
                    path: self.resolve_property_reference(&item.path)?,
                    ascending: item.ascending,
                });
            }
            self.pop_strategy();
        }

        let (target_entity, target_entity_name) = self
            .target
            .ok_or_else(|| SyntaxError::new("query has no FROM clause", 0))?;

        log::debug!(
            "resolved query over '{}' with {} projection(s) and {} alias(es)",
            target_entity,
            projections.len(),
            self.alias_table.root_aliases().len()
        );

        Ok(ResolvedStatement {
            target_entity,
            target_entity_name,
            distinct,
            projections,
            where_clause,
            group_by,
            having,
            order_by,
            alias_table: self.alias_table,
        })
    }
}

fn aggregation_function(function: AggregateFunction, distinct: bool) -> AggregationFunction {
    match function {
        AggregateFunction::Sum => AggregationFunction::Sum,
        AggregateFunction::Avg => AggregationFunction::Avg,
        AggregateFunction::Min => AggregationFunction::Min,
        AggregateFunction::Max => AggregationFunction::Max,
        AggregateFunction::Count if distinct => AggregationFunction::CountDistinct,
        AggregateFunction::Count => AggregationFunction::Count,
    }
}

fn unknown_property(current: &TypeDescriptor, property: &str) -> QueryError {
    SchemaError::UnknownProperty {
        property: property.to_string(),
        entity: current.type_name(),
    }
    .into()
}

fn not_embedded(path: &PropertyPath) -> QueryError {
    SchemaError::NotEmbedded {
        property: path.to_string(),
        entity: path.root_type().type_name(),
    }
    .into()
}
