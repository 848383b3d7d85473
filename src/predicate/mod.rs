//! Backend-agnostic filter predicates.
//!
//! A WHERE or HAVING clause is assembled into a [`Predicate`] tree by a
//! stack-discipline builder ([`QueryBuilder`], [`HavingBuilder`]) and rendered
//! into the backend query type `Q` through a [`PredicateFactory`].
//!
//! ```text
//! push_or ─┬─ add_comparison(name = 'same')
//!          └─ push_and ─┬─ add_comparison(id = 4)
//!                       ├─ add_comparison(name = 'booh')
//!                       └─ pop
//! pop
//! ```

pub mod aggregation;
mod builder;
pub mod factory;
mod tree;

pub use aggregation::{
    AggregatedProperty, AggregationFunction, AggregationPropertyPath, HavingBuilder,
};
pub use builder::{ConditionBuilder, OperandValue, QueryBuilder};
pub use factory::{AggregationPredicateFactory, PredicateFactory};
pub use tree::{ComparisonType, Condition, Predicate};
