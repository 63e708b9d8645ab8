//! Filter, ordering and include descriptors handed to repository reads.
//!
//! None of these are interpreted here. They are collected and applied to a
//! SeaORM [`Select`] exactly as given.

use sea_orm::sea_query::IntoCondition;
use sea_orm::{Condition, EntityTrait, JoinType, Order, QueryFilter, QueryOrder, QuerySelect, RelationDef, Select};

/// Filter / sort / include arguments for one query.
///
/// # Example
/// ```rust,ignore
/// let options = QueryOptions::<task::Entity>::new()
///     .filter(task::Column::IsCompleted.eq(false))
///     .include(task::Relation::Project.def())
///     .order_by_asc(task::Column::OrderIndex);
/// ```
pub struct QueryOptions<E: EntityTrait> {
    filter: Option<Condition>,
    order_by: Vec<(E::Column, Order)>,
    include: Vec<RelationDef>,
}

impl<E: EntityTrait> Default for QueryOptions<E> {
    fn default() -> Self {
        Self {
            filter: None,
            order_by: Vec::new(),
            include: Vec::new(),
        }
    }
}

impl<E: EntityTrait> QueryOptions<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate. Repeated calls are AND-ed together.
    pub fn filter<F: IntoCondition>(mut self, filter: F) -> Self {
        let condition = filter.into_condition();
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.add(condition),
            None => Condition::all().add(condition),
        });
        self
    }

    pub fn order_by(mut self, column: E::Column, order: Order) -> Self {
        self.order_by.push((column, order));
        self
    }

    pub fn order_by_asc(self, column: E::Column) -> Self {
        self.order_by(column, Order::Asc)
    }

    pub fn order_by_desc(self, column: E::Column) -> Self {
        self.order_by(column, Order::Desc)
    }

    /// LEFT JOINs a relation so filters and ordering can use its columns.
    pub fn include(mut self, relation: RelationDef) -> Self {
        self.include.push(relation);
        self
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    /// The combined predicate, if any was given.
    pub fn into_condition(self) -> Option<Condition> {
        self.filter
    }

    /// Applies joins, then the predicate, then ordering.
    pub fn apply(self, mut select: Select<E>) -> Select<E> {
        for relation in self.include {
            select = select.join(JoinType::LeftJoin, relation);
        }
        if let Some(filter) = self.filter {
            select = select.filter(filter);
        }
        for (column, order) in self.order_by {
            select = select.order_by(column, order);
        }
        select
    }
}

impl<E: EntityTrait> From<Condition> for QueryOptions<E> {
    fn from(condition: Condition) -> Self {
        Self::new().filter(condition)
    }
}
