//! Counting and column aggregates.

use sea_orm::sea_query::{Expr, Func, FunctionCall, SimpleExpr};
use sea_orm::{Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, TryGetable};

use super::Repository;
use crate::error::{DbResultExt, Result};

const AGGREGATE_ALIAS: &str = "aggregate_value";

impl<'a, E, C> Repository<'a, E, C>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    /// Rows matching `filter`, or every row when `None`.
    pub async fn count(&self, filter: Option<Condition>) -> Result<u64> {
        let mut select = E::find();
        if let Some(filter) = filter {
            select = select.filter(filter);
        }
        select
            .count(self.conn)
            .await
            .with_context(|| format!("Failed to count {}", Self::table_name()))
    }

    /// Rows matching every condition. No conditions counts the whole table.
    pub async fn count_all<I>(&self, conditions: I) -> Result<u64>
    where
        I: IntoIterator<Item = Condition>,
    {
        let combined = conditions
            .into_iter()
            .fold(Condition::all(), |all, condition| all.add(condition));
        self.count(Some(combined)).await
    }

    /// Whether any row matches.
    pub async fn exists(&self, condition: Condition) -> Result<bool> {
        let found = E::find()
            .filter(condition)
            .one(self.conn)
            .await
            .with_context(|| format!("Failed to check {} for matching rows", Self::table_name()))?;
        Ok(found.is_some())
    }

    /// Largest value of `column`; `None` when no row matches.
    pub async fn max<V>(&self, column: E::Column, filter: Option<Condition>) -> Result<Option<V>>
    where
        V: TryGetable,
    {
        self.aggregate(Func::max(Self::column_expr(column)), filter).await
    }

    /// Smallest value of `column`; `None` when no row matches.
    pub async fn min<V>(&self, column: E::Column, filter: Option<Condition>) -> Result<Option<V>>
    where
        V: TryGetable,
    {
        self.aggregate(Func::min(Self::column_expr(column)), filter).await
    }

    /// Sum of `column`; `None` when no row matches.
    pub async fn sum<V>(&self, column: E::Column, filter: Option<Condition>) -> Result<Option<V>>
    where
        V: TryGetable,
    {
        self.aggregate(Func::sum(Self::column_expr(column)), filter).await
    }

    /// Mean of `column`; `None` when no row matches.
    pub async fn average<V>(&self, column: E::Column, filter: Option<Condition>) -> Result<Option<V>>
    where
        V: TryGetable,
    {
        self.aggregate(Func::avg(Self::column_expr(column)), filter).await
    }

    fn column_expr(column: E::Column) -> Expr {
        Expr::col((E::default(), column))
    }

    async fn aggregate<V>(&self, function: FunctionCall, filter: Option<Condition>) -> Result<Option<V>>
    where
        V: TryGetable,
    {
        let mut select = E::find()
            .select_only()
            .column_as(SimpleExpr::from(function), AGGREGATE_ALIAS);
        if let Some(filter) = filter {
            select = select.filter(filter);
        }
        let value = select
            .into_tuple::<Option<V>>()
            .one(self.conn)
            .await
            .with_context(|| format!("Failed to aggregate {}", Self::table_name()))?;
        Ok(value.flatten())
    }
}
