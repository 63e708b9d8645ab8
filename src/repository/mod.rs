//! Generic repository over a SeaORM entity.
//!
//! A [`Repository`] holds a borrowed connection and forwards every call to
//! SeaORM. Reads live here, aggregates in [`aggregate`] and writes in
//! [`write`]. Repositories handed out by a
//! [`UnitOfWork`](crate::unit_of_work::UnitOfWork) also record their writes in
//! the unit's change tracker.

pub mod aggregate;
pub mod write;

use log::debug;
use sea_orm::{
    ConnectionTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, PartialModelTrait, PrimaryKeyTrait,
    QuerySelect, Select, SelectModel, SelectorRaw, SelectorTrait, Statement, Value,
};
use std::marker::PhantomData;

use crate::error::{DbResultExt, Result};
use crate::paging::{PageRequest, PagedList};
use crate::query::QueryOptions;
use crate::unit_of_work::ChangeTracker;

/// Data-access facade for one entity type.
///
/// `C` is whatever SeaORM connection the repository runs on: a
/// `DatabaseConnection`, or a `DatabaseTransaction` when it comes from a unit
/// of work.
pub struct Repository<'a, E, C = DatabaseTransaction> {
    conn: &'a C,
    tracker: Option<&'a ChangeTracker>,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E, C> Clone for Repository<'a, E, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, E, C> Copy for Repository<'a, E, C> {}

impl<'a, E, C> Repository<'a, E, C>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    /// Untracked repository over any connection.
    pub fn new(conn: &'a C) -> Self {
        Self {
            conn,
            tracker: None,
            _entity: PhantomData,
        }
    }

    pub(crate) fn tracked(conn: &'a C, tracker: &'a ChangeTracker) -> Self {
        Self {
            conn,
            tracker: Some(tracker),
            _entity: PhantomData,
        }
    }

    /// The connection queries are forwarded to.
    pub fn connection(&self) -> &'a C {
        self.conn
    }

    pub(crate) fn table_name() -> String {
        E::default().table_name().to_string()
    }

    /// Base query for the entity.
    pub fn query(&self) -> Select<E> {
        E::find()
    }

    /// Base query with filter, includes and ordering applied.
    pub fn query_with(&self, options: QueryOptions<E>) -> Select<E> {
        options.apply(E::find())
    }

    /// One page of entities.
    pub async fn get_paged_list(&self, options: QueryOptions<E>, page: PageRequest) -> Result<PagedList<E::Model>>
    where
        E::Model: Sync,
    {
        self.get_paged_list_from(E::find(), options, page).await
    }

    /// One page of a projection of the entity.
    pub async fn get_paged_list_as<M>(&self, options: QueryOptions<E>, page: PageRequest) -> Result<PagedList<M>>
    where
        M: PartialModelTrait + Send + Sync,
    {
        self.get_paged_list_from_as(E::find(), options, page).await
    }

    /// One page over a caller-built base query.
    pub async fn get_paged_list_from(
        &self,
        select: Select<E>,
        options: QueryOptions<E>,
        page: PageRequest,
    ) -> Result<PagedList<E::Model>>
    where
        E::Model: Sync,
    {
        page.validate()?;
        Self::fetch_paged(self.conn, options.apply(select), page).await
    }

    /// One page of a projection over a caller-built base query.
    pub async fn get_paged_list_from_as<M>(
        &self,
        select: Select<E>,
        options: QueryOptions<E>,
        page: PageRequest,
    ) -> Result<PagedList<M>>
    where
        M: PartialModelTrait + Send + Sync,
    {
        page.validate()?;
        Self::fetch_paged(self.conn, options.apply(select).into_partial_model::<M>(), page).await
    }

    async fn fetch_paged<'c, S>(
        conn: &'c C,
        query: S,
        page: PageRequest,
    ) -> Result<PagedList<<S::Selector as SelectorTrait>::Item>>
    where
        S: PaginatorTrait<'c, C>,
    {
        debug!(
            "Repository<{}>: fetching page {} (size {})",
            Self::table_name(),
            page.page_index,
            page.page_size
        );
        let paginator = query.paginate(conn, page.page_size);
        let totals = paginator
            .num_items_and_pages()
            .await
            .with_context(|| format!("Failed to count rows of {}", Self::table_name()))?;
        let items = paginator
            .fetch_page(page.zero_based())
            .await
            .with_context(|| format!("Failed to fetch page {} of {}", page.page_index, Self::table_name()))?;
        Ok(PagedList::new(items, page, totals.number_of_items))
    }

    /// First entity matching the options, if any.
    pub async fn get_first_or_default(&self, options: QueryOptions<E>) -> Result<Option<E::Model>> {
        options
            .apply(E::find())
            .one(self.conn)
            .await
            .with_context(|| format!("Failed to query {}", Self::table_name()))
    }

    /// First projection matching the options, if any.
    pub async fn get_first_or_default_as<M>(&self, options: QueryOptions<E>) -> Result<Option<M>>
    where
        M: PartialModelTrait,
    {
        options
            .apply(E::find())
            .into_partial_model::<M>()
            .one(self.conn)
            .await
            .with_context(|| format!("Failed to query {}", Self::table_name()))
    }

    /// Raw SQL mapped onto the entity. Execute it with `.all()` / `.one()` on
    /// [`Self::connection`].
    pub fn raw_sql<I>(&self, sql: &str, values: I) -> SelectorRaw<SelectModel<E::Model>>
    where
        I: IntoIterator<Item = Value>,
    {
        let statement = Statement::from_sql_and_values(self.conn.get_database_backend(), sql, values);
        E::find().from_raw_sql(statement)
    }

    /// Entity by primary key.
    pub async fn find<K>(&self, key: K) -> Result<Option<E::Model>>
    where
        K: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        E::find_by_id(key)
            .one(self.conn)
            .await
            .with_context(|| format!("Failed to find {} by key", Self::table_name()))
    }

    /// Every row of the table. Prefer [`Self::get_paged_list`] on large tables.
    pub async fn get_all(&self) -> Result<Vec<E::Model>> {
        E::find()
            .all(self.conn)
            .await
            .with_context(|| format!("Failed to load {}", Self::table_name()))
    }

    /// All entities matching the options.
    pub async fn get_by_filter(&self, options: QueryOptions<E>) -> Result<Vec<E::Model>> {
        options
            .apply(E::find())
            .all(self.conn)
            .await
            .with_context(|| format!("Failed to query {}", Self::table_name()))
    }

    /// At most `limit` entities matching the options.
    pub async fn get_top(&self, options: QueryOptions<E>, limit: u64) -> Result<Vec<E::Model>> {
        options
            .apply(E::find())
            .limit(limit)
            .all(self.conn)
            .await
            .with_context(|| format!("Failed to query {}", Self::table_name()))
    }
}
