//! Unit of work: repositories sharing one persistence context.
//!
//! The persistence context is an open SeaORM transaction. Repositories taken
//! from the unit write into it, and the writes stay pending until
//! [`UnitOfWork::save_changes`] commits them. Rolling back, resetting, closing
//! or dropping the unit discards them.
//!
//! # Example
//! ```rust,no_run
//! use sea_uow::config::DatabaseConfig;
//! use sea_uow::unit_of_work::UnitOfWork;
//!
//! # async fn example() -> sea_uow::error::Result<()> {
//! let mut uow = UnitOfWork::connect(&DatabaseConfig::new("sqlite://app.db?mode=rwc")).await?;
//! let affected = uow.execute_sql_command("DELETE FROM sessions WHERE expired = ?", [true.into()]).await?;
//! let saved = uow.save_changes(false).await?;
//! # let _ = (affected, saved);
//! # Ok(())
//! # }
//! ```

pub mod history;
pub mod tracker;

pub use history::ensure_auto_history_table;
pub use tracker::{ChangeEntry, ChangeKind, ChangeTracker};

use log::{debug, info, warn};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, EntityTrait, FromQueryResult,
    SelectModel, SelectorRaw, Statement, TransactionTrait, Value,
};

use crate::config::DatabaseConfig;
use crate::constants::ERROR_CONTEXT_CLOSED;
use crate::error::{DbResultExt, Result, UnitOfWorkError};
use crate::repository::Repository;
use crate::utils::database_url;

/// Aggregates repositories under one transactional scope.
pub struct UnitOfWork {
    conn: DatabaseConnection,
    config: Option<DatabaseConfig>,
    context: Option<DatabaseTransaction>,
    tracker: ChangeTracker,
}

impl UnitOfWork {
    /// Connect with the given settings and open a persistence context.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let conn = Self::open_connection(config, &config.url).await?;
        let mut unit = Self::new(conn).await?;
        unit.config = Some(config.clone());
        Ok(unit)
    }

    /// Open a persistence context on an existing connection.
    ///
    /// A unit built this way cannot [`change_database`](Self::change_database).
    pub async fn new(conn: DatabaseConnection) -> Result<Self> {
        let context = conn.begin().await.context("Failed to open unit of work")?;
        debug!("Unit of work opened");
        Ok(Self {
            conn,
            config: None,
            context: Some(context),
            tracker: ChangeTracker::new(),
        })
    }

    async fn open_connection(config: &DatabaseConfig, url: &str) -> Result<DatabaseConnection> {
        let mut options = ConnectOptions::new(url.to_string());
        options
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .connect_timeout(config.connect_timeout())
            .sqlx_logging(config.sqlx_logging);
        Database::connect(options)
            .await
            .with_context(|| format!("Failed to connect to {}", url))
    }

    async fn reopen(&mut self) -> Result<()> {
        let context = self.conn.begin().await.context("Failed to reopen unit of work")?;
        self.context = Some(context);
        Ok(())
    }

    /// The open transaction every repository of this unit runs on.
    pub fn transaction(&self) -> Result<&DatabaseTransaction> {
        self.context
            .as_ref()
            .ok_or_else(|| UnitOfWorkError::new(ERROR_CONTEXT_CLOSED))
    }

    /// The underlying connection pool.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Settings the unit was connected with, if built from configuration.
    pub fn config(&self) -> Option<&DatabaseConfig> {
        self.config.as_ref()
    }

    /// Repository for `E` bound to this unit's context and change tracker.
    pub fn repository<E: EntityTrait>(&self) -> Result<Repository<'_, E>> {
        Ok(Repository::tracked(self.transaction()?, &self.tracker))
    }

    /// Writes recorded since the last save or rollback.
    pub fn pending_changes(&self) -> Vec<ChangeEntry> {
        self.tracker.entries()
    }

    pub fn has_changes(&self) -> bool {
        !self.tracker.is_empty()
    }

    /// Commit pending writes and open a fresh context.
    ///
    /// Returns the number of rows written since the last save. With
    /// `ensure_auto_history` the recorded changes are also written to the
    /// `auto_history` table in the same transaction, which must exist (see
    /// [`ensure_auto_history_table`]).
    pub async fn save_changes(&mut self, ensure_auto_history: bool) -> Result<u64> {
        let entries = self.tracker.entries();
        if ensure_auto_history && !entries.is_empty() {
            history::write_history(self.transaction()?, &entries).await?;
        }

        let context = self
            .context
            .take()
            .ok_or_else(|| UnitOfWorkError::new(ERROR_CONTEXT_CLOSED))?;
        let committed = context.commit().await;
        self.tracker.clear();
        let reopened = self.reopen().await;
        committed.context("Failed to save changes")?;
        reopened?;

        let rows: u64 = entries.iter().map(|entry| entry.rows).sum();
        info!("Saved {} changes ({} rows)", entries.len(), rows);
        Ok(rows)
    }

    /// Discard pending writes and open a fresh context.
    ///
    /// A fresh context is opened even when the rollback itself fails.
    pub async fn rollback_changes(&mut self) -> Result<()> {
        let discarded = self.tracker.len();
        let rolled_back = match self.context.take() {
            Some(context) => context.rollback().await,
            None => Ok(()),
        };
        self.tracker.clear();
        let reopened = self.reopen().await;
        rolled_back.context("Failed to roll back changes")?;
        reopened?;

        if discarded > 0 {
            warn!("Rolled back {} pending changes", discarded);
        } else {
            debug!("Rolled back unit of work");
        }
        Ok(())
    }

    /// Forget all tracked state. Pending writes are discarded with it, since
    /// they only exist inside the shared context.
    pub async fn reset_context_state(&mut self) -> Result<()> {
        self.rollback_changes().await
    }

    /// Nested transaction (a savepoint) inside this unit's context.
    ///
    /// Writes made through it are not recorded by the change tracker; wrap it
    /// with [`Repository::new`] and commit or roll it back yourself.
    pub async fn begin_transaction(&self) -> Result<DatabaseTransaction> {
        self.transaction()?
            .begin()
            .await
            .context("Failed to begin nested transaction")
    }

    /// Point the unit at another database on the same server.
    ///
    /// Pending writes are discarded and the old connection pool is closed. If
    /// the new database cannot be reached the unit keeps its current
    /// connection, context and pending writes.
    pub async fn change_database(&mut self, database: &str) -> Result<()> {
        let config = self
            .config
            .clone()
            .ok_or_else(|| UnitOfWorkError::new("change_database requires a unit of work created with connect"))?;
        let url = database_url::with_database(&config.url, database)?;
        let conn = Self::open_connection(&config, &url).await?;

        if let Some(context) = self.context.take() {
            if let Err(e) = context.rollback().await {
                warn!("Failed to roll back before switching database: {}", e);
            }
        }
        if !self.tracker.is_empty() {
            warn!("Discarding {} pending changes to switch database", self.tracker.len());
            self.tracker.clear();
        }

        let previous = std::mem::replace(&mut self.conn, conn);
        if let Err(e) = previous.close().await {
            warn!("Failed to close previous connection: {}", e);
        }

        info!("Switched unit of work to database '{}'", database);
        self.config = Some(DatabaseConfig { url, ..config });
        self.reopen().await
    }

    fn statement<I>(&self, sql: &str, values: I) -> Result<Statement>
    where
        I: IntoIterator<Item = Value>,
    {
        let backend = self.transaction()?.get_database_backend();
        Ok(Statement::from_sql_and_values(backend, sql, values))
    }

    /// Run a raw statement in the context; returns rows affected.
    ///
    /// Raw statements are not recorded by the change tracker.
    pub async fn execute_sql_command<I>(&self, sql: &str, values: I) -> Result<u64>
    where
        I: IntoIterator<Item = Value>,
    {
        debug!("Executing SQL command: {}", sql);
        let statement = self.statement(sql, values)?;
        let result = self
            .transaction()?
            .execute(statement)
            .await
            .with_context(|| format!("Failed to execute SQL command: {}", sql))?;
        Ok(result.rows_affected())
    }

    /// Raw SQL mapped onto entity `E`. Execute it on [`Self::transaction`].
    pub fn raw_sql<E: EntityTrait, I>(&self, sql: &str, values: I) -> Result<SelectorRaw<SelectModel<E::Model>>>
    where
        I: IntoIterator<Item = Value>,
    {
        Ok(E::find().from_raw_sql(self.statement(sql, values)?))
    }

    /// Run a raw query in the context and map every row onto `T`.
    pub async fn get_from_raw_sql<T, I>(&self, sql: &str, values: I) -> Result<Vec<T>>
    where
        T: FromQueryResult,
        I: IntoIterator<Item = Value>,
    {
        debug!("Executing SQL query: {}", sql);
        let statement = self.statement(sql, values)?;
        T::find_by_statement(statement)
            .all(self.transaction()?)
            .await
            .with_context(|| format!("Failed to execute SQL query: {}", sql))
    }

    /// Discard pending writes and close the connection pool.
    pub async fn close(mut self) -> Result<()> {
        if let Some(context) = self.context.take() {
            if !self.tracker.is_empty() {
                warn!("Closing unit of work with {} unsaved changes", self.tracker.len());
            }
            context.rollback().await.context("Failed to roll back on close")?;
        }
        self.conn.close().await.context("Failed to close connection")?;
        debug!("Unit of work closed");
        Ok(())
    }
}
