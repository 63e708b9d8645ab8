//! Inserts, updates and deletes.
//!
//! Every write is forwarded to SeaORM immediately. When the repository
//! belongs to a unit of work the write lands in the unit's open transaction
//! and is recorded in its change tracker until saved or discarded.

use log::debug;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel, PrimaryKeyTrait,
    QueryFilter,
};
use serde::Serialize;

use super::Repository;
use crate::error::{DbResultExt, Result};
use crate::unit_of_work::tracker::{key_of, set_values_of, ChangeEntry, ChangeKind};

impl<'a, E, C> Repository<'a, E, C>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    fn track(&self, entry: ChangeEntry) {
        if let Some(tracker) = self.tracker {
            tracker.record(entry);
        }
    }

    fn track_model<A>(&self, kind: ChangeKind, model: &E::Model)
    where
        A: ActiveModelTrait<Entity = E>,
        E::Model: IntoActiveModel<A> + Serialize,
    {
        if self.tracker.is_some() {
            let key = key_of(&model.clone().into_active_model());
            self.track(ChangeEntry::new::<E>(kind, key).changed(serde_json::to_value(model).ok()));
        }
    }

    /// Insert one row and return it as stored.
    pub async fn insert<A>(&self, model: A) -> Result<E::Model>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A> + Serialize,
    {
        debug!("Repository<{}>: insert", Self::table_name());
        let inserted = model
            .insert(self.conn)
            .await
            .with_context(|| format!("Failed to insert into {}", Self::table_name()))?;
        self.track_model::<A>(ChangeKind::Added, &inserted);
        Ok(inserted)
    }

    /// Insert several rows in one statement. Returns how many were inserted.
    ///
    /// The database does not report generated keys for bulk inserts, so rows
    /// keyed by auto-increment are tracked with an empty key. Their column
    /// values are still recorded.
    pub async fn insert_many<A, I>(&self, models: I) -> Result<u64>
    where
        A: ActiveModelTrait<Entity = E> + Send,
        E::Model: IntoActiveModel<A>,
        I: IntoIterator<Item = A>,
    {
        let models: Vec<A> = models.into_iter().collect();
        if models.is_empty() {
            return Ok(0);
        }
        let count = models.len() as u64;
        debug!("Repository<{}>: insert {} rows", Self::table_name(), count);

        let entries: Vec<ChangeEntry> = if self.tracker.is_some() {
            models
                .iter()
                .map(|model| {
                    ChangeEntry::new::<E>(ChangeKind::Added, key_of(model)).changed(Some(set_values_of(model)))
                })
                .collect()
        } else {
            Vec::new()
        };

        let inserted = E::insert_many(models)
            .exec_without_returning(self.conn)
            .await
            .with_context(|| format!("Failed to insert {} rows into {}", count, Self::table_name()))?;

        entries.into_iter().for_each(|entry| self.track(entry));
        Ok(inserted)
    }

    /// Update one row and return it as stored.
    pub async fn update<A>(&self, model: A) -> Result<E::Model>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A> + Serialize,
    {
        debug!("Repository<{}>: update [{}]", Self::table_name(), key_of(&model));
        let updated = model
            .update(self.conn)
            .await
            .with_context(|| format!("Failed to update {}", Self::table_name()))?;
        self.track_model::<A>(ChangeKind::Modified, &updated);
        Ok(updated)
    }

    /// Update each row in turn.
    pub async fn update_many<A, I>(&self, models: I) -> Result<Vec<E::Model>>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<A> + Serialize,
        I: IntoIterator<Item = A>,
    {
        let mut updated = Vec::new();
        for model in models {
            updated.push(self.update(model).await?);
        }
        Ok(updated)
    }

    /// Delete the row identified by the model's primary key.
    ///
    /// A loaded model can be passed with `model.into_active_model()`.
    pub async fn delete<A>(&self, model: A) -> Result<u64>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    {
        let key = key_of(&model);
        debug!("Repository<{}>: delete [{}]", Self::table_name(), key);
        let result = E::delete(model)
            .exec(self.conn)
            .await
            .with_context(|| format!("Failed to delete from {}", Self::table_name()))?;
        if result.rows_affected > 0 {
            self.track(ChangeEntry::new::<E>(ChangeKind::Deleted, key).rows(result.rows_affected));
        }
        Ok(result.rows_affected)
    }

    /// Delete by primary key.
    pub async fn delete_by_id<K>(&self, key: K) -> Result<u64>
    where
        K: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        let key = key.into();
        let key_text = format!("{:?}", key);
        debug!("Repository<{}>: delete by id [{}]", Self::table_name(), key_text);
        let result = E::delete_by_id(key)
            .exec(self.conn)
            .await
            .with_context(|| format!("Failed to delete from {}", Self::table_name()))?;
        if result.rows_affected > 0 {
            self.track(ChangeEntry::new::<E>(ChangeKind::Deleted, key_text).rows(result.rows_affected));
        }
        Ok(result.rows_affected)
    }

    /// Delete each row in turn. Returns the total rows deleted.
    pub async fn delete_many<A, I>(&self, models: I) -> Result<u64>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        I: IntoIterator<Item = A>,
    {
        let mut deleted = 0;
        for model in models {
            deleted += self.delete(model).await?;
        }
        Ok(deleted)
    }

    /// Delete every row matching `filter`.
    pub async fn delete_where(&self, filter: Condition) -> Result<u64> {
        debug!("Repository<{}>: delete where", Self::table_name());
        let result = E::delete_many()
            .filter(filter)
            .exec(self.conn)
            .await
            .with_context(|| format!("Failed to delete from {}", Self::table_name()))?;
        if result.rows_affected > 0 {
            self.track(ChangeEntry::new::<E>(ChangeKind::Deleted, "*".to_string()).rows(result.rows_affected));
        }
        Ok(result.rows_affected)
    }
}
