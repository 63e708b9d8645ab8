//! Persisting tracked changes into the `auto_history` table.

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, EntityTrait, Schema};
use uuid::Uuid;

use super::tracker::ChangeEntry;
use crate::entities::auto_history;
use crate::error::{DbResultExt, Result};

/// Rows per INSERT, well under SQLite's bound-parameter limit.
const HISTORY_BATCH_SIZE: usize = 100;

/// Create the `auto_history` table if it does not exist yet.
pub async fn ensure_auto_history_table<C>(conn: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let backend = conn.get_database_backend();
    let mut table = Schema::new(backend).create_table_from_entity(auto_history::Entity);
    table.if_not_exists();
    conn.execute(backend.build(&table))
        .await
        .context("Failed to create auto_history table")?;
    Ok(())
}

pub(crate) async fn write_history<C>(conn: &C, entries: &[ChangeEntry]) -> Result<()>
where
    C: ConnectionTrait,
{
    let created = Utc::now().to_rfc3339();
    let rows: Vec<auto_history::ActiveModel> = entries
        .iter()
        .map(|entry| auto_history::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            table_name: ActiveValue::Set(entry.table.clone()),
            row_id: ActiveValue::Set(entry.key.clone()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            changed: ActiveValue::Set(entry.changed.as_ref().map(|value| value.to_string())),
            created: ActiveValue::Set(created.clone()),
        })
        .collect();

    for batch in rows.chunks(HISTORY_BATCH_SIZE) {
        auto_history::Entity::insert_many(batch.to_vec())
            .exec_without_returning(conn)
            .await
            .context("Failed to write auto history")?;
    }
    log::debug!("Wrote {} auto history rows", rows.len());
    Ok(())
}
