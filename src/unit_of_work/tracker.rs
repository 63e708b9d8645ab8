//! Bookkeeping of writes made through a unit of work's repositories.

use sea_orm::{ActiveModelTrait, ActiveValue, EntityTrait, IdenStatic, Iterable, PrimaryKeyToColumn, Value};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What happened to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "Added",
            ChangeKind::Modified => "Modified",
            ChangeKind::Deleted => "Deleted",
        }
    }
}

/// One recorded write, pending until the unit of work saves or discards it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEntry {
    pub table: String,
    pub kind: ChangeKind,
    /// Primary key values joined with ','; "*" for predicate deletes
    pub key: String,
    /// The row as written, when the repository had it
    pub changed: Option<serde_json::Value>,
    pub rows: u64,
}

impl ChangeEntry {
    pub(crate) fn new<E: EntityTrait>(kind: ChangeKind, key: String) -> Self {
        Self {
            table: E::default().table_name().to_string(),
            kind,
            key,
            changed: None,
            rows: 1,
        }
    }

    pub(crate) fn changed(mut self, changed: Option<serde_json::Value>) -> Self {
        self.changed = changed;
        self
    }

    pub(crate) fn rows(mut self, rows: u64) -> Self {
        self.rows = rows;
        self
    }
}

/// Entries recorded since the last save or rollback.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    entries: Mutex<Vec<ChangeEntry>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChangeEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, entry: ChangeEntry) {
        log::trace!("Tracking {} {} [{}]", entry.kind.as_str(), entry.table, entry.key);
        self.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<ChangeEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Rows touched by all recorded entries.
    pub fn rows(&self) -> u64 {
        self.lock().iter().map(|entry| entry.rows).sum()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Primary key of an active model as text. Unset key columns render empty.
pub(crate) fn key_of<A: ActiveModelTrait>(model: &A) -> String {
    <<A::Entity as EntityTrait>::PrimaryKey as Iterable>::iter()
        .map(|key| {
            model
                .get(key.into_column())
                .into_value()
                .map(|value| value_to_string(&value))
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Columns of an active model that hold a value, as a JSON object.
pub(crate) fn set_values_of<A: ActiveModelTrait>(model: &A) -> serde_json::Value {
    let mut values = serde_json::Map::new();
    for column in <<A::Entity as EntityTrait>::Column as Iterable>::iter() {
        if let ActiveValue::Set(value) | ActiveValue::Unchanged(value) = model.get(column) {
            values.insert(column.as_str().to_string(), value_to_json(&value));
        }
    }
    serde_json::Value::Object(values)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::Bool(Some(v)) => Json::from(*v),
        Value::TinyInt(Some(v)) => Json::from(*v),
        Value::SmallInt(Some(v)) => Json::from(*v),
        Value::Int(Some(v)) => Json::from(*v),
        Value::BigInt(Some(v)) => Json::from(*v),
        Value::TinyUnsigned(Some(v)) => Json::from(*v),
        Value::SmallUnsigned(Some(v)) => Json::from(*v),
        Value::Unsigned(Some(v)) => Json::from(*v),
        Value::BigUnsigned(Some(v)) => Json::from(*v),
        Value::Float(Some(v)) => Json::from(*v),
        Value::Double(Some(v)) => Json::from(*v),
        Value::String(Some(v)) => Json::from(v.as_str()),
        Value::Char(Some(v)) => Json::from(v.to_string()),
        Value::Uuid(Some(v)) => Json::from(v.to_string()),
        Value::Bool(None)
        | Value::TinyInt(None)
        | Value::SmallInt(None)
        | Value::Int(None)
        | Value::BigInt(None)
        | Value::TinyUnsigned(None)
        | Value::SmallUnsigned(None)
        | Value::Unsigned(None)
        | Value::BigUnsigned(None)
        | Value::Float(None)
        | Value::Double(None)
        | Value::String(None)
        | Value::Char(None)
        | Value::Bytes(None)
        | Value::Uuid(None) => Json::Null,
        other => Json::from(format!("{:?}", other)),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Bool(Some(v)) => v.to_string(),
        Value::TinyInt(Some(v)) => v.to_string(),
        Value::SmallInt(Some(v)) => v.to_string(),
        Value::Int(Some(v)) => v.to_string(),
        Value::BigInt(Some(v)) => v.to_string(),
        Value::TinyUnsigned(Some(v)) => v.to_string(),
        Value::SmallUnsigned(Some(v)) => v.to_string(),
        Value::Unsigned(Some(v)) => v.to_string(),
        Value::BigUnsigned(Some(v)) => v.to_string(),
        Value::String(Some(v)) => v.to_string(),
        Value::Char(Some(v)) => v.to_string(),
        Value::Uuid(Some(v)) => v.to_string(),
        other => format!("{:?}", other),
    }
}
