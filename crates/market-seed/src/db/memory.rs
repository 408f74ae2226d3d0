//! In-process table store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::{TableWriter, UpsertRequest, WriteError};
use crate::records::Row;

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<String, Vec<Row>>,
    next_id: i64,
    upserts: Vec<UpsertRequest>,
    attempts: HashMap<String, usize>,
    fail_at: Option<(String, usize)>,
}

/// Emulates a hosted table store: upserts match on the conflict key and rows
/// without an `id` get one assigned on insert.
///
/// Clones share the same tables, so a test can keep a handle after passing
/// one to the seeder.
#[doc(hidden)]
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `nth` (zero-based) upsert attempt on `table` fail. Attempts
    /// after it go through normally.
    pub fn fail_at(self, table: &str, nth: usize) -> Self {
        self.lock().fail_at = Some((table.to_string(), nth));
        self
    }

    /// Snapshot of all rows in `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock().rows.get(table).cloned().unwrap_or_default()
    }

    /// Every upsert accepted so far, in call order.
    pub fn upserts(&self) -> Vec<UpsertRequest> {
        self.lock().upserts.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A poisoned lock only means another test thread panicked mid-write.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl TableWriter for MemoryWriter {
    async fn upsert(&self, request: &UpsertRequest) -> Result<(), WriteError> {
        let mut tables = self.lock();

        let attempts = tables.attempts.entry(request.table.to_string()).or_default();
        let attempted = *attempts;
        *attempts += 1;
        if let Some((table, nth)) = &tables.fail_at
            && table == request.table
            && *nth == attempted
        {
            return Err(WriteError::Rejected {
                status: 503,
                body: format!("injected failure on {} #{nth}", request.table),
            });
        }
        tables.upserts.push(request.clone());

        let key = request.conflict_key;
        let matched = request.conflict_value().cloned();
        tables.next_id += 1;
        let next_id = tables.next_id;
        let rows = tables.rows.entry(request.table.to_string()).or_default();

        let position = matched
            .as_ref()
            .and_then(|value| rows.iter().position(|row| row.get(key) == Some(value)));

        match position {
            Some(i) => {
                for (column, value) in &request.row {
                    rows[i].insert(column.clone(), value.clone());
                }
            }
            None => {
                let mut row = request.row.clone();
                row.entry("id").or_insert(Value::from(next_id));
                rows.push(row);
            }
        }

        Ok(())
    }

    async fn count_where(
        &self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<u64, WriteError> {
        let tables = self.lock();
        let count = tables
            .rows
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| match row.get(column) {
                        Some(found) => found == value,
                        None => value.is_null(),
                    })
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }
}
