//! In-process record storage.
//!
//! A [`Table`] keeps rows in id order behind an async `RwLock` and hands out
//! ids from a monotonic sequence. Ids are never reused, even after a row is
//! removed.

use std::collections::BTreeMap;

use thiserror::Error;
use tokio::sync::RwLock;

/// Row identifier assigned by a [`Table`].
pub type RowId = i64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("table is full ({max_rows} rows)")]
    CapacityExceeded { max_rows: usize },
}

struct Rows<T> {
    next_id: RowId,
    rows: BTreeMap<RowId, T>,
}

/// Auto-incrementing table of cloneable records.
pub struct Table<T> {
    name: &'static str,
    max_rows: Option<usize>,
    inner: RwLock<Rows<T>>,
}

impl<T: Clone> Table<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            max_rows: None,
            inner: RwLock::new(Rows {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    /// Cap the number of rows the table accepts.
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Allocate the next id and store the row built from it.
    pub async fn insert_with<F>(&self, build: F) -> Result<T, StoreError>
    where
        F: FnOnce(RowId) -> T,
    {
        let mut inner = self.inner.write().await;

        if let Some(max_rows) = self.max_rows {
            if inner.rows.len() >= max_rows {
                tracing::warn!(table = self.name, max_rows, "insert rejected, table full");
                return Err(StoreError::CapacityExceeded { max_rows });
            }
        }

        let id = inner.next_id;
        inner.next_id += 1;

        let row = build(id);
        inner.rows.insert(id, row.clone());
        tracing::debug!(table = self.name, id, "row inserted");

        Ok(row)
    }

    pub async fn get(&self, id: RowId) -> Option<T> {
        self.inner.read().await.rows.get(&id).cloned()
    }

    /// All rows in ascending id order.
    pub async fn all(&self) -> Vec<T> {
        self.inner.read().await.rows.values().cloned().collect()
    }

    /// First row, by id, matching the predicate.
    pub async fn find<P>(&self, predicate: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.inner
            .read()
            .await
            .rows
            .values()
            .find(|&row| predicate(row))
            .cloned()
    }

    /// Apply `change` to the row in place and return the new value.
    pub async fn update<F>(&self, id: RowId, change: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let mut inner = self.inner.write().await;
        let row = inner.rows.get_mut(&id)?;
        change(row);
        tracing::debug!(table = self.name, id, "row updated");
        Some(row.clone())
    }

    /// Returns true when a row was removed.
    pub async fn remove(&self, id: RowId) -> bool {
        let removed = self.inner.write().await.rows.remove(&id).is_some();
        if removed {
            tracing::debug!(table = self.name, id, "row removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
