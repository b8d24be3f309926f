//! Generic keyed storage for directory entities.
//!
//! [`Repository`] is the seam the service layer talks to;
//! [`MemoryRepository`] is the in-process implementation used by the
//! server. [`Directory`] bundles the employee and manager repositories.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Employee, Manager};
use crate::config::model::Config;
use crate::error::ServiceError;

pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

impl Entity for Employee {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Entity for Manager {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

// async_trait is required here because repositories are shared as Arc<dyn Repository<T>>.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn all(&self) -> Vec<T>;
    async fn get(&self, id: i64) -> Option<T>;
    /// Store a new entity, assigning the next free id. Fails once the id
    /// space is exhausted.
    async fn insert(&self, entity: T) -> Result<T, ServiceError>;
    /// Replace an existing entity. Returns `false` if the id is unknown.
    async fn update(&self, entity: T) -> bool;
    async fn remove(&self, id: i64) -> Option<T>;
    async fn count(&self) -> usize;
}

pub struct MemoryRepository<T> {
    rows: RwLock<BTreeMap<i64, T>>,
    /// Highest id handed out or seeded so far.
    last_id: AtomicI64,
}

impl<T: Entity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::with_rows(Vec::new())
    }
}

impl<T: Entity> MemoryRepository<T> {
    /// Seed with existing rows; new ids continue after the highest seeded id.
    #[must_use]
    pub fn with_rows(rows: Vec<T>) -> Self {
        let rows: BTreeMap<i64, T> = rows.into_iter().map(|row| (row.id(), row)).collect();
        let last_id = rows.keys().next_back().copied().unwrap_or(0).max(0);
        Self {
            rows: RwLock::new(rows),
            last_id: AtomicI64::new(last_id),
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn all(&self) -> Vec<T> {
        self.rows.read().await.values().cloned().collect()
    }

    async fn get(&self, id: i64) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    async fn insert(&self, mut entity: T) -> Result<T, ServiceError> {
        let last = self
            .last_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1))
            .map_err(|last| ServiceError::internal(format!("no id left after {last}")))?;
        let id = last + 1;
        entity.set_id(id);
        self.rows.write().await.insert(id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> bool {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&entity.id()) {
            Some(row) => {
                *row = entity;
                true
            }
            None => false,
        }
    }

    async fn remove(&self, id: i64) -> Option<T> {
        self.rows.write().await.remove(&id)
    }

    async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[derive(Clone)]
pub struct Directory {
    pub employees: Arc<dyn Repository<Employee>>,
    pub managers: Arc<dyn Repository<Manager>>,
}

impl Directory {
    #[must_use]
    pub fn in_memory(config: &Config) -> Self {
        Self {
            employees: Arc::new(MemoryRepository::with_rows(config.employees.clone())),
            managers: Arc::new(MemoryRepository::with_rows(config.managers.clone())),
        }
    }
}
