//! ApplicationStore port - Application レコードの正本（source of truth）
//!
//! The store is an external collaborator: durability, indexing and
//! transactions are its business. The service relies only on the contract
//! below.
//!
//! # 設計原則
//! - Every call is atomic on its own.
//! - Each attribute family is written on its own (`write_attribute`), so
//!   writes to different families of one application never clobber each other.
//! - `replace` is optimistic: the caller passes the revision it read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::domain::{Application, ApplicationFilter, ApplicationId, AttributeFamily, ServiceError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("application '{0}' already exists")]
    Duplicate(ApplicationId),

    #[error("application '{0}' does not exist")]
    NotFound(ApplicationId),

    #[error("application '{id}' is at revision {actual}, write expected {expected}")]
    RevisionMismatch {
        id: ApplicationId,
        expected: u64,
        actual: u64,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        let mapped = match &err {
            StoreError::Duplicate(id) => {
                ServiceError::conflict(format!("an application with id '{id}' already exists"))
            }
            StoreError::NotFound(id) => ServiceError::not_found(id),
            StoreError::RevisionMismatch { id, .. } => {
                ServiceError::conflict(format!("application '{id}' was modified concurrently"))
            }
            StoreError::Unavailable(_) => ServiceError::store("entity store failed"),
        };
        mapped.with_source(err)
    }
}

/// ApplicationStore は Application の保存先
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn get(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError>;

    /// Insert a new record. Fails with `Duplicate` if the id is taken.
    /// Returns the stored record (revision set to 1).
    async fn insert(&self, app: Application) -> Result<Application, StoreError>;

    /// Replace every field of an existing record. `app.revision` must be the
    /// stored revision. Returns the stored record with its new revision.
    async fn replace(&self, app: Application) -> Result<Application, StoreError>;

    /// Overwrite one attribute family and stamp `updated`. Returns the stored set.
    async fn write_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
        values: BTreeSet<String>,
        updated: DateTime<Utc>,
    ) -> Result<BTreeSet<String>, StoreError>;

    /// Remove one record, returning it if it existed.
    async fn remove(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError>;

    /// Remove every record, returning them in creation order.
    async fn remove_all(&self) -> Result<Vec<Application>, StoreError>;

    /// Every record matching `filter`, in creation order.
    async fn scan(&self, filter: &ApplicationFilter) -> Result<Vec<Application>, StoreError>;
}
