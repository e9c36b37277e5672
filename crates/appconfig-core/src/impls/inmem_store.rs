//! InMemoryApplicationStore - 開発用・テスト用の Entity Store
//!
//! Not durable. Useful for tests, the CLI and as a reference for what a real
//! store has to guarantee.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{Application, ApplicationFilter, ApplicationId, AttributeFamily};
use crate::ports::{ApplicationStore, StoreError};

/// A stored record plus its insertion sequence (creation order).
#[derive(Debug, Clone)]
struct StoredApplication {
    seq: u64,
    app: Application,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    /// All records (single source of truth).
    records: HashMap<ApplicationId, StoredApplication>,

    /// Next insertion sequence to assign.
    next_seq: u64,
}

impl InMemoryStoreState {
    fn in_creation_order(&self, filter: Option<&ApplicationFilter>) -> Vec<Application> {
        let mut matched: Vec<&StoredApplication> = self
            .records
            .values()
            .filter(|stored| filter.is_none_or(|f| f.matches(&stored.app)))
            .collect();
        matched.sort_by_key(|stored| stored.seq);
        matched.into_iter().map(|stored| stored.app.clone()).collect()
    }
}

/// In-memory Entity Store.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryApplicationStore {
    state: Arc<RwLock<InMemoryStoreState>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    /// (or recover, with `false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn get(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.records.get(id).map(|stored| stored.app.clone()))
    }

    async fn insert(&self, mut app: Application) -> Result<Application, StoreError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if state.records.contains_key(&app.id) {
            return Err(StoreError::Duplicate(app.id));
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        app.revision = 1;
        state.records.insert(
            app.id.clone(),
            StoredApplication {
                seq,
                app: app.clone(),
            },
        );
        Ok(app)
    }

    async fn replace(&self, mut app: Application) -> Result<Application, StoreError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let Some(stored) = state.records.get_mut(&app.id) else {
            return Err(StoreError::NotFound(app.id));
        };
        if stored.app.revision != app.revision {
            return Err(StoreError::RevisionMismatch {
                id: app.id,
                expected: app.revision,
                actual: stored.app.revision,
            });
        }

        // created is owned by the store once the record exists
        app.created = stored.app.created;
        app.revision = stored.app.revision + 1;
        stored.app = app.clone();
        Ok(app)
    }

    async fn write_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
        values: BTreeSet<String>,
        updated: DateTime<Utc>,
    ) -> Result<BTreeSet<String>, StoreError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let Some(stored) = state.records.get_mut(id) else {
            return Err(StoreError::NotFound(id.clone()));
        };

        *family.of_mut(&mut stored.app) = values;
        stored.app.updated = updated;
        stored.app.revision += 1;
        Ok(family.of(&stored.app).clone())
    }

    async fn remove(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        Ok(state.records.remove(id).map(|stored| stored.app))
    }

    async fn remove_all(&self) -> Result<Vec<Application>, StoreError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let removed = state.in_creation_order(None);
        state.records.clear();
        Ok(removed)
    }

    async fn scan(&self, filter: &ApplicationFilter) -> Result<Vec<Application>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.in_creation_order(Some(filter)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApplicationQuery, ApplicationSpec, ApplicationStatus};

    fn record(id: &str) -> Application {
        let spec = ApplicationSpec::new(id, "tgianos").with_tags(["prod"]);
        Application::from_spec(ApplicationId::new(id), spec, Utc::now())
    }

    #[tokio::test]
    async fn insert_sets_first_revision_and_rejects_duplicates() {
        let store = InMemoryApplicationStore::new();

        let stored = store.insert(record("spark")).await.unwrap();
        assert_eq!(stored.revision, 1);

        let err = store.insert(record("spark")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(id) if id.as_str() == "spark"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn replace_checks_revision() {
        let store = InMemoryApplicationStore::new();
        let stored = store.insert(record("spark")).await.unwrap();

        let mut first = stored.clone();
        first.status = ApplicationStatus::Active;
        let replaced = store.replace(first).await.unwrap();
        assert_eq!(replaced.revision, 2);

        // stale copy still carries revision 1
        let err = store.replace(stored).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::RevisionMismatch { expected: 1, actual: 2, .. }
        ));
    }

    #[tokio::test]
    async fn replace_of_missing_record_is_not_found() {
        let store = InMemoryApplicationStore::new();
        let err = store.replace(record("ghost")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn write_attribute_touches_only_one_family() {
        let store = InMemoryApplicationStore::new();
        store.insert(record("spark")).await.unwrap();

        let later = Utc::now() + chrono::Duration::seconds(5);
        let jars: BTreeSet<String> = ["a.jar".to_string()].into();
        let written = store
            .write_attribute(&ApplicationId::new("spark"), AttributeFamily::Jars, jars.clone(), later)
            .await
            .unwrap();
        assert_eq!(written, jars);

        let app = store.get(&ApplicationId::new("spark")).await.unwrap().unwrap();
        assert_eq!(app.jars, jars);
        assert!(app.tags.contains("prod"));
        assert_eq!(app.updated, later);
        assert_eq!(app.revision, 2);
    }

    #[tokio::test]
    async fn scan_and_remove_all_keep_creation_order() {
        let store = InMemoryApplicationStore::new();
        for id in ["c", "a", "b"] {
            store.insert(record(id)).await.unwrap();
        }

        let filter = ApplicationQuery::new().tags(["prod"]).filter();
        let scanned: Vec<String> = store
            .scan(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|app| app.id.into_string())
            .collect();
        assert_eq!(scanned, ["c", "a", "b"]);

        let removed = store.remove_all().await.unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0].id.as_str(), "c");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = InMemoryApplicationStore::new();
        store.set_unavailable(true);

        let err = store.get(&ApplicationId::new("spark")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        store.set_unavailable(false);
        assert!(store.get(&ApplicationId::new("spark")).await.unwrap().is_none());
    }
}
