//! ApplicationService - Application 設定サービスの本体
//!
//! Orchestrates validation, set algebra and store calls.
//!
//! # ロック
//! - Set mutations hold the lock of `(id, family)` for their whole
//!   read-modify-write, so concurrent unions on one family all land.
//! - `update` / `delete` hold the locks of every family of the id, taken in
//!   `AttributeFamily::ALL` order.
//! - Different ids, or different families of one id, never wait on each other.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::app::builder::ServiceBuilder;
use crate::app::listing::ListingPlan;
use crate::app::locks::KeyedLocks;
use crate::app::validator::Validator;
use crate::config::ListingConfig;
use crate::domain::{
    Application, ApplicationFilter, ApplicationId, ApplicationQuery, ApplicationSpec,
    AttributeFamily, Command, ServiceError,
};
use crate::observability::ApplicationCounts;
use crate::ports::{ApplicationStore, Clock, CommandCatalog, IdGenerator};

/// The public contract of the Application configuration service.
///
/// Every method is safe to call concurrently from many tasks, for the same
/// id or for different ones.
#[async_trait]
pub trait ApplicationConfigService: Send + Sync {
    /// Persist a new application. Generates an id when the spec has none.
    async fn create_application(&self, spec: ApplicationSpec) -> Result<Application, ServiceError>;

    async fn get_application(&self, id: &ApplicationId) -> Result<Application, ServiceError>;

    /// Filter, sort and page. No matches is an empty vector, not an error.
    async fn list_applications(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<Application>, ServiceError>;

    /// Full-field replace. The id cannot change; `created` is kept.
    async fn update_application(
        &self,
        id: &ApplicationId,
        spec: ApplicationSpec,
    ) -> Result<Application, ServiceError>;

    /// Remove and return one application. Referencing commands are left alone.
    async fn delete_application(&self, id: &ApplicationId) -> Result<Application, ServiceError>;

    /// Remove every application, returned in creation order.
    async fn delete_all_applications(&self) -> Result<Vec<Application>, ServiceError>;

    /// `F' = F ∪ items`; returns `F'`.
    async fn add_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
        items: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ServiceError>;

    async fn get_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
    ) -> Result<BTreeSet<String>, ServiceError>;

    /// `F' = items`; returns `F'`.
    async fn replace_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
        items: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ServiceError>;

    /// `F' = ∅`; returns `F'`.
    async fn clear_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
    ) -> Result<BTreeSet<String>, ServiceError>;

    /// `F' = F \ {item}`; returns `F'`. Discarding an absent item is a no-op.
    async fn discard_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
        item: &str,
    ) -> Result<BTreeSet<String>, ServiceError>;

    /// Commands that reference `id`, one per command id, ordered by command id.
    async fn commands_for_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Vec<Command>, ServiceError>;

    async fn status_counts(&self) -> Result<ApplicationCounts, ServiceError>;

    async fn add_configs(
        &self,
        id: &ApplicationId,
        configs: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ServiceError> {
        self.add_attribute(id, AttributeFamily::Configs, configs).await
    }

    async fn get_configs(&self, id: &ApplicationId) -> Result<BTreeSet<String>, ServiceError> {
        self.get_attribute(id, AttributeFamily::Configs).await
    }

    async fn replace_configs(
        &self,
        id: &ApplicationId,
        configs: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ServiceError> {
        self.replace_attribute(id, AttributeFamily::Configs, configs).await
    }

    async fn clear_configs(&self, id: &ApplicationId) -> Result<BTreeSet<String>, ServiceError> {
        self.clear_attribute(id, AttributeFamily::Configs).await
    }

    async fn remove_config(
        &self,
        id: &ApplicationId,
        config: &str,
    ) -> Result<BTreeSet<String>, ServiceError> {
        self.discard_attribute(id, AttributeFamily::Configs, config).await
    }

    async fn add_jars(
        &self,
        id: &ApplicationId,
        jars: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ServiceError> {
        self.add_attribute(id, AttributeFamily::Jars, jars).await
    }

    async fn get_jars(&self, id: &ApplicationId) -> Result<BTreeSet<String>, ServiceError> {
        self.get_attribute(id, AttributeFamily::Jars).await
    }

    async fn replace_jars(
        &self,
        id: &ApplicationId,
        jars: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ServiceError> {
        self.replace_attribute(id, AttributeFamily::Jars, jars).await
    }

    async fn clear_jars(&self, id: &ApplicationId) -> Result<BTreeSet<String>, ServiceError> {
        self.clear_attribute(id, AttributeFamily::Jars).await
    }

    async fn remove_jar(
        &self,
        id: &ApplicationId,
        jar: &str,
    ) -> Result<BTreeSet<String>, ServiceError> {
        self.discard_attribute(id, AttributeFamily::Jars, jar).await
    }

    async fn add_tags(
        &self,
        id: &ApplicationId,
        tags: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ServiceError> {
        self.add_attribute(id, AttributeFamily::Tags, tags).await
    }

    async fn get_tags(&self, id: &ApplicationId) -> Result<BTreeSet<String>, ServiceError> {
        self.get_attribute(id, AttributeFamily::Tags).await
    }

    async fn replace_tags(
        &self,
        id: &ApplicationId,
        tags: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ServiceError> {
        self.replace_attribute(id, AttributeFamily::Tags, tags).await
    }

    async fn clear_tags(&self, id: &ApplicationId) -> Result<BTreeSet<String>, ServiceError> {
        self.clear_attribute(id, AttributeFamily::Tags).await
    }

    async fn remove_tag(
        &self,
        id: &ApplicationId,
        tag: &str,
    ) -> Result<BTreeSet<String>, ServiceError> {
        self.discard_attribute(id, AttributeFamily::Tags, tag).await
    }
}

/// ApplicationService は ports を束ねた唯一の実装
///
/// Built with [`ServiceBuilder`]. Holds no entity data itself; the lock
/// table is its only mutable state.
pub struct ApplicationService {
    pub(crate) store: Arc<dyn ApplicationStore>,
    pub(crate) commands: Arc<dyn CommandCatalog>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) listing: ListingConfig,
    pub(crate) locks: KeyedLocks<(ApplicationId, AttributeFamily)>,
}

impl ApplicationService {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    async fn require(&self, id: &ApplicationId) -> Result<Application, ServiceError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(id))
    }

    /// Read-modify-write of one family under its `(id, family)` lock.
    ///
    /// Skips the store write when `change` leaves the set as it was.
    async fn mutate_attribute<F>(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
        change: F,
    ) -> Result<BTreeSet<String>, ServiceError>
    where
        F: FnOnce(&BTreeSet<String>) -> BTreeSet<String> + Send,
    {
        let _guard = self.locks.lock((id.clone(), family)).await;

        let app = self.require(id).await?;
        let current = family.of(&app);
        let next = change(current);
        if &next == current {
            debug!(%id, %family, "attribute unchanged, no write");
            return Ok(next);
        }

        let stored = self
            .store
            .write_attribute(id, family, next, self.clock.now())
            .await?;
        info!(%id, %family, size = stored.len(), "attribute written");
        Ok(stored)
    }
}

#[async_trait]
impl ApplicationConfigService for ApplicationService {
    #[instrument(skip_all, fields(id = ?spec.id), err(level = "warn"))]
    async fn create_application(&self, spec: ApplicationSpec) -> Result<Application, ServiceError> {
        Validator::spec(&spec)?;

        let id = match &spec.id {
            Some(id) => id.clone(),
            None => self.ids.generate_application_id(),
        };
        let app = Application::from_spec(id, spec, self.clock.now());
        let stored = self.store.insert(app).await?;

        info!(id = %stored.id, name = %stored.name, "application created");
        Ok(stored)
    }

    #[instrument(skip_all, fields(%id), err(level = "warn"))]
    async fn get_application(&self, id: &ApplicationId) -> Result<Application, ServiceError> {
        Validator::id(id)?;
        let app = self.require(id).await?;
        debug!(revision = app.revision, "application read");
        Ok(app)
    }

    #[instrument(skip_all, err(level = "warn"))]
    async fn list_applications(
        &self,
        query: &ApplicationQuery,
    ) -> Result<Vec<Application>, ServiceError> {
        let plan = ListingPlan::new(query, &self.listing)?;
        let matched = self.store.scan(&query.filter()).await?;
        let total = matched.len();
        let page = plan.apply(matched);

        debug!(matched = total, returned = page.len(), "applications listed");
        Ok(page)
    }

    #[instrument(skip_all, fields(%id), err(level = "warn"))]
    async fn update_application(
        &self,
        id: &ApplicationId,
        spec: ApplicationSpec,
    ) -> Result<Application, ServiceError> {
        Validator::update(id, &spec)?;

        let keys = AttributeFamily::ALL.map(|family| (id.clone(), family));
        let _guards = self.locks.lock_all(keys).await;

        let mut app = self.require(id).await?;
        app.apply_spec(spec, self.clock.now());
        let stored = self.store.replace(app).await?;

        info!(revision = stored.revision, "application updated");
        Ok(stored)
    }

    #[instrument(skip_all, fields(%id), err(level = "warn"))]
    async fn delete_application(&self, id: &ApplicationId) -> Result<Application, ServiceError> {
        Validator::id(id)?;

        let keys = AttributeFamily::ALL.map(|family| (id.clone(), family));
        let _guards = self.locks.lock_all(keys).await;

        let removed = self
            .store
            .remove(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(id))?;

        info!("application deleted");
        Ok(removed)
    }

    #[instrument(skip_all, err(level = "warn"))]
    async fn delete_all_applications(&self) -> Result<Vec<Application>, ServiceError> {
        let removed = self.store.remove_all().await?;
        info!(count = removed.len(), "all applications deleted");
        Ok(removed)
    }

    #[instrument(skip_all, fields(%id, %family), err(level = "warn"))]
    async fn add_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
        items: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ServiceError> {
        Validator::id(id)?;
        Validator::items(family, &items)?;

        self.mutate_attribute(id, family, move |current| {
            let mut next = current.clone();
            next.extend(items);
            next
        })
        .await
    }

    #[instrument(skip_all, fields(%id, %family), err(level = "warn"))]
    async fn get_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
    ) -> Result<BTreeSet<String>, ServiceError> {
        Validator::id(id)?;
        let app = self.require(id).await?;
        Ok(family.of(&app).clone())
    }

    #[instrument(skip_all, fields(%id, %family), err(level = "warn"))]
    async fn replace_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
        items: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ServiceError> {
        Validator::id(id)?;
        Validator::items(family, &items)?;

        self.mutate_attribute(id, family, move |_| items).await
    }

    #[instrument(skip_all, fields(%id, %family), err(level = "warn"))]
    async fn clear_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
    ) -> Result<BTreeSet<String>, ServiceError> {
        Validator::id(id)?;

        self.mutate_attribute(id, family, |_| BTreeSet::new()).await
    }

    #[instrument(skip_all, fields(%id, %family, %item), err(level = "warn"))]
    async fn discard_attribute(
        &self,
        id: &ApplicationId,
        family: AttributeFamily,
        item: &str,
    ) -> Result<BTreeSet<String>, ServiceError> {
        Validator::id(id)?;
        Validator::item(family, item)?;

        self.mutate_attribute(id, family, |current| {
            let mut next = current.clone();
            next.remove(item);
            next
        })
        .await
    }

    #[instrument(skip_all, fields(%id), err(level = "warn"))]
    async fn commands_for_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Vec<Command>, ServiceError> {
        Validator::id(id)?;
        self.require(id).await?;

        let found = self.commands.commands_referencing(id).await?;
        let unique: BTreeMap<_, _> = found
            .into_iter()
            .map(|command| (command.id.clone(), command))
            .collect();

        debug!(count = unique.len(), "commands resolved");
        Ok(unique.into_values().collect())
    }

    #[instrument(skip_all, err(level = "warn"))]
    async fn status_counts(&self) -> Result<ApplicationCounts, ServiceError> {
        let apps = self.store.scan(&ApplicationFilter::default()).await?;
        Ok(ApplicationCounts::tally(&apps))
    }
}
