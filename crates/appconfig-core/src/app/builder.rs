//! ServiceBuilder - サービスの構築とワイヤリング
//!
//! Fail-fast: missing ports or a bad listing policy are reported by
//! `build()`, not on the first request.

use std::sync::Arc;

use crate::app::locks::KeyedLocks;
use crate::app::service::ApplicationService;
use crate::config::{ConfigError, ConfigLoader, ListingConfig, ServiceConfig};
use crate::ports::{ApplicationStore, Clock, CommandCatalog, IdGenerator, SystemClock, UlidGenerator};

/// ServiceBuilder は ApplicationService を構築
///
/// # 使用例
/// ```ignore
/// let service = ServiceBuilder::new()
///     .store(InMemoryApplicationStore::new())
///     .commands(InMemoryCommandCatalog::new())
///     .config(&config)
///     .build()?;
/// ```
pub struct ServiceBuilder {
    store: Option<Arc<dyn ApplicationStore>>,
    commands: Option<Arc<dyn CommandCatalog>>,
    clock: Arc<dyn Clock>,
    ids: Option<Arc<dyn IdGenerator>>,
    listing: ListingConfig,
}

/// BuildError はサービス構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no application store configured")]
    MissingStore,

    #[error("no command catalog configured")]
    MissingCommandCatalog,

    #[error("invalid listing configuration")]
    InvalidConfig(#[from] ConfigError),
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            commands: None,
            clock: Arc::new(SystemClock),
            ids: None,
            listing: ListingConfig::default(),
        }
    }

    pub fn store(mut self, store: impl ApplicationStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn shared_store(mut self, store: Arc<dyn ApplicationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn commands(mut self, commands: impl CommandCatalog + 'static) -> Self {
        self.commands = Some(Arc::new(commands));
        self
    }

    pub fn shared_commands(mut self, commands: Arc<dyn CommandCatalog>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Defaults to a `UlidGenerator` over the configured clock.
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn config(mut self, config: &ServiceConfig) -> Self {
        self.listing = config.listing.clone();
        self
    }

    pub fn build(self) -> Result<ApplicationService, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let commands = self.commands.ok_or(BuildError::MissingCommandCatalog)?;
        ConfigLoader::validate_listing(&self.listing)?;

        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&self.clock))));

        Ok(ApplicationService {
            store,
            commands,
            clock: self.clock,
            ids,
            listing: self.listing,
            locks: KeyedLocks::new(),
        })
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryApplicationStore, InMemoryCommandCatalog};

    #[test]
    fn test_build_success() {
        let service = ServiceBuilder::new()
            .store(InMemoryApplicationStore::new())
            .commands(InMemoryCommandCatalog::new())
            .build();
        assert!(service.is_ok());
    }

    #[test]
    fn test_build_missing_store() {
        let service = ServiceBuilder::new()
            .commands(InMemoryCommandCatalog::new())
            .build();
        assert!(matches!(service, Err(BuildError::MissingStore)));
    }

    #[test]
    fn test_build_missing_command_catalog() {
        let service = ServiceBuilder::new()
            .store(InMemoryApplicationStore::new())
            .build();
        assert!(matches!(service, Err(BuildError::MissingCommandCatalog)));
    }

    #[test]
    fn test_build_rejects_invalid_listing() {
        let mut config = ServiceConfig::default();
        config.listing.default_limit = 0;

        let service = ServiceBuilder::new()
            .store(InMemoryApplicationStore::new())
            .commands(InMemoryCommandCatalog::new())
            .config(&config)
            .build();
        assert!(matches!(
            service,
            Err(BuildError::InvalidConfig(ConfigError::InvalidDefaultLimit(0)))
        ));
    }
}
