//! InMemoryCommandCatalog - Command サブシステムの代役
//!
//! Holds Command views registered up front (from a seed file or a test) and
//! answers the reverse lookup by scanning them.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ApplicationId, Command, CommandId};
use crate::ports::{CatalogError, CommandCatalog};

#[derive(Debug, Clone, Default)]
pub struct InMemoryCommandCatalog {
    commands: Arc<RwLock<BTreeMap<CommandId, Command>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryCommandCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or overwrite a command.
    pub async fn upsert(&self, command: Command) {
        let mut commands = self.commands.write().await;
        commands.insert(command.id.clone(), command);
    }

    pub async fn remove(&self, id: &CommandId) -> Option<Command> {
        self.commands.write().await.remove(id)
    }

    /// Make lookups fail with `CatalogError::Unavailable` (or recover, with `false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl CommandCatalog for InMemoryCommandCatalog {
    async fn commands_referencing(
        &self,
        id: &ApplicationId,
    ) -> Result<Vec<Command>, CatalogError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable(
                "in-memory catalog switched off".to_string(),
            ));
        }
        let commands = self.commands.read().await;
        Ok(commands
            .values()
            .filter(|command| command.references(id))
            .cloned()
            .collect())
    }
}
