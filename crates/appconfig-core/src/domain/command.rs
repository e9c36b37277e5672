//! Read-only view of a Command from the Command subsystem.
//!
//! Commands own the relation to Applications; an Application never stores
//! the ids of the Commands that use it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ids::{ApplicationId, CommandId};
use super::state::CommandStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    pub name: String,
    pub user: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub status: CommandStatus,

    /// Applications this command runs with.
    #[serde(default)]
    pub application_ids: BTreeSet<ApplicationId>,
}

impl Command {
    pub fn new(id: impl Into<CommandId>, name: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            user: user.into(),
            version: None,
            status: CommandStatus::default(),
            application_ids: BTreeSet::new(),
        }
    }

    pub fn with_application(mut self, id: impl Into<ApplicationId>) -> Self {
        self.application_ids.insert(id.into());
        self
    }

    pub fn references(&self, application_id: &ApplicationId) -> bool {
        self.application_ids.contains(application_id)
    }
}
