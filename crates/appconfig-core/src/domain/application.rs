//! Application record: the persisted entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ids::ApplicationId;
use super::spec::ApplicationSpec;
use super::state::ApplicationStatus;

/// A stored Application.
///
/// Design:
/// - `id` and `created` never change once the record exists.
/// - `revision` belongs to the store; it starts at 1 and moves on every write.
/// - Field changes go through methods so `updated` is never forgotten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub name: String,
    pub user: String,
    pub version: Option<String>,
    pub status: ApplicationStatus,
    pub setup_file: Option<String>,
    pub configs: BTreeSet<String>,
    pub jars: BTreeSet<String>,
    pub tags: BTreeSet<String>,

    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,

    #[serde(default)]
    pub revision: u64,
}

impl Application {
    /// Build a new, not yet stored record. The spec's own id is ignored in
    /// favour of `id`, which the caller has already resolved.
    pub fn from_spec(id: ApplicationId, spec: ApplicationSpec, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: spec.name,
            user: spec.user,
            version: spec.version,
            status: spec.status,
            setup_file: spec.setup_file,
            configs: spec.configs,
            jars: spec.jars,
            tags: spec.tags,
            created: now,
            updated: now,
            revision: 0,
        }
    }

    /// Full-field replace from a spec. Keeps `id`, `created` and `revision`.
    pub fn apply_spec(&mut self, spec: ApplicationSpec, now: DateTime<Utc>) {
        self.name = spec.name;
        self.user = spec.user;
        self.version = spec.version;
        self.status = spec.status;
        self.setup_file = spec.setup_file;
        self.configs = spec.configs;
        self.jars = spec.jars;
        self.tags = spec.tags;
        self.updated = now;
    }

    /// The caller-visible fields as a spec (with the id filled in).
    pub fn to_spec(&self) -> ApplicationSpec {
        ApplicationSpec {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            user: self.user.clone(),
            version: self.version.clone(),
            status: self.status,
            setup_file: self.setup_file.clone(),
            configs: self.configs.clone(),
            jars: self.jars.clone(),
            tags: self.tags.clone(),
        }
    }
}
