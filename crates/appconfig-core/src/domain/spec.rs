//! Input spec for an Application (what a caller supplies on create / update).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ids::ApplicationId;
use super::state::ApplicationStatus;

/// Caller-controlled fields of an Application.
///
/// `id` is optional on create (the service generates one) and, on update,
/// must be absent or equal to the addressed id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSpec {
    #[serde(default)]
    pub id: Option<ApplicationId>,

    pub name: String,

    pub user: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub status: ApplicationStatus,

    /// Environment setup file sourced before a job using this application runs.
    #[serde(default)]
    pub setup_file: Option<String>,

    #[serde(default)]
    pub configs: BTreeSet<String>,

    #[serde(default)]
    pub jars: BTreeSet<String>,

    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl ApplicationSpec {
    pub fn new(name: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            user: user.into(),
            version: None,
            status: ApplicationStatus::default(),
            setup_file: None,
            configs: BTreeSet::new(),
            jars: BTreeSet::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ApplicationId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_setup_file(mut self, path: impl Into<String>) -> Self {
        self.setup_file = Some(path.into());
        self
    }

    pub fn with_configs<I, S>(mut self, configs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configs = configs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_jars<I, S>(mut self, jars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.jars = jars.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_members_collapse() {
        let spec = ApplicationSpec::new("hive", "amsharma").with_tags(["prod", "prod", "hive"]);
        assert_eq!(spec.tags.len(), 2);
    }

    #[test]
    fn optional_fields_default_when_missing() {
        let spec: ApplicationSpec =
            serde_json::from_str(r#"{"name": "pig", "user": "tgianos"}"#).unwrap();

        assert_eq!(spec.id, None);
        assert_eq!(spec.status, ApplicationStatus::Inactive);
        assert!(spec.configs.is_empty());
        assert!(spec.jars.is_empty());
        assert!(spec.tags.is_empty());
    }
}
