//! Set-valued attribute families of an Application.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::application::Application;

/// One of the three string-set attributes carried by an Application.
///
/// Set operations (add / replace / clear / discard) are written once and
/// parameterized by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeFamily {
    Configs,
    Jars,
    Tags,
}

impl AttributeFamily {
    /// Fixed acquisition order for locks that span every family.
    pub const ALL: [AttributeFamily; 3] = [
        AttributeFamily::Configs,
        AttributeFamily::Jars,
        AttributeFamily::Tags,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttributeFamily::Configs => "configs",
            AttributeFamily::Jars => "jars",
            AttributeFamily::Tags => "tags",
        }
    }

    /// Singular noun used in error messages ("config", "jar", "tag").
    pub fn item_name(self) -> &'static str {
        match self {
            AttributeFamily::Configs => "config",
            AttributeFamily::Jars => "jar",
            AttributeFamily::Tags => "tag",
        }
    }

    pub fn of(self, app: &Application) -> &BTreeSet<String> {
        match self {
            AttributeFamily::Configs => &app.configs,
            AttributeFamily::Jars => &app.jars,
            AttributeFamily::Tags => &app.tags,
        }
    }

    pub fn of_mut(self, app: &mut Application) -> &mut BTreeSet<String> {
        match self {
            AttributeFamily::Configs => &mut app.configs,
            AttributeFamily::Jars => &mut app.jars,
            AttributeFamily::Tags => &mut app.tags,
        }
    }
}

impl fmt::Display for AttributeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApplicationId, ApplicationSpec};
    use chrono::Utc;

    #[test]
    fn family_accessors_address_distinct_sets() {
        let spec = ApplicationSpec::new("spark", "tgianos")
            .with_configs(["s3://conf/spark-defaults.conf"])
            .with_jars(["s3://jars/spark.jar"])
            .with_tags(["prod"]);
        let mut app = Application::from_spec(ApplicationId::new("spark"), spec, Utc::now());

        assert!(AttributeFamily::Configs.of(&app).contains("s3://conf/spark-defaults.conf"));
        assert!(AttributeFamily::Jars.of(&app).contains("s3://jars/spark.jar"));
        assert!(AttributeFamily::Tags.of(&app).contains("prod"));

        AttributeFamily::Tags.of_mut(&mut app).clear();
        assert!(app.tags.is_empty());
        assert_eq!(app.configs.len(), 1);
    }
}
