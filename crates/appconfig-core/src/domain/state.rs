//! State - Application / Command のライフサイクル状態
//!
//! No transition graph is enforced: `update` may move any status to any
//! other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an Application.
///
/// Serialized as SCREAMING_SNAKE_CASE (ACTIVE / DEPRECATED / INACTIVE).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    /// Ready to be referenced by new Commands.
    Active,

    /// Still usable but scheduled for removal.
    Deprecated,

    /// Not usable.
    #[default]
    Inactive,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::Active,
        ApplicationStatus::Deprecated,
        ApplicationStatus::Inactive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Active => "ACTIVE",
            ApplicationStatus::Deprecated => "DEPRECATED",
            ApplicationStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status name is not one of the known states.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}', expected one of ACTIVE, DEPRECATED, INACTIVE")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Lifecycle status of a Command, as reported by the Command subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandStatus {
    Active,
    Deprecated,
    #[default]
    Inactive,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::upper("ACTIVE", ApplicationStatus::Active)]
    #[case::lower("deprecated", ApplicationStatus::Deprecated)]
    #[case::mixed_with_spaces(" Inactive ", ApplicationStatus::Inactive)]
    fn parses_status_names(#[case] input: &str, #[case] expected: ApplicationStatus) {
        assert_eq!(input.parse::<ApplicationStatus>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_status() {
        let err = "RETIRED".parse::<ApplicationStatus>().unwrap_err();
        assert_eq!(err, UnknownStatus("RETIRED".to_string()));
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ApplicationStatus::Deprecated).unwrap();
        assert_eq!(json, "\"DEPRECATED\"");
    }

    #[test]
    fn default_is_inactive() {
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::Inactive);
    }
}
