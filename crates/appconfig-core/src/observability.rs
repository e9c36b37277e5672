use serde::{Deserialize, Serialize};

use crate::domain::{Application, ApplicationStatus};

/// Snapshot of how many applications sit in each status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationCounts {
    pub total: usize,
    pub active: usize,
    pub deprecated: usize,
    pub inactive: usize,
}

impl ApplicationCounts {
    pub fn tally<'a>(apps: impl IntoIterator<Item = &'a Application>) -> Self {
        let mut counts = ApplicationCounts::default();
        for app in apps {
            counts.total += 1;
            match app.status {
                ApplicationStatus::Active => counts.active += 1,
                ApplicationStatus::Deprecated => counts.deprecated += 1,
                ApplicationStatus::Inactive => counts.inactive += 1,
            }
        }
        counts
    }
}
