//! Listing - ソートとページング
//!
//! Filtering happens in the store (`ApplicationFilter`); this module orders
//! what comes back and cuts one page out of it.

use std::cmp::Ordering;

use crate::config::ListingConfig;
use crate::domain::{Application, ApplicationQuery, ServiceError, SortField, UnknownSortField};

/// How one `list_applications` call sorts and pages its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPlan {
    /// Sort keys, primary first, duplicates removed.
    pub fields: Vec<SortField>,
    pub descending: bool,
    pub offset: usize,
    pub limit: usize,
}

impl ListingPlan {
    pub fn new(query: &ApplicationQuery, config: &ListingConfig) -> Result<Self, ServiceError> {
        let mut fields = Vec::with_capacity(query.order_bys.len());
        for raw in &query.order_bys {
            let field: SortField = raw
                .parse()
                .map_err(|e: UnknownSortField| ServiceError::validation(e.to_string()))?;
            // first occurrence wins
            if !fields.contains(&field) {
                fields.push(field);
            }
        }

        let limit = config.effective_limit(query.limit);
        Ok(Self {
            fields,
            descending: query.descending,
            offset: query.page.saturating_mul(limit),
            limit,
        })
    }

    /// Sort `apps` (expected in creation order) and return the requested page.
    pub fn apply(&self, mut apps: Vec<Application>) -> Vec<Application> {
        if self.fields.is_empty() {
            if self.descending {
                apps.reverse();
            }
        } else {
            // stable: ties stay in creation order
            apps.sort_by(|a, b| self.compare(a, b));
        }
        apps.into_iter().skip(self.offset).take(self.limit).collect()
    }

    fn compare(&self, a: &Application, b: &Application) -> Ordering {
        for field in &self.fields {
            let ordering = field.compare(a, b);
            let ordering = if self.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}
