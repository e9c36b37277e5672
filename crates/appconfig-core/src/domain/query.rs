//! Listing criteria and the store-side predicate built from them.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::application::Application;
use super::state::ApplicationStatus;

/// Criteria for `list_applications`.
///
/// Every filter is optional; `None`, `""` and empty sets place no constraint.
/// `limit == 0` means "use the configured default page size".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationQuery {
    pub name: Option<String>,
    pub user: Option<String>,
    pub statuses: BTreeSet<ApplicationStatus>,
    pub tags: BTreeSet<String>,
    pub page: usize,
    pub limit: usize,
    pub descending: bool,
    pub order_bys: Vec<String>,
}

impl ApplicationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = ApplicationStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn page(mut self, page: usize, limit: usize) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_bys.push(field.into());
        self
    }

    /// The filtering half of the query, handed to the store.
    pub fn filter(&self) -> ApplicationFilter {
        ApplicationFilter {
            name: non_blank(self.name.as_deref()).map(NamePattern::new),
            user: non_blank(self.user.as_deref()).map(NamePattern::new),
            statuses: self.statuses.clone(),
            tags: self.tags.clone(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Predicate over Applications. Stores evaluate it during a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub name: Option<NamePattern>,
    pub user: Option<NamePattern>,
    /// OR: status must be one of these.
    pub statuses: BTreeSet<ApplicationStatus>,
    /// AND: every one of these tags must be present.
    pub tags: BTreeSet<String>,
}

impl ApplicationFilter {
    pub fn matches(&self, app: &Application) -> bool {
        if let Some(pattern) = &self.name
            && !pattern.matches(&app.name)
        {
            return false;
        }
        if let Some(pattern) = &self.user
            && !pattern.matches(&app.user)
        {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&app.status) {
            return false;
        }
        self.tags.is_subset(&app.tags)
    }
}

/// Exact string, or a LIKE-style pattern when it contains `%` or `_`.
///
/// `%` matches any run of characters (including none), `_` exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    raw: String,
    wildcard: bool,
}

impl NamePattern {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            wildcard: raw.contains(['%', '_']),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        if !self.wildcard {
            return self.raw == value;
        }
        let pattern: Vec<char> = self.raw.chars().collect();
        let text: Vec<char> = value.chars().collect();
        like_match(&pattern, &text)
    }
}

// Greedy matcher with single backtrack point on the last `%`.
fn like_match(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p).copied() {
            Some('%') => {
                star = Some((p, t));
                p += 1;
            }
            Some('_') => {
                p += 1;
                t += 1;
            }
            Some(c) if c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    star = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}

/// Field an Application listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    Name,
    User,
    Version,
    Status,
    Created,
    Updated,
}

impl SortField {
    pub fn compare(self, a: &Application, b: &Application) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::User => a.user.cmp(&b.user),
            SortField::Version => a.version.cmp(&b.version),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::Created => a.created.cmp(&b.created),
            SortField::Updated => a.updated.cmp(&b.updated),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::User => "user",
            SortField::Version => "version",
            SortField::Status => "status",
            SortField::Created => "created",
            SortField::Updated => "updated",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot order applications by '{0}'")]
pub struct UnknownSortField(pub String);

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim().to_ascii_lowercase().as_str() {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "user" => SortField::User,
            "version" => SortField::Version,
            "status" => SortField::Status,
            "created" | "createdat" | "created_at" => SortField::Created,
            "updated" | "updatedat" | "updated_at" => SortField::Updated,
            _ => return Err(UnknownSortField(s.to_string())),
        };
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApplicationId, ApplicationSpec};
    use chrono::Utc;
    use rstest::rstest;

    fn app(name: &str, status: ApplicationStatus, tags: &[&str]) -> Application {
        let spec = ApplicationSpec::new(name, "tgianos")
            .with_status(status)
            .with_tags(tags.iter().copied());
        Application::from_spec(ApplicationId::new(name), spec, Utc::now())
    }

    #[rstest]
    #[case::exact("spark", "spark", true)]
    #[case::exact_miss("spark", "sparkle", false)]
    #[case::prefix("spark%", "sparkle", true)]
    #[case::suffix("%doop", "hadoop", true)]
    #[case::infix("%a%o%", "hadoop", true)]
    #[case::single_char("p_g", "pig", true)]
    #[case::single_char_miss("p_g", "pg", false)]
    #[case::only_percent("%", "", true)]
    #[case::backtrack("%ab", "aab", true)]
    #[case::trailing_literal("a%c", "abcd", false)]
    fn name_patterns(#[case] pattern: &str, #[case] value: &str, #[case] expected: bool) {
        assert_eq!(NamePattern::new(pattern).matches(value), expected);
    }

    #[test]
    fn tags_are_anded() {
        let both = app("a", ApplicationStatus::Active, &["prod", "spark"]);
        let one = app("b", ApplicationStatus::Active, &["prod"]);
        let filter = ApplicationQuery::new().tags(["prod", "spark"]).filter();

        assert!(filter.matches(&both));
        assert!(!filter.matches(&one));
    }

    #[test]
    fn statuses_are_ored() {
        let active = app("a", ApplicationStatus::Active, &[]);
        let inactive = app("b", ApplicationStatus::Inactive, &[]);
        let deprecated = app("c", ApplicationStatus::Deprecated, &[]);
        let filter = ApplicationQuery::new()
            .statuses([ApplicationStatus::Active, ApplicationStatus::Inactive])
            .filter();

        assert!(filter.matches(&active));
        assert!(filter.matches(&inactive));
        assert!(!filter.matches(&deprecated));
    }

    #[test]
    fn blank_criteria_do_not_constrain() {
        let anything = app("a", ApplicationStatus::Deprecated, &["x"]);
        let filter = ApplicationQuery::new().name("  ").user("").filter();

        assert_eq!(filter, ApplicationFilter::default());
        assert!(filter.matches(&anything));
    }

    #[rstest]
    #[case("name", SortField::Name)]
    #[case("UPDATED", SortField::Updated)]
    #[case("createdAt", SortField::Created)]
    #[case("updated_at", SortField::Updated)]
    fn parses_sort_fields(#[case] input: &str, #[case] expected: SortField) {
        assert_eq!(input.parse::<SortField>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_sort_field() {
        assert!("configs".parse::<SortField>().is_err());
    }
}
