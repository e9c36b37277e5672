//! Validator - 変更前のフィールド検証
//!
//! Fail-fast: every check runs before the store is touched, so a rejected
//! request never leaves a partial write behind.

use std::collections::BTreeSet;

use crate::domain::{ApplicationId, ApplicationSpec, AttributeFamily, ServiceError};

pub struct Validator;

impl Validator {
    /// Checks shared by create and update.
    pub fn spec(spec: &ApplicationSpec) -> Result<(), ServiceError> {
        if let Some(id) = &spec.id {
            Self::id(id)?;
        }
        Self::required("name", &spec.name)?;
        Self::required("user", &spec.user)?;
        if let Some(setup_file) = &spec.setup_file {
            Self::required("setup_file", setup_file)?;
        }
        for family in AttributeFamily::ALL {
            let members = match family {
                AttributeFamily::Configs => &spec.configs,
                AttributeFamily::Jars => &spec.jars,
                AttributeFamily::Tags => &spec.tags,
            };
            Self::members(family, members)?;
        }
        Ok(())
    }

    /// On update the body may repeat the id but must not change it.
    pub fn update(id: &ApplicationId, spec: &ApplicationSpec) -> Result<(), ServiceError> {
        Self::id(id)?;
        if let Some(body_id) = &spec.id
            && body_id != id
        {
            return Err(ServiceError::validation(format!(
                "application id is immutable: request addresses '{id}' but body carries '{body_id}'"
            )));
        }
        Self::spec(spec)
    }

    pub fn id(id: &ApplicationId) -> Result<(), ServiceError> {
        Self::required("id", id.as_str())
    }

    /// Items for add / replace: at least one, none blank.
    pub fn items(family: AttributeFamily, items: &BTreeSet<String>) -> Result<(), ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::validation(format!(
                "no {family} supplied; at least one is required"
            )));
        }
        Self::members(family, items)
    }

    /// Single item for discard.
    pub fn item(family: AttributeFamily, item: &str) -> Result<(), ServiceError> {
        Self::required(family.item_name(), item)
    }

    fn members(family: AttributeFamily, members: &BTreeSet<String>) -> Result<(), ServiceError> {
        if members.iter().any(|m| m.trim().is_empty()) {
            return Err(ServiceError::validation(format!(
                "blank {} in {family}",
                family.item_name()
            )));
        }
        Ok(())
    }

    fn required(field: &str, value: &str) -> Result<(), ServiceError> {
        if value.trim().is_empty() {
            return Err(ServiceError::validation(format!("{field} is required")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use rstest::rstest;

    fn valid() -> ApplicationSpec {
        ApplicationSpec::new("spark", "tgianos")
    }

    #[test]
    fn accepts_minimal_spec() {
        assert!(Validator::spec(&valid()).is_ok());
    }

    #[rstest]
    #[case::blank_name(ApplicationSpec::new(" ", "tgianos"))]
    #[case::blank_user(ApplicationSpec::new("spark", ""))]
    #[case::blank_id(valid().with_id("  "))]
    #[case::blank_setup_file(valid().with_setup_file(""))]
    #[case::blank_config(valid().with_configs(["s3://a", " "]))]
    #[case::blank_jar(valid().with_jars([""]))]
    #[case::blank_tag(valid().with_tags(["prod", "\t"]))]
    fn rejects_invalid_specs(#[case] spec: ApplicationSpec) {
        let err = Validator::spec(&spec).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn update_rejects_a_different_body_id() {
        let err = Validator::update(&ApplicationId::new("spark"), &valid().with_id("hadoop"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[rstest]
    #[case::absent(valid())]
    #[case::same(valid().with_id("spark"))]
    fn update_accepts_absent_or_matching_body_id(#[case] spec: ApplicationSpec) {
        assert!(Validator::update(&ApplicationId::new("spark"), &spec).is_ok());
    }

    #[test]
    fn items_must_not_be_empty() {
        let err = Validator::items(AttributeFamily::Jars, &BTreeSet::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().contains("jars"));
    }

    #[test]
    fn discarded_item_must_not_be_blank() {
        assert!(Validator::item(AttributeFamily::Tags, "prod").is_ok());
        let err = Validator::item(AttributeFamily::Tags, " ").unwrap_err();
        assert_eq!(err.message(), "tag is required");
    }
}
