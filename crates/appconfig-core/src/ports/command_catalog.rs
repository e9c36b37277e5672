//! CommandCatalog port - Command サブシステムへの読み取り口
//!
//! The Application → Command relation is computed at query time from the
//! Commands' own application references. Nothing is stored on the
//! Application side.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ApplicationId, Command, ServiceError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("command catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<CatalogError> for ServiceError {
    fn from(err: CatalogError) -> Self {
        ServiceError::store("command catalog failed").with_source(err)
    }
}

#[async_trait]
pub trait CommandCatalog: Send + Sync {
    /// Every Command whose application references include `id`.
    async fn commands_referencing(
        &self,
        id: &ApplicationId,
    ) -> Result<Vec<Command>, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    #[test]
    fn catalog_errors_are_store_errors_naming_the_catalog() {
        let err = ServiceError::from(CatalogError::Unavailable("timeout".into()));
        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(err.message(), "command catalog failed");
        assert_eq!(
            std::error::Error::source(&err).map(|s| s.to_string()).as_deref(),
            Some("command catalog unavailable: timeout")
        );
    }
}
