//! Seed file - 起動時に in-memory store へ投入するデータ
//!
//! ```yaml
//! applications:
//!   - id: spark
//!     name: spark
//!     user: tgianos
//!     status: ACTIVE
//!     tags: [prod, spark]
//! commands:
//!   - id: spark-submit
//!     name: spark-submit
//!     user: tgianos
//!     application_ids: [spark]
//! ```

use std::path::Path;

use anyhow::Context;
use appconfig_core::domain::{ApplicationSpec, Command};
use appconfig_core::impls::InMemoryCommandCatalog;
use appconfig_core::ApplicationConfigService;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub applications: Vec<ApplicationSpec>,
    pub commands: Vec<Command>,
}

impl Seed {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing seed file {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Create every application through the service, then register commands.
    pub async fn apply(
        self,
        service: &dyn ApplicationConfigService,
        catalog: &InMemoryCommandCatalog,
    ) -> anyhow::Result<()> {
        let applications = self.applications.len();
        for spec in self.applications {
            let name = spec.name.clone();
            service
                .create_application(spec)
                .await
                .with_context(|| format!("seeding application '{name}'"))?;
        }

        let commands = self.commands.len();
        for command in self.commands {
            catalog.upsert(command).await;
        }

        info!(applications, commands, "seed applied");
        Ok(())
    }
}
