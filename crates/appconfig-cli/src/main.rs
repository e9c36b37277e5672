use std::path::PathBuf;

use anyhow::Context;
use appconfig_core::domain::{ApplicationQuery, ApplicationStatus, AttributeFamily};
use appconfig_core::impls::{InMemoryApplicationStore, InMemoryCommandCatalog};
use appconfig_core::{ApplicationConfigService, ApplicationId, ApplicationService, ConfigLoader};
use clap::{Parser, Subcommand};
use serde_json::Value;

mod logging;
mod seed;

use seed::Seed;

/// Query an application configuration catalog loaded from a seed file.
#[derive(Debug, Parser)]
#[command(name = "appconfig", version)]
struct Cli {
    /// YAML service configuration (listing limits, logging).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// YAML file with `applications` and `commands` to load first.
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Filtered, sorted and paged listing.
    List {
        /// Exact name, or a pattern with `%` / `_`.
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        user: Option<String>,
        /// Repeatable; any of the given statuses matches.
        #[arg(long = "status")]
        statuses: Vec<ApplicationStatus>,
        /// Repeatable; every given tag must be present.
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, default_value_t = 0)]
        page: usize,
        /// 0 means the configured default.
        #[arg(long, default_value_t = 0)]
        limit: usize,
        #[arg(long)]
        desc: bool,
        /// Repeatable; first is the primary key.
        #[arg(long = "order-by")]
        order_bys: Vec<String>,
    },
    Show {
        id: String,
    },
    Configs {
        id: String,
    },
    Jars {
        id: String,
    },
    Tags {
        id: String,
    },
    /// Commands that reference the application.
    Commands {
        id: String,
    },
    /// Number of applications per status.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_deref()).context("loading configuration")?;
    logging::init(&config.logging)?;

    let catalog = InMemoryCommandCatalog::new();
    let service = ApplicationService::builder()
        .store(InMemoryApplicationStore::new())
        .commands(catalog.clone())
        .config(&config)
        .build()?;

    if let Some(path) = &cli.seed {
        Seed::load(path)?.apply(&service, &catalog).await?;
    }

    let output = run(&service, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(service: &dyn ApplicationConfigService, command: Commands) -> anyhow::Result<Value> {
    let value = match command {
        Commands::List {
            name,
            user,
            statuses,
            tags,
            page,
            limit,
            desc,
            order_bys,
        } => {
            let mut query = ApplicationQuery::new()
                .statuses(statuses)
                .tags(tags)
                .page(page, limit)
                .descending(desc);
            if let Some(name) = name {
                query = query.name(name);
            }
            if let Some(user) = user {
                query = query.user(user);
            }
            for field in order_bys {
                query = query.order_by(field);
            }
            serde_json::to_value(service.list_applications(&query).await?)?
        }
        Commands::Show { id } => {
            serde_json::to_value(service.get_application(&ApplicationId::from(id)).await?)?
        }
        Commands::Configs { id } => attribute(service, id, AttributeFamily::Configs).await?,
        Commands::Jars { id } => attribute(service, id, AttributeFamily::Jars).await?,
        Commands::Tags { id } => attribute(service, id, AttributeFamily::Tags).await?,
        Commands::Commands { id } => serde_json::to_value(
            service
                .commands_for_application(&ApplicationId::from(id))
                .await?,
        )?,
        Commands::Stats => serde_json::to_value(service.status_counts().await?)?,
    };
    Ok(value)
}

async fn attribute(
    service: &dyn ApplicationConfigService,
    id: String,
    family: AttributeFamily,
) -> anyhow::Result<Value> {
    let items = service
        .get_attribute(&ApplicationId::from(id), family)
        .await?;
    Ok(serde_json::to_value(items)?)
}
