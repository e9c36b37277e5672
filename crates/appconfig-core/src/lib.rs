//! appconfig-core
//!
//! Application configuration service: set-valued attribute management,
//! filtered listing and the Application → Command relation.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, state, spec, application, attribute, command, query, errors）
//! - **ports**: 抽象化レイヤー（ApplicationStore, CommandCatalog, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（builder, service, validator, listing, locks）
//! - **impls**: 実装（InMemoryApplicationStore など開発用）
//! - **config**: figment による設定の読み込み
//! - **observability**: status counts

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{ApplicationConfigService, ApplicationService, BuildError, ServiceBuilder};
pub use config::{ConfigError, ConfigLoader, ServiceConfig};
pub use domain::{
    Application, ApplicationId, ApplicationQuery, ApplicationSpec, ApplicationStatus,
    AttributeFamily, Command, ErrorKind, ServiceError,
};
