//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! The entity store and the Command subsystem are external collaborators;
//! the service only sees these traits. In-memory implementations live in
//! `impls`.

pub mod application_store;
pub mod clock;
pub mod command_catalog;
pub mod id_generator;

// 主要な trait を再エクスポート
pub use self::application_store::{ApplicationStore, StoreError};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::command_catalog::{CatalogError, CommandCatalog};
pub use self::id_generator::{IdGenerator, UlidGenerator};
