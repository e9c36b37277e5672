//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryApplicationStore**: 揮発性の Entity Store
//! - **InMemoryCommandCatalog**: Command サブシステムの代役
//!
//! A durable store belongs in its own crate next to its driver.

pub mod inmem_commands;
pub mod inmem_store;

// 主要な型を再エクスポート
pub use self::inmem_commands::InMemoryCommandCatalog;
pub use self::inmem_store::InMemoryApplicationStore;
