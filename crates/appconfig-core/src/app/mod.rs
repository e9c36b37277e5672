//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてサービスロジックを実装します。
//!
//! # 主要コンポーネント
//! - **ServiceBuilder**: サービスの構築とワイヤリング
//! - **ApplicationService**: `ApplicationConfigService` の実装
//! - **Validator**: 変更前のフィールド検証
//! - **ListingPlan**: 一覧のソートとページング
//! - **KeyedLocks**: `(id, family)` ごとの排他制御

pub mod builder;
pub mod listing;
pub mod locks;
pub mod service;
pub mod validator;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, ServiceBuilder};
pub use self::listing::ListingPlan;
pub use self::locks::{KeyedGuard, KeyedLocks};
pub use self::service::{ApplicationConfigService, ApplicationService};
pub use self::validator::Validator;
