//! IdGenerator port - ID 生成の抽象化
//!
//! Used when a create request does not bring its own id.
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::ids::ApplicationId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は分散システムで使える ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_application_id(&self) -> ApplicationId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// The timestamp half of the ULID comes from the injected clock, so a
/// `FixedClock` pins it in tests; the random half keeps ids unique.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_application_id(&self) -> ApplicationId {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        ApplicationId::from_ulid(ulid)
    }
}
