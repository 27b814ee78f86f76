//! IdGenerator port - ID 生成の抽象化
//!
//! リモート API の ID（task / taskseries / transaction）を
//! インメモリ実装で払い出すためのインターフェースです。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース

use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator はリモート側の ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（Arc 越しに共有される）
pub trait IdGenerator: Send + Sync {
    fn generate_task_id(&self) -> String;

    fn generate_series_id(&self) -> String;

    fn generate_transaction_id(&self) -> String;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_task_id(&self) -> String {
        format!("task-{}", self.next())
    }

    fn generate_series_id(&self) -> String {
        format!("series-{}", self.next())
    }

    fn generate_transaction_id(&self) -> String {
        format!("tx-{}", self.next())
    }
}
