//! App - アプリケーション層
//!
//! ports を組み合わせて会話フローを実装します。
//!
//! # 主要コンポーネント
//! - **OrchestratorBuilder**: 構築とワイヤリング
//! - **InteractionOrchestrator**: 操作ごとの状態遷移
//! - **SessionState**: Confirm / Undo コンテキストの保持
//! - **Intent**: ホストからの要求の型付け

pub mod builder;
pub mod intent;
pub mod orchestrator;
pub mod session;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, OrchestratorBuilder};
pub use self::intent::{Intent, IntentError};
pub use self::orchestrator::{AUTH_MAIL_SUBJECT, InteractionOrchestrator};
pub use self::session::{SessionState, SlotError};
