//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **RtmClient**: Remember The Milk REST API（本番用）
//! - **InMemoryTaskService**: 開発用・テスト用のリモートサービス
//! - **LogNotifier / RecordingNotifier**: 認証リンクの通知先

pub mod memory;
pub mod notify;
pub mod rtm;

// 主要な型を再エクスポート
pub use self::memory::{InMemoryTaskService, RemoteCall, RemoteMethod};
pub use self::notify::{Delivery, LogNotifier, RecordingNotifier};
pub use self::rtm::RtmClient;
