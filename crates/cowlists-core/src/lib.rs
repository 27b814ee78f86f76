//! cowlists-core
//!
//! リモートのタスクリストサービス（Remember The Milk）を操作する
//! 音声アシスタントスキルのコア。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（lists, tasks, dialogs, pending contexts, errors）
//! - **ports**: 抽象化レイヤー（RemoteTaskService, AuthLinkNotifier, Clock, IdGenerator）
//! - **matching**: 音声入力のリスト名をファジーマッチ
//! - **app**: 会話フロー（orchestrator, session, intent, builder）
//! - **impls**: 実装（RtmClient, InMemoryTaskService, notifiers）
//! - **config**: 設定ファイルと環境変数

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod matching;
pub mod ports;
