//! RemoteTaskService port - リモートのタスク管理 API
//!
//! コアはリモートサービスの中身を知りません。各呼び出しは値を返して成功するか、
//! [`RemoteError`] `(code, text)` で失敗するかのどちらかです。
//! ネイティブの取り消しも冪等性の保証もないので、補償用のコンテキストはオーケストレータが持ちます。
//!
//! # 実装
//! - `impls::rtm::RtmClient`: REST クライアント（本番用）
//! - `impls::memory::InMemoryTaskService`: プロセス内の偽物（テスト、オフラインモード）

use async_trait::async_trait;

use crate::domain::{CreatedTask, ListRecord, RemoteError, TaskSummary, TokenState};

/// RemoteTaskService はコアが使うリモートサービスの機能
///
/// # 設計
/// - 変更系の呼び出し（`create_task`, `delete_task`）の前に `sync_timeline()` が必要。
///   順序はオーケストレータが守る
/// - 認証系のメソッドはサービス自身のトークン / ハンドシェイク状態を変える。
///   コアは戻り値をキャッシュしない
#[async_trait]
pub trait RemoteTaskService: Send + Sync {
    /// すべてのリストをリモートの並び順で返す
    async fn fetch_lists(&self) -> Result<Vec<ListRecord>, RemoteError>;

    async fn create_task(&self, task_name: &str, list_id: &str)
    -> Result<CreatedTask, RemoteError>;

    /// タスクの発生 1 件を削除し、リモートのトランザクション ID を返す
    async fn delete_task(
        &self,
        task_id: &str,
        task_series_id: &str,
        list_id: &str,
    ) -> Result<String, RemoteError>;

    async fn list_incomplete_tasks(&self, list_id: &str)
    -> Result<Vec<TaskSummary>, RemoteError>;

    async fn sync_timeline(&self) -> Result<(), RemoteError>;

    /// 保存済みのトークンを読み込み、保持しているものを報告する
    async fn auth_token(&self) -> TokenState;

    /// 保存済みのトークンをリモートサービスで確認する
    async fn verify_token_validity(&self) -> Result<(), RemoteError>;

    /// 新しいハンドシェイクを始め、ユーザーが開く URL を返す
    async fn request_authorization_handshake(&self) -> Result<String, RemoteError>;

    /// 保留中のハンドシェイクを長期のトークンと交換する
    async fn exchange_handshake_for_token(&self) -> Result<(), RemoteError>;
}
