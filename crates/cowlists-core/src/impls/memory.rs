//! InMemoryTaskService - メモリ上のリモートタスクサービス
//!
//! ネットワークなしでオーケストレータを動かせる程度にリモート API を再現します。
//! リストとタスク、変更前のタイムライン要求、トークン / ハンドシェイクの寿命を扱います。
//!
//! # テスト容易性
//! - すべての呼び出しを `RemoteCall` として記録
//! - `RemoteMethod` ごとに失敗を注入できる

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{CreatedTask, ListRecord, RemoteError, TaskSummary, TokenState};
use crate::ports::{IdGenerator, RemoteTaskService, SystemClock, UlidGenerator};

/// RemoteMethod は失敗の注入と呼び出し回数の集計に使うリモートの機能
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteMethod {
    FetchLists,
    CreateTask,
    DeleteTask,
    ListIncompleteTasks,
    SyncTimeline,
    VerifyToken,
    RequestHandshake,
    ExchangeHandshake,
}

/// RemoteCall は記録された呼び出し 1 件とその引数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    FetchLists,
    CreateTask {
        task_name: String,
        list_id: String,
    },
    DeleteTask {
        task_id: String,
        task_series_id: String,
        list_id: String,
    },
    ListIncompleteTasks {
        list_id: String,
    },
    SyncTimeline,
    AuthToken,
    VerifyToken,
    RequestHandshake,
    ExchangeHandshake,
}

impl RemoteCall {
    /// 失敗を注入できるメソッド。`AuthToken` は失敗しないため `None`
    pub fn method(&self) -> Option<RemoteMethod> {
        match self {
            RemoteCall::FetchLists => Some(RemoteMethod::FetchLists),
            RemoteCall::CreateTask { .. } => Some(RemoteMethod::CreateTask),
            RemoteCall::DeleteTask { .. } => Some(RemoteMethod::DeleteTask),
            RemoteCall::ListIncompleteTasks { .. } => Some(RemoteMethod::ListIncompleteTasks),
            RemoteCall::SyncTimeline => Some(RemoteMethod::SyncTimeline),
            RemoteCall::AuthToken => None,
            RemoteCall::VerifyToken => Some(RemoteMethod::VerifyToken),
            RemoteCall::RequestHandshake => Some(RemoteMethod::RequestHandshake),
            RemoteCall::ExchangeHandshake => Some(RemoteMethod::ExchangeHandshake),
        }
    }

    /// リモートの状態を変える呼び出しか
    pub fn is_mutation(&self) -> bool {
        matches!(self, RemoteCall::CreateTask { .. } | RemoteCall::DeleteTask { .. })
    }
}

#[derive(Debug, Clone)]
struct StoredTask {
    task_id: String,
    task_series_id: String,
    list_id: String,
    name: String,
    completed: bool,
    deleted: bool,
}

#[derive(Default)]
struct MemoryState {
    lists: Vec<ListRecord>,
    tasks: Vec<StoredTask>,
    token: Option<String>,
    token_valid: bool,
    handshake: Option<String>,
    timeline: Option<String>,
    failures: HashMap<RemoteMethod, RemoteError>,
    calls: Vec<RemoteCall>,
}

impl MemoryState {
    fn record(&mut self, call: RemoteCall) -> Result<(), RemoteError> {
        let method = call.method();
        self.calls.push(call);
        match method.and_then(|m| self.failures.get(&m)) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn require_timeline(&self) -> Result<(), RemoteError> {
        match self.timeline {
            Some(_) => Ok(()),
            None => Err(RemoteError::new("300", "Timeline invalid or not provided.")),
        }
    }

    fn require_list(&self, list_id: &str) -> Result<(), RemoteError> {
        if self.lists.iter().any(|l| l.id == list_id) {
            Ok(())
        } else {
            Err(RemoteError::new("340", "List ID invalid or not provided."))
        }
    }
}

fn invalid_token() -> RemoteError {
    RemoteError::new("98", "Login failed / Invalid auth token")
}

/// InMemoryTaskService は RemoteTaskService のメモリ上の実装
pub struct InMemoryTaskService {
    state: Mutex<MemoryState>,
    ids: Box<dyn IdGenerator>,
}

impl Default for InMemoryTaskService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTaskService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            ids: Box::new(UlidGenerator::new(SystemClock)),
        }
    }

    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_list(mut self, id: &str, name: &str) -> Self {
        self.state.get_mut().lists.push(ListRecord::new(id, name));
        self
    }

    /// 既存のリストに未完了のタスクを追加
    pub fn with_task(mut self, list_id: &str, name: &str) -> Self {
        let task = StoredTask {
            task_id: self.ids.generate_task_id(),
            task_series_id: self.ids.generate_series_id(),
            list_id: list_id.to_string(),
            name: name.to_string(),
            completed: false,
            deleted: false,
        };
        self.state.get_mut().tasks.push(task);
        self
    }

    pub fn with_completed_task(mut self, list_id: &str, name: &str) -> Self {
        self = self.with_task(list_id, name);
        if let Some(task) = self.state.get_mut().tasks.last_mut() {
            task.completed = true;
        }
        self
    }

    /// 有効なトークンを保存済みにする
    pub fn authenticated(mut self) -> Self {
        let state = self.state.get_mut();
        state.token = Some("token-memory".to_string());
        state.token_valid = true;
        self
    }

    /// リモート側が受け付けなくなったトークンを保存済みにする
    pub fn with_expired_token(mut self) -> Self {
        let state = self.state.get_mut();
        state.token = Some("token-expired".to_string());
        state.token_valid = false;
        self
    }

    pub fn with_pending_handshake(mut self) -> Self {
        self.state.get_mut().handshake = Some("frob-memory".to_string());
        self
    }

    /// 以後 `method` の呼び出しはすべて `err` で失敗する
    pub fn failing(mut self, method: RemoteMethod, err: RemoteError) -> Self {
        self.state.get_mut().failures.insert(method, err);
        self
    }

    pub async fn inject_failure(&self, method: RemoteMethod, err: RemoteError) {
        self.state.lock().await.failures.insert(method, err);
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn call_count(&self, method: RemoteMethod) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.method() == Some(method))
            .count()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// リストの削除されていないタスク（完了済みも含む）
    pub async fn tasks_in(&self, list_id: &str) -> Vec<TaskSummary> {
        self.state
            .lock()
            .await
            .tasks
            .iter()
            .filter(|t| t.list_id == list_id && !t.deleted)
            .map(|t| TaskSummary {
                task_series_id: t.task_series_id.clone(),
                task_id: t.task_id.clone(),
                name: t.name.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl RemoteTaskService for InMemoryTaskService {
    async fn fetch_lists(&self) -> Result<Vec<ListRecord>, RemoteError> {
        let mut state = self.state.lock().await;
        state.record(RemoteCall::FetchLists)?;
        Ok(state.lists.clone())
    }

    async fn create_task(
        &self,
        task_name: &str,
        list_id: &str,
    ) -> Result<CreatedTask, RemoteError> {
        let mut state = self.state.lock().await;
        state.record(RemoteCall::CreateTask {
            task_name: task_name.to_string(),
            list_id: list_id.to_string(),
        })?;
        state.require_timeline()?;
        state.require_list(list_id)?;

        let created = CreatedTask {
            task_series_id: self.ids.generate_series_id(),
            task_id: self.ids.generate_task_id(),
        };
        state.tasks.push(StoredTask {
            task_id: created.task_id.clone(),
            task_series_id: created.task_series_id.clone(),
            list_id: list_id.to_string(),
            name: task_name.to_string(),
            completed: false,
            deleted: false,
        });
        Ok(created)
    }

    async fn delete_task(
        &self,
        task_id: &str,
        task_series_id: &str,
        list_id: &str,
    ) -> Result<String, RemoteError> {
        let mut state = self.state.lock().await;
        state.record(RemoteCall::DeleteTask {
            task_id: task_id.to_string(),
            task_series_id: task_series_id.to_string(),
            list_id: list_id.to_string(),
        })?;
        state.require_timeline()?;
        state.require_list(list_id)?;

        let task = state
            .tasks
            .iter_mut()
            .find(|t| {
                t.task_id == task_id
                    && t.task_series_id == task_series_id
                    && t.list_id == list_id
                    && !t.deleted
            })
            .ok_or_else(|| RemoteError::new("341", "Task ID invalid or not provided."))?;
        task.deleted = true;
        Ok(self.ids.generate_transaction_id())
    }

    async fn list_incomplete_tasks(
        &self,
        list_id: &str,
    ) -> Result<Vec<TaskSummary>, RemoteError> {
        let mut state = self.state.lock().await;
        state.record(RemoteCall::ListIncompleteTasks {
            list_id: list_id.to_string(),
        })?;
        state.require_list(list_id)?;

        Ok(state
            .tasks
            .iter()
            .filter(|t| t.list_id == list_id && !t.completed && !t.deleted)
            .map(|t| TaskSummary {
                task_series_id: t.task_series_id.clone(),
                task_id: t.task_id.clone(),
                name: t.name.clone(),
            })
            .collect())
    }

    async fn sync_timeline(&self) -> Result<(), RemoteError> {
        let mut state = self.state.lock().await;
        state.record(RemoteCall::SyncTimeline)?;
        state.timeline = Some(self.ids.generate_transaction_id());
        Ok(())
    }

    async fn auth_token(&self) -> TokenState {
        let mut state = self.state.lock().await;
        state.calls.push(RemoteCall::AuthToken);
        TokenState {
            has_token: state.token.is_some(),
            handshake_pending: state.handshake.is_some(),
        }
    }

    async fn verify_token_validity(&self) -> Result<(), RemoteError> {
        let mut state = self.state.lock().await;
        state.record(RemoteCall::VerifyToken)?;
        match (&state.token, state.token_valid) {
            (Some(_), true) => Ok(()),
            _ => Err(invalid_token()),
        }
    }

    async fn request_authorization_handshake(&self) -> Result<String, RemoteError> {
        let mut state = self.state.lock().await;
        state.record(RemoteCall::RequestHandshake)?;
        let frob = format!("frob-{}", self.ids.generate_transaction_id());
        let url = format!("memory://auth?frob={frob}");
        state.handshake = Some(frob);
        Ok(url)
    }

    async fn exchange_handshake_for_token(&self) -> Result<(), RemoteError> {
        let mut state = self.state.lock().await;
        state.record(RemoteCall::ExchangeHandshake)?;
        let frob = state
            .handshake
            .take()
            .ok_or_else(|| RemoteError::new("101", "Invalid frob - did you authenticate?"))?;
        state.token = Some(format!("token-{frob}"));
        state.token_valid = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> InMemoryTaskService {
        InMemoryTaskService::new()
            .with_list("1", "Groceries")
            .with_task("1", "milk")
            .with_completed_task("1", "bread")
            .authenticated()
    }

    #[tokio::test]
    async fn token_lookup_is_recorded_but_never_fails() {
        let service = service().failing(RemoteMethod::VerifyToken, invalid_token());

        let tokens = service.auth_token().await;

        assert!(tokens.has_token);
        assert_eq!(service.calls().await, vec![RemoteCall::AuthToken]);
        assert_eq!(RemoteCall::AuthToken.method(), None);
        assert_eq!(service.call_count(RemoteMethod::VerifyToken).await, 0);
    }

    #[tokio::test]
    async fn mutations_require_a_timeline() {
        let service = service();

        let err = service.create_task("eggs", "1").await.unwrap_err();
        assert_eq!(err.code, "300");

        service.sync_timeline().await.unwrap();
        service.create_task("eggs", "1").await.unwrap();
    }

    #[tokio::test]
    async fn listing_skips_completed_and_deleted_tasks() {
        let service = service();
        service.sync_timeline().await.unwrap();
        let created = service.create_task("eggs", "1").await.unwrap();
        service
            .delete_task(&created.task_id, &created.task_series_id, "1")
            .await
            .unwrap();

        let names: Vec<String> = service
            .list_incomplete_tasks("1")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();

        assert_eq!(names, vec!["milk".to_string()]);
    }

    #[tokio::test]
    async fn delete_needs_matching_identifiers() {
        let service = service();
        service.sync_timeline().await.unwrap();
        let created = service.create_task("eggs", "1").await.unwrap();

        let err = service
            .delete_task(&created.task_id, "other-series", "1")
            .await
            .unwrap_err();
        assert_eq!(err.code, "341");
    }

    #[tokio::test]
    async fn unknown_list_is_rejected() {
        let service = service();
        let err = service.list_incomplete_tasks("nope").await.unwrap_err();
        assert_eq!(err.code, "340");
    }

    #[tokio::test]
    async fn handshake_is_exchanged_once() {
        let service = InMemoryTaskService::new();
        assert_eq!(service.auth_token().await, TokenState::default());

        service.request_authorization_handshake().await.unwrap();
        assert!(service.auth_token().await.handshake_pending);

        service.exchange_handshake_for_token().await.unwrap();
        let tokens = service.auth_token().await;
        assert!(tokens.has_token);
        assert!(!tokens.handshake_pending);
        service.verify_token_validity().await.unwrap();

        let err = service.exchange_handshake_for_token().await.unwrap_err();
        assert_eq!(err.code, "101");
    }

    #[tokio::test]
    async fn expired_token_fails_verification() {
        let service = InMemoryTaskService::new().with_expired_token();
        let err = service.verify_token_validity().await.unwrap_err();
        assert!(err.is_invalid_token());
    }

    #[tokio::test]
    async fn injected_failures_are_recorded_calls() {
        let service = service().failing(RemoteMethod::FetchLists, RemoteError::new("105", "down"));

        let err = service.fetch_lists().await.unwrap_err();

        assert_eq!(err, RemoteError::new("105", "down"));
        assert_eq!(service.calls().await, vec![RemoteCall::FetchLists]);
        assert_eq!(service.call_count(RemoteMethod::FetchLists).await, 1);

        service.clear_failures().await;
        assert_eq!(service.fetch_lists().await.unwrap().len(), 1);
    }
}
