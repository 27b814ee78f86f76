//! InteractionOrchestrator - 会話の状態機械
//!
//! 各操作について、認証確認、リモート呼び出し、リスト名の照合、
//! コンテキストの遷移を順に実行します。
//!
//! # 実行モデル
//! - 1 つの操作が完了してから次の発話を処理する
//! - リモート呼び出しは順に await し、再試行はしない
//! - 公開操作はそれぞれ最終的なエラー境界。失敗（panic も含む）は
//!   ちょうど 1 つのダイアログになり、`Err` として外へ出ない
//!
//! # コンテキストの遷移
//! | Operation      | Before                | After (success)                  |
//! |----------------|-----------------------|----------------------------------|
//! | Authenticate   | clear both            | -                                |
//! | GetToken       | clear both            | -                                |
//! | AddTaskToList  | clear both            | Confirm (ambiguous) or Undo      |
//! | ReadList       | clear both            | -                                |
//! | Confirm        | take Confirm          | Undo                             |
//! | Decline        | clear Confirm         | -                                |
//! | Undo           | take Undo             | -                                |

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, warn};

use super::intent::Intent;
use super::session::SessionState;
use crate::config::{Credentials, SkillConfig};
use crate::domain::dialog::{
    BEST_MATCH_PARAMETER, LIST_PARAMETER, NOF_TASK_PARAMETER, TASK_PARAMETER,
};
use crate::domain::errors::general_error_dialog;
use crate::domain::{
    AuthFailure, AuthState, ConfirmPending, ContextKind, Dialog, DialogKey, Operation,
    OperationError, ProposedTask, Reply, TaskRecord, UndoPending,
};
use crate::matching::{FuzzyListResolver, ListMatch};
use crate::ports::{AuthLinkNotifier, RemoteTaskService};

/// 認可メールの件名
pub const AUTH_MAIL_SUBJECT: &str = "Authentication";

fn auth_mail_body(auth_url: &str) -> String {
    format!(
        "Use the link below to authenticate with Remember The Milk.<br>\
         After authentication, say: get a token for remember the milk<br><br>\
         <a href = \"{auth_url}\">{auth_url}</a>"
    )
}

/// InteractionOrchestrator は 1 セッション分の操作とコンテキストを持つ
pub struct InteractionOrchestrator {
    config: SkillConfig,
    service: Arc<dyn RemoteTaskService>,
    notifier: Arc<dyn AuthLinkNotifier>,
    resolver: FuzzyListResolver,
    session: SessionState,
}

impl InteractionOrchestrator {
    pub fn new(
        config: SkillConfig,
        service: Arc<dyn RemoteTaskService>,
        notifier: Arc<dyn AuthLinkNotifier>,
    ) -> Self {
        Self {
            config,
            service,
            notifier,
            resolver: FuzzyListResolver::new(),
            session: SessionState::new(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// セッションを置き換える（ホストが持ち回ったコンテキストの復元など）
    pub fn restore_session(&mut self, session: SessionState) {
        self.session = session;
    }

    /// 追従の発話を受け付けるか。confirm / decline は確認待ちが、
    /// undo は確定済みの操作が必要
    pub fn is_eligible(&self, intent: &Intent) -> bool {
        match intent {
            Intent::Confirm | Intent::Decline => self.session.confirm_eligible(),
            Intent::Undo => self.session.undo_eligible(),
            _ => true,
        }
    }

    pub async fn handle(&mut self, intent: Intent) -> Reply {
        match intent {
            Intent::Authenticate => self.authenticate().await,
            Intent::GetToken => self.get_token().await,
            Intent::AddTaskToList {
                task_name,
                list_name,
            } => self.add_task_to_list(&task_name, &list_name).await,
            Intent::ReadList { list_name } => self.read_list(&list_name).await,
            Intent::Confirm => self.confirm().await,
            Intent::Decline => self.decline(),
            Intent::Undo => self.undo().await,
        }
    }

    pub async fn authenticate(&mut self) -> Reply {
        self.begin(Operation::Authenticate);
        guarded(Operation::Authenticate, self.authenticate_steps()).await
    }

    pub async fn get_token(&mut self) -> Reply {
        self.begin(Operation::GetToken);
        guarded(Operation::GetToken, self.get_token_steps()).await
    }

    pub async fn add_task_to_list(&mut self, task_name: &str, list_name: &str) -> Reply {
        self.begin(Operation::AddTaskToList);
        guarded(
            Operation::AddTaskToList,
            self.add_task_steps(task_name, list_name),
        )
        .await
    }

    pub async fn read_list(&mut self, list_name: &str) -> Reply {
        self.begin(Operation::ReadList);
        guarded(Operation::ReadList, self.read_list_steps(list_name)).await
    }

    pub async fn confirm(&mut self) -> Reply {
        let Some(pending) = self.session.take_confirm() else {
            debug!("confirm requested without a pending confirmation");
            return Reply::new();
        };
        guarded(Operation::Confirm, self.confirm_steps(pending)).await
    }

    pub fn decline(&mut self) -> Reply {
        if let Some(pending) = self.session.confirm() {
            info!(task = %pending.proposed_task.task_name, "pending confirmation declined");
        }
        self.session.clear(ContextKind::Confirm);
        Reply::dialog(Dialog::new(DialogKey::NoConfirm))
    }

    pub async fn undo(&mut self) -> Reply {
        // consumed up front: the context is gone whatever the outcome
        let Some(pending) = self.session.take_undo() else {
            debug!("undo requested without a committed operation");
            return Reply::new();
        };
        guarded(Operation::Undo, self.undo_steps(pending)).await
    }

    fn begin(&mut self, operation: Operation) {
        if operation.clears_contexts() {
            self.session.clear_all();
        }
    }

    fn require_config(&self) -> Result<Credentials, OperationError> {
        self.config
            .credentials()
            .ok_or(OperationError::Configuration)
    }

    /// 設定と保存済みトークンの確認。有効性は最初のリモート呼び出しに任せる
    async fn operation_init(&self) -> Result<(), OperationError> {
        self.require_config()?;
        match AuthState::from(self.service.auth_token().await) {
            AuthState::TokenPresent => Ok(()),
            AuthState::HandshakePending => Err(AuthFailure::HandshakePending.into()),
            AuthState::Unauthenticated => Err(AuthFailure::NotAuthenticated.into()),
        }
    }

    async fn find_list(&self, spoken: &str) -> Result<ListMatch, OperationError> {
        let lists = self.service.fetch_lists().await?;
        self.resolver
            .resolve(spoken, &lists)
            .ok_or_else(|| OperationError::unexpected("no lists to match against"))
    }

    async fn authenticate_steps(&self) -> Result<Reply, OperationError> {
        self.require_config()?;

        let tokens = self.service.auth_token().await;
        if tokens.has_token {
            match self.service.verify_token_validity().await {
                Ok(()) => return Ok(Reply::dialog(Dialog::new(DialogKey::TokenValid))),
                Err(err) => debug!(code = %err.code, "stored token rejected, starting handshake"),
            }
        }

        let auth_url = self.service.request_authorization_handshake().await?;
        self.notifier
            .deliver(AUTH_MAIL_SUBJECT, &auth_mail_body(&auth_url))
            .await
            .map_err(|err| OperationError::unexpected(err.to_string()))?;
        info!("authorization link delivered");

        Ok(Reply::dialog(Dialog::new(DialogKey::EmailSent)))
    }

    async fn get_token_steps(&self) -> Result<Reply, OperationError> {
        self.require_config()?;

        let tokens = self.service.auth_token().await;
        if tokens.has_token {
            match self.service.verify_token_validity().await {
                Ok(()) => return Ok(Reply::dialog(Dialog::new(DialogKey::TokenValid))),
                Err(err) if !err.is_invalid_token() => return Err(err.into()),
                Err(_) => debug!("stored token is invalid, exchanging handshake"),
            }
        }

        if !tokens.handshake_pending {
            return Err(AuthFailure::NoHandshake.into());
        }

        self.service.exchange_handshake_for_token().await?;
        info!("auth token obtained");
        Ok(Reply::dialog(Dialog::new(DialogKey::GotToken)))
    }

    async fn add_task_steps(
        &mut self,
        task_name: &str,
        list_name: &str,
    ) -> Result<Reply, OperationError> {
        self.operation_init().await?;
        self.service.sync_timeline().await?;

        let found = self.find_list(list_name).await?;
        let proposed = ProposedTask::new(task_name, found.list_id.clone(), found.name.clone());

        if !found.is_exact() {
            info!(
                spoken = list_name,
                best_match = %found.name,
                confidence = found.confidence,
                "ambiguous list, asking for confirmation"
            );
            self.session.set(ConfirmPending::add_task(proposed).into());
            return Ok(Reply::dialog(
                Dialog::new(DialogKey::AddTaskToListMismatch)
                    .with(LIST_PARAMETER, list_name)
                    .with(BEST_MATCH_PARAMETER, found.name),
            ));
        }

        self.commit_task(proposed).await
    }

    async fn commit_task(&mut self, proposed: ProposedTask) -> Result<Reply, OperationError> {
        let created = self
            .service
            .create_task(&proposed.task_name, &proposed.list_id)
            .await?;
        let record = TaskRecord::committed(&proposed, created);
        info!(
            task_id = %record.task_id,
            list_id = %record.list_id,
            "task added"
        );

        let reply = Reply::dialog(
            Dialog::new(DialogKey::AddTaskToList)
                .with(TASK_PARAMETER, record.task_name.clone())
                .with(LIST_PARAMETER, record.list_name.clone()),
        );
        self.session.set(UndoPending::add_task(record).into());
        Ok(reply)
    }

    async fn read_list_steps(&self, list_name: &str) -> Result<Reply, OperationError> {
        self.operation_init().await?;

        let found = self.find_list(list_name).await?;
        let tasks = self.service.list_incomplete_tasks(&found.list_id).await?;

        let key = if tasks.len() == 1 {
            DialogKey::ReadListOneItem
        } else {
            DialogKey::ReadList
        };
        let mut reply = Reply::dialog(
            Dialog::new(key)
                .with(LIST_PARAMETER, found.name)
                .with(NOF_TASK_PARAMETER, tasks.len().to_string()),
        );
        for task in tasks {
            reply.push_text(task.name);
        }
        Ok(reply)
    }

    async fn confirm_steps(&mut self, pending: ConfirmPending) -> Result<Reply, OperationError> {
        match pending.dialog_key {
            DialogKey::AddTaskToList => self.commit_task(pending.proposed_task).await,
            other => {
                warn!(dialog = %other, "no replay for pending confirmation");
                Ok(Reply::new())
            }
        }
    }

    async fn undo_steps(&self, pending: UndoPending) -> Result<Reply, OperationError> {
        match pending.dialog_key {
            DialogKey::AddTaskToListUndo => {
                // creation has no native rollback; deletion compensates it
                let task = &pending.committed_task;
                let transaction = self
                    .service
                    .delete_task(&task.task_id, &task.task_series_id, &task.list_id)
                    .await?;
                info!(task_id = %task.task_id, transaction = %transaction, "task creation undone");
                Ok(Reply::dialog(pending.dialog()))
            }
            other => {
                warn!(dialog = %other, "no compensation for pending operation");
                Ok(Reply::new())
            }
        }
    }
}

/// 操作のステップを実行し、失敗をそのダイアログに変換する
async fn guarded<F>(operation: Operation, steps: F) -> Reply
where
    F: Future<Output = Result<Reply, OperationError>>,
{
    match AssertUnwindSafe(steps).catch_unwind().await {
        Ok(Ok(reply)) => reply,
        Ok(Err(err)) => {
            match &err {
                OperationError::Unexpected { .. } => {
                    error!(operation = %operation, error = %err, "operation failed")
                }
                OperationError::Remote(remote) => warn!(
                    operation = %operation,
                    code = %remote.code,
                    text = %remote.text,
                    "remote call failed"
                ),
                _ => info!(operation = %operation, error = %err, "operation not possible"),
            }
            Reply::dialog(err.dialog(operation))
        }
        Err(panic) => {
            error!(
                operation = %operation,
                panic = panic_message(panic.as_ref()),
                "operation panicked"
            );
            Reply::dialog(general_error_dialog(operation, "unknown"))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
