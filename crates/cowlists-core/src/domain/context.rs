//! Context - 保留中の操作コンテキスト
//!
//! コンテキストは次の発話を待つ操作 1 つと、その再実行や応答に使うダイアログを保持します。
//!
//! # 種類
//! - [`ConfirmPending`]: はい / いいえを待つ曖昧な操作
//! - [`UndoPending`]: 確定済みで、まだ取り消せる操作
//!
//! # 直列化
//! どちらもフラットな JSON レコードとして直列化し、ホストがターン間で持ち回ります。
//! 書き手と読み手は同じプロセスなので、形式にバージョンはありません。

use serde::{Deserialize, Serialize};

use super::dialog::{Dialog, DialogKey, DialogParams, LIST_PARAMETER, TASK_PARAMETER};
use super::task::{ProposedTask, TaskRecord};

/// ContextKind はコンテキストが入るスロット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextKind {
    Confirm,
    Undo,
}

impl ContextKind {
    /// ホスト層を通すときのスロット名
    pub fn slot_name(&self) -> &'static str {
        match self {
            ContextKind::Confirm => "ConfirmContext",
            ContextKind::Undo => "UndoContext",
        }
    }
}

/// ConfirmPending はユーザーのはい / いいえを待つ操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPending {
    /// 確認されたときに再実行する操作の種類
    pub dialog_key: DialogKey,
    pub dialog_params: DialogParams,
    pub proposed_task: ProposedTask,
}

impl ConfirmPending {
    /// 最も近いリストへの「タスク追加」を保留する
    pub fn add_task(proposed: ProposedTask) -> Self {
        let dialog = Dialog::new(DialogKey::AddTaskToList)
            .with(TASK_PARAMETER, proposed.task_name.clone())
            .with(LIST_PARAMETER, proposed.list_name.clone());
        Self {
            dialog_key: dialog.key,
            dialog_params: dialog.params,
            proposed_task: proposed,
        }
    }

    pub fn dialog(&self) -> Dialog {
        Dialog {
            key: self.dialog_key,
            params: self.dialog_params.clone(),
        }
    }
}

/// UndoPending は要求があれば補償できる確定済みの操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoPending {
    /// 補償する操作の種類。取り消し後に読み上げるダイアログも兼ねる
    pub dialog_key: DialogKey,
    pub dialog_params: DialogParams,
    pub committed_task: TaskRecord,
}

impl UndoPending {
    pub fn add_task(committed: TaskRecord) -> Self {
        let dialog = Dialog::new(DialogKey::AddTaskToListUndo)
            .with(TASK_PARAMETER, committed.task_name.clone())
            .with(LIST_PARAMETER, committed.list_name.clone());
        Self {
            dialog_key: dialog.key,
            dialog_params: dialog.params,
            committed_task: committed,
        }
    }

    pub fn dialog(&self) -> Dialog {
        Dialog {
            key: self.dialog_key,
            params: self.dialog_params.clone(),
        }
    }
}

/// PendingOperationContext は両方のコンテキストのタグ付き共用体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "purpose")]
pub enum PendingOperationContext {
    ConfirmPending(ConfirmPending),
    UndoPending(UndoPending),
}

impl PendingOperationContext {
    pub fn kind(&self) -> ContextKind {
        match self {
            PendingOperationContext::ConfirmPending(_) => ContextKind::Confirm,
            PendingOperationContext::UndoPending(_) => ContextKind::Undo,
        }
    }

    pub fn dialog(&self) -> Dialog {
        match self {
            PendingOperationContext::ConfirmPending(c) => c.dialog(),
            PendingOperationContext::UndoPending(u) => u.dialog(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl From<ConfirmPending> for PendingOperationContext {
    fn from(value: ConfirmPending) -> Self {
        PendingOperationContext::ConfirmPending(value)
    }
}

impl From<UndoPending> for PendingOperationContext {
    fn from(value: UndoPending) -> Self {
        PendingOperationContext::UndoPending(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn committed() -> TaskRecord {
        TaskRecord {
            task_id: "t1".to_string(),
            task_series_id: "s1".to_string(),
            list_id: "l1".to_string(),
            list_name: "groceries".to_string(),
            task_name: "milk".to_string(),
        }
    }

    #[test]
    fn confirm_context_carries_replay_dialog() {
        let ctx = ConfirmPending::add_task(ProposedTask::new("milk", "l1", "groceries"));

        let dialog = ctx.dialog();
        assert_eq!(dialog.key, DialogKey::AddTaskToList);
        assert_eq!(dialog.param(TASK_PARAMETER), Some("milk"));
        assert_eq!(dialog.param(LIST_PARAMETER), Some("groceries"));
    }

    #[test]
    fn undo_context_is_a_flat_record() {
        let ctx: PendingOperationContext = UndoPending::add_task(committed()).into();

        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(
            value,
            json!({
                "purpose": "UndoPending",
                "dialogKey": "AddTaskToListUndo",
                "dialogParams": { "listName": "groceries", "taskName": "milk" },
                "committedTask": {
                    "taskId": "t1",
                    "taskSeriesId": "s1",
                    "listId": "l1",
                    "listName": "groceries",
                    "taskName": "milk"
                }
            })
        );
        assert_eq!(ctx.kind(), ContextKind::Undo);
    }

    #[test]
    fn context_survives_slot_transport() {
        let ctx: PendingOperationContext =
            ConfirmPending::add_task(ProposedTask::new("milk", "l1", "groceries")).into();

        let raw = ctx.to_json().unwrap();
        let back = PendingOperationContext::from_json(&raw).unwrap();

        assert_eq!(back, ctx);
        assert_eq!(back.kind().slot_name(), "ConfirmContext");
    }

    #[test]
    fn malformed_slot_value_is_rejected() {
        assert!(PendingOperationContext::from_json("{\"purpose\":\"Other\"}").is_err());
    }
}
