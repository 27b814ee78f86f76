//! Task - リモートサービスとやり取りするタスクのレコード
//!
//! # 設計
//! リモート側はタスクの *series*（繰り返しの定義）と個々の発生を分けて持つため、
//! 作成済みタスクは `(task_series_id, task_id)` と所属リストの組で特定します。
//!
//! コンテキストに載る型（`TaskRecord` / `ProposedTask`）は
//! ホストのスロットと同じ camelCase で直列化されます。

use serde::{Deserialize, Serialize};

/// CreatedTask はタスク作成成功時に返る識別子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTask {
    pub task_series_id: String,
    pub task_id: String,
}

/// TaskRecord はリモートに確定済みで、まだ取り消せるタスク
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub task_id: String,
    pub task_series_id: String,
    pub list_id: String,
    pub list_name: String,
    pub task_name: String,
}

impl TaskRecord {
    pub fn committed(proposed: &ProposedTask, created: CreatedTask) -> Self {
        Self {
            task_id: created.task_id,
            task_series_id: created.task_series_id,
            list_id: proposed.list_id.clone(),
            list_name: proposed.list_name.clone(),
            task_name: proposed.task_name.clone(),
        }
    }
}

/// ProposedTask は確認待ちで、まだ送信していないタスク作成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedTask {
    pub task_name: String,
    pub list_id: String,
    pub list_name: String,
}

impl ProposedTask {
    pub fn new(
        task_name: impl Into<String>,
        list_id: impl Into<String>,
        list_name: impl Into<String>,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            list_id: list_id.into(),
            list_name: list_name.into(),
        }
    }
}

/// TaskSummary はリスト照会で返る未完了タスク 1 件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub task_series_id: String,
    pub task_id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn committed_task_keeps_proposal_and_remote_ids() {
        let proposed = ProposedTask::new("milk", "list-1", "groceries");
        let created = CreatedTask {
            task_series_id: "series-9".to_string(),
            task_id: "task-7".to_string(),
        };

        let record = TaskRecord::committed(&proposed, created);

        assert_eq!(record.task_id, "task-7");
        assert_eq!(record.task_series_id, "series-9");
        assert_eq!(record.list_id, "list-1");
        assert_eq!(record.list_name, "groceries");
        assert_eq!(record.task_name, "milk");
    }

    #[test]
    fn proposed_task_uses_camel_case_keys() {
        let value = serde_json::to_value(ProposedTask::new("milk", "l1", "groceries")).unwrap();

        assert_eq!(
            value,
            json!({ "taskName": "milk", "listId": "l1", "listName": "groceries" })
        );
    }
}
