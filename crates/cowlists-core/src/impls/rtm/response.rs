//! Response - レスポンスの本文
//!
//! レスポンスはすべて `{"rsp": {"stat": "ok" | "fail", ...}}` に包まれています。
//! 識別子やフラグは文字列で届き、要素が 1 つだけの集まりは
//! 配列ではなく単独のオブジェクトで届くことがあります。

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::{CreatedTask, ListRecord, RemoteError, TaskSummary};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    rsp: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Status {
    stat: String,
    #[serde(default)]
    err: Option<Failure>,
}

#[derive(Debug, Deserialize)]
struct Failure {
    code: String,
    msg: String,
}

fn malformed(detail: impl std::fmt::Display) -> RemoteError {
    RemoteError::new("parse", format!("malformed response: {detail}"))
}

/// 封筒を開けて `T` を取り出す。失敗が報告されていればそれを返す
pub fn parse<T: DeserializeOwned>(body: &str) -> Result<T, RemoteError> {
    let envelope: Envelope = serde_json::from_str(body).map_err(malformed)?;
    let status: Status = serde_json::from_value(envelope.rsp.clone()).map_err(malformed)?;
    if status.stat != "ok" {
        return Err(match status.err {
            Some(failure) => RemoteError::new(failure.code, failure.msg),
            None => malformed(format!("stat {}", status.stat)),
        });
    }
    serde_json::from_value(envelope.rsp).map_err(malformed)
}

#[derive(Debug, Deserialize)]
pub struct FrobResponse {
    pub frob: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub auth: Auth,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub token: String,
    #[serde(default)]
    pub perms: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TimelineResponse {
    pub timeline: String,
}

#[derive(Debug, Deserialize)]
pub struct ListsResponse {
    pub lists: Lists,
}

#[derive(Debug, Deserialize)]
pub struct Lists {
    #[serde(default)]
    pub list: Option<OneOrMany<ListEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct ListEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub deleted: String,
}

impl ListsResponse {
    /// 生きているリストをリモートの並び順で返す
    pub fn into_records(self) -> Vec<ListRecord> {
        self.lists
            .list
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .filter(|l| l.deleted != "1")
            .map(|l| ListRecord::new(l.id, l.name))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct TasksResponse {
    pub tasks: Tasks,
}

#[derive(Debug, Deserialize)]
pub struct Tasks {
    #[serde(default)]
    pub list: Option<OneOrMany<TaskList>>,
}

#[derive(Debug, Deserialize)]
pub struct TaskList {
    pub id: String,
    #[serde(default)]
    pub taskseries: Option<OneOrMany<TaskSeries>>,
}

#[derive(Debug, Deserialize)]
pub struct TaskSeries {
    pub id: String,
    pub name: String,
    pub task: OneOrMany<TaskEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TaskEntry {
    pub id: String,
    #[serde(default)]
    pub completed: String,
    #[serde(default)]
    pub deleted: String,
}

impl TaskEntry {
    fn is_open(&self) -> bool {
        self.completed.is_empty() && self.deleted.is_empty()
    }
}

impl TaskList {
    fn into_series(self) -> Vec<TaskSeries> {
        self.taskseries.map(OneOrMany::into_vec).unwrap_or_default()
    }
}

impl TasksResponse {
    /// 未完了のタスクの発生ごとに要約を 1 つ返す
    pub fn into_summaries(self) -> Vec<TaskSummary> {
        let mut summaries = Vec::new();
        for list in self.tasks.list.map(OneOrMany::into_vec).unwrap_or_default() {
            for series in list.into_series() {
                for task in series.task.into_vec() {
                    if task.is_open() {
                        summaries.push(TaskSummary {
                            task_series_id: series.id.clone(),
                            task_id: task.id,
                            name: series.name.clone(),
                        });
                    }
                }
            }
        }
        summaries
    }
}

#[derive(Debug, Deserialize)]
pub struct Transaction {
    pub id: String,
}

/// `rtm.tasks.add` と `rtm.tasks.delete` は同じ形を返す
#[derive(Debug, Deserialize)]
pub struct TaskChangeResponse {
    pub transaction: Transaction,
    pub list: TaskList,
}

impl TaskChangeResponse {
    pub fn created(self) -> Result<CreatedTask, RemoteError> {
        let series = self
            .list
            .into_series()
            .into_iter()
            .next()
            .ok_or_else(|| malformed("no taskseries in response"))?;
        let task = series
            .task
            .into_vec()
            .into_iter()
            .next()
            .ok_or_else(|| malformed("no task in response"))?;
        Ok(CreatedTask {
            task_series_id: series.id,
            task_id: task.id,
        })
    }
}
