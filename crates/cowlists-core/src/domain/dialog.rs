//! Dialog - 読み上げ出力のモデル
//!
//! コアは文章を組み立てません。ユーザー向けの出力はすべて [`Dialog`]
//! （テンプレートキーとパラメータ）か、そのまま読む [`Speech::Text`] です。
//! テンプレートとローカライズはホスト層が持ちます。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const TASK_PARAMETER: &str = "taskName";
pub const LIST_PARAMETER: &str = "listName";
pub const BEST_MATCH_PARAMETER: &str = "bestMatch";
pub const ERROR_TEXT_PARAMETER: &str = "errorText";
pub const ERROR_CODE_PARAMETER: &str = "errorCode";
pub const FUNCTION_NAME_PARAMETER: &str = "functionName";
pub const LINE_PARAMETER: &str = "lineNumber";
pub const NOF_TASK_PARAMETER: &str = "nofTask";

/// DialogKey はホストのダイアログ層が解釈するテンプレートキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogKey {
    ConfigNotFound,
    InAuthentication,
    NotAuthenticated,
    RestResponseError,
    AddTaskToList,
    AddTaskToListUndo,
    AddTaskToListMismatch,
    TokenValid,
    EmailSent,
    AuthenticateBeforeToken,
    GotToken,
    ReadList,
    ReadListOneItem,
    GeneralError,
    NoConfirm,
}

impl DialogKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogKey::ConfigNotFound => "ConfigNotFound",
            DialogKey::InAuthentication => "InAuthentication",
            DialogKey::NotAuthenticated => "NotAuthenticated",
            DialogKey::RestResponseError => "RestResponseError",
            DialogKey::AddTaskToList => "AddTaskToList",
            DialogKey::AddTaskToListUndo => "AddTaskToListUndo",
            DialogKey::AddTaskToListMismatch => "AddTaskToListMismatch",
            DialogKey::TokenValid => "TokenValid",
            DialogKey::EmailSent => "EmailSent",
            DialogKey::AuthenticateBeforeToken => "AuthenticateBeforeToken",
            DialogKey::GotToken => "GotToken",
            DialogKey::ReadList => "ReadList",
            DialogKey::ReadListOneItem => "ReadListOneItem",
            DialogKey::GeneralError => "GeneralError",
            DialogKey::NoConfirm => "NoConfirm",
        }
    }
}

impl fmt::Display for DialogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ダイアログのパラメータ。出力が決定的になるよう順序付き
pub type DialogParams = BTreeMap<String, String>;

/// Dialog はテンプレート 1 つの読み上げ要求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    pub key: DialogKey,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: DialogParams,
}

impl Dialog {
    pub fn new(key: DialogKey) -> Self {
        Self {
            key,
            params: DialogParams::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Speech は読み上げ出力の 1 単位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Speech {
    Dialog(Dialog),
    /// そのまま読み上げる文字列（リスト読み上げ中のタスク名など）
    Text(String),
}

/// Reply は 1 つの操作がホストに読ませる出力を順に並べたもの
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub speech: Vec<Speech>,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dialog(dialog: Dialog) -> Self {
        Self {
            speech: vec![Speech::Dialog(dialog)],
        }
    }

    pub fn push_dialog(&mut self, dialog: Dialog) {
        self.speech.push(Speech::Dialog(dialog));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.speech.push(Speech::Text(text.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.speech.is_empty()
    }

    pub fn dialogs(&self) -> impl Iterator<Item = &Dialog> {
        self.speech.iter().filter_map(|s| match s {
            Speech::Dialog(d) => Some(d),
            Speech::Text(_) => None,
        })
    }

    /// 先頭のダイアログのキー
    pub fn first_key(&self) -> Option<DialogKey> {
        self.dialogs().next().map(|d| d.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_key_serializes_as_template_name() {
        let json = serde_json::to_string(&DialogKey::AddTaskToListMismatch).unwrap();
        assert_eq!(json, "\"AddTaskToListMismatch\"");
        assert_eq!(DialogKey::AddTaskToListMismatch.to_string(), "AddTaskToListMismatch");
    }

    #[test]
    fn reply_keeps_order_of_dialogs_and_text() {
        let mut reply = Reply::new();
        reply.push_dialog(Dialog::new(DialogKey::ReadList).with(NOF_TASK_PARAMETER, "2"));
        reply.push_text("milk");
        reply.push_text("eggs");

        assert_eq!(reply.first_key(), Some(DialogKey::ReadList));
        assert_eq!(reply.dialogs().count(), 1);
        assert_eq!(reply.speech[2], Speech::Text("eggs".to_string()));
    }
}
