//! List - リモートのリストのスナップショット

use serde::{Deserialize, Serialize};

/// ListRecord はタスクを入れる名前付きのリモートのリスト
///
/// リモートサービスが所有し、コアからは読み取り専用です。
/// キャッシュはせず、照合のたびに取得し直したスナップショットを使います。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListRecord {
    pub id: String,
    pub name: String,
}

impl ListRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// 照合に使う名前（小文字化のみ）
    pub fn match_key(&self) -> String {
        self.name.to_lowercase()
    }
}
