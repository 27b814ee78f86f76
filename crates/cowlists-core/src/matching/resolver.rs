//! FuzzyListResolver - 発話されたリスト名を実在のリストに対応付ける

use tracing::debug;

use super::score::extract_one;
use crate::domain::ListRecord;

/// ユーザーに確認せずに採用する一致度
pub const EXACT_MATCH: u8 = 100;

/// ListMatch は発話されたリスト名に最も近い一致
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMatch {
    /// 一致したリストの小文字化した名前
    pub name: String,
    pub list_id: String,
    /// 0..=100
    pub confidence: u8,
}

impl ListMatch {
    pub fn is_exact(&self) -> bool {
        self.confidence >= EXACT_MATCH
    }
}

/// FuzzyListResolver は決定的な 2 段階の照合器
///
/// # 設計
/// スロット抽出で発話から "list" という語が落ちるため、1 段目では
/// `"<spoken> list"` で照合し、"X list" という名前のリストを拾います。
/// 完全一致でなければ、2 段目で発話そのままの名前を照合します。
///
/// 小文字化して同じ名前になるリストは区別できず、リモートの並び順で先のものを採ります。
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyListResolver;

impl FuzzyListResolver {
    pub fn new() -> Self {
        Self
    }

    /// 照合するリストが 1 つもないときだけ `None`
    pub fn resolve(&self, spoken: &str, lists: &[ListRecord]) -> Option<ListMatch> {
        let candidates: Vec<String> = lists.iter().map(ListRecord::match_key).collect();

        let (mut index, mut confidence) = extract_one(&format!("{spoken} list"), &candidates)?;
        if confidence < EXACT_MATCH {
            (index, confidence) = extract_one(spoken, &candidates)?;
        }

        let name = candidates[index].clone();
        let list = lists.iter().find(|list| list.match_key() == name)?;
        debug!(spoken, matched = %name, confidence, "resolved list name");

        Some(ListMatch {
            name,
            list_id: list.id.clone(),
            confidence,
        })
    }
}
