//! SessionState - 保留中の操作を入れる 2 つのスロット
//!
//! 会話セッションはちょうど 1 つで、操作も同時に 1 つしか動かないため、
//! スロットはロックなしの所有された状態です。
//!
//! # 契約
//! - `set` はコンテキストの種類のスロットを置き換える（上書きのみでマージしない）
//! - `take_*` はコンテキストをちょうど 1 回だけ消費する
//! - `clear_*` は消費せずに捨てる
//! - コンテキストは自然には失効しない。確認、拒否、取り消し、または次の操作で上書きされるまで残る

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ConfirmPending, ContextKind, PendingOperationContext, UndoPending};

/// SlotError はスロットの値をコンテキストとして読めなかったことを表す
#[derive(Debug, Error)]
pub enum SlotError {
    #[error("slot {slot} does not hold a valid context: {source}")]
    Malformed {
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("slot {slot} holds a context of the wrong kind")]
    WrongKind { slot: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    confirm: Option<ConfirmPending>,
    undo: Option<UndoPending>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, context: PendingOperationContext) {
        match context {
            PendingOperationContext::ConfirmPending(c) => self.confirm = Some(c),
            PendingOperationContext::UndoPending(u) => self.undo = Some(u),
        }
    }

    pub fn get(&self, kind: ContextKind) -> Option<PendingOperationContext> {
        match kind {
            ContextKind::Confirm => self.confirm.clone().map(Into::into),
            ContextKind::Undo => self.undo.clone().map(Into::into),
        }
    }

    pub fn confirm(&self) -> Option<&ConfirmPending> {
        self.confirm.as_ref()
    }

    pub fn undo(&self) -> Option<&UndoPending> {
        self.undo.as_ref()
    }

    pub fn take_confirm(&mut self) -> Option<ConfirmPending> {
        self.confirm.take()
    }

    pub fn take_undo(&mut self) -> Option<UndoPending> {
        self.undo.take()
    }

    pub fn clear(&mut self, kind: ContextKind) {
        match kind {
            ContextKind::Confirm => self.confirm = None,
            ContextKind::Undo => self.undo = None,
        }
    }

    pub fn clear_all(&mut self) {
        self.confirm = None;
        self.undo = None;
    }

    /// はい / いいえの発話を今受け付けられるか
    pub fn confirm_eligible(&self) -> bool {
        self.confirm.is_some()
    }

    /// 取り消しの発話を今受け付けられるか
    pub fn undo_eligible(&self) -> bool {
        self.undo.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.confirm.is_none() && self.undo.is_none()
    }

    /// 名前付きスロットで状態を持ち回るホスト向けに、生きているコンテキストを符号化する
    pub fn to_slots(&self) -> Result<BTreeMap<String, String>, serde_json::Error> {
        let mut slots = BTreeMap::new();
        for kind in [ContextKind::Confirm, ContextKind::Undo] {
            if let Some(context) = self.get(kind) {
                slots.insert(kind.slot_name().to_string(), context.to_json()?);
            }
        }
        Ok(slots)
    }

    /// [`SessionState::to_slots`] が作ったスロットからセッションを復元する。
    /// 知らないスロットは無視
    pub fn from_slots(slots: &BTreeMap<String, String>) -> Result<Self, SlotError> {
        let mut session = Self::new();
        for kind in [ContextKind::Confirm, ContextKind::Undo] {
            let slot = kind.slot_name();
            let Some(raw) = slots.get(slot) else {
                continue;
            };
            let context = PendingOperationContext::from_json(raw)
                .map_err(|source| SlotError::Malformed { slot, source })?;
            if context.kind() != kind {
                return Err(SlotError::WrongKind { slot });
            }
            session.set(context);
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProposedTask, TaskRecord};

    fn confirm(task: &str) -> ConfirmPending {
        ConfirmPending::add_task(ProposedTask::new(task, "l1", "groceries"))
    }

    fn undo(task_id: &str) -> UndoPending {
        UndoPending::add_task(TaskRecord {
            task_id: task_id.to_string(),
            task_series_id: "s1".to_string(),
            list_id: "l1".to_string(),
            list_name: "groceries".to_string(),
            task_name: "milk".to_string(),
        })
    }

    #[test]
    fn set_replaces_context_of_same_kind() {
        let mut session = SessionState::new();
        session.set(confirm("milk").into());
        session.set(confirm("eggs").into());

        let current = session.confirm().unwrap();
        assert_eq!(current.proposed_task.task_name, "eggs");
        assert!(!session.undo_eligible());
    }

    #[test]
    fn take_consumes_exactly_once() {
        let mut session = SessionState::new();
        session.set(undo("t1").into());

        assert!(session.take_undo().is_some());
        assert!(session.take_undo().is_none());
        assert!(session.is_empty());
    }

    #[test]
    fn kinds_coexist_until_cleared() {
        let mut session = SessionState::new();
        session.set(confirm("milk").into());
        session.set(undo("t1").into());
        assert!(session.confirm_eligible());
        assert!(session.undo_eligible());

        session.clear(ContextKind::Confirm);
        assert!(!session.confirm_eligible());
        assert!(session.undo_eligible());

        session.clear_all();
        assert!(session.is_empty());
    }

    #[test]
    fn slots_round_trip_through_host() {
        let mut session = SessionState::new();
        session.set(confirm("milk").into());
        session.set(undo("t1").into());

        let slots = session.to_slots().unwrap();
        assert_eq!(slots.len(), 2);
        assert!(slots.contains_key("ConfirmContext"));
        assert!(slots.contains_key("UndoContext"));

        let restored = SessionState::from_slots(&slots).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn slot_with_wrong_kind_is_rejected() {
        let mut slots = BTreeMap::new();
        let undo_json = PendingOperationContext::from(undo("t1")).to_json().unwrap();
        slots.insert("ConfirmContext".to_string(), undo_json);

        let err = SessionState::from_slots(&slots).unwrap_err();
        assert!(matches!(err, SlotError::WrongKind { slot: "ConfirmContext" }));
    }

    #[test]
    fn malformed_slot_is_rejected() {
        let mut slots = BTreeMap::new();
        slots.insert("UndoContext".to_string(), "not json".to_string());

        assert!(matches!(
            SessionState::from_slots(&slots),
            Err(SlotError::Malformed { .. })
        ));
    }
}
