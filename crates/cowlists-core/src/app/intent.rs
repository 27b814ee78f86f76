//! Intent - ホストから届く操作の引き金
//!
//! ホストのインテント解析器は操作名と文字列キーのスロットを渡してきます。
//! このモジュールはそれを型付きの [`Intent`] に変換します。

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::Operation;
use crate::domain::dialog::{LIST_PARAMETER, TASK_PARAMETER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Authenticate,
    GetToken,
    AddTaskToList { task_name: String, list_name: String },
    ReadList { list_name: String },
    Confirm,
    Decline,
    Undo,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("unknown intent '{0}'")]
    Unknown(String),

    #[error("intent '{intent}' requires slot '{slot}'")]
    MissingSlot { intent: String, slot: &'static str },
}

impl Intent {
    /// ホストのインテント名とスロットを型付きのインテントに対応付ける
    pub fn from_request(name: &str, slots: &HashMap<String, String>) -> Result<Self, IntentError> {
        let require = |slot: &'static str| {
            slots
                .get(slot)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| IntentError::MissingSlot {
                    intent: name.to_string(),
                    slot,
                })
        };

        match name {
            "AuthenticateIntent" => Ok(Intent::Authenticate),
            "GetTokenIntent" => Ok(Intent::GetToken),
            "AddTaskToListIntent" => Ok(Intent::AddTaskToList {
                task_name: require(TASK_PARAMETER)?,
                list_name: require(LIST_PARAMETER)?,
            }),
            "ReadListIntent" => Ok(Intent::ReadList {
                list_name: require(LIST_PARAMETER)?,
            }),
            "ConfirmIntent" => Ok(Intent::Confirm),
            "NoConfirmIntent" => Ok(Intent::Decline),
            "UndoIntent" => Ok(Intent::Undo),
            other => Err(IntentError::Unknown(other.to_string())),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Intent::Authenticate => Operation::Authenticate,
            Intent::GetToken => Operation::GetToken,
            Intent::AddTaskToList { .. } => Operation::AddTaskToList,
            Intent::ReadList { .. } => Operation::ReadList,
            Intent::Confirm => Operation::Confirm,
            Intent::Decline => Operation::Decline,
            Intent::Undo => Operation::Undo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn slots(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn add_task_reads_both_slots() {
        let intent = Intent::from_request(
            "AddTaskToListIntent",
            &slots(&[("taskName", "milk"), ("listName", "groceries")]),
        )
        .unwrap();

        assert_eq!(
            intent,
            Intent::AddTaskToList {
                task_name: "milk".to_string(),
                list_name: "groceries".to_string(),
            }
        );
        assert_eq!(intent.operation(), Operation::AddTaskToList);
    }

    #[rstest]
    #[case::no_list("AddTaskToListIntent", &[("taskName", "milk")], "listName")]
    #[case::blank_task("AddTaskToListIntent", &[("taskName", "  "), ("listName", "x")], "taskName")]
    #[case::read_without_list("ReadListIntent", &[], "listName")]
    fn missing_slots_are_reported(
        #[case] name: &str,
        #[case] pairs: &[(&str, &str)],
        #[case] missing: &str,
    ) {
        let err = Intent::from_request(name, &slots(pairs)).unwrap_err();
        assert!(matches!(err, IntentError::MissingSlot { slot, .. } if slot == missing));
    }

    #[rstest]
    #[case("AuthenticateIntent", Intent::Authenticate)]
    #[case("GetTokenIntent", Intent::GetToken)]
    #[case("ConfirmIntent", Intent::Confirm)]
    #[case("NoConfirmIntent", Intent::Decline)]
    #[case("UndoIntent", Intent::Undo)]
    fn slotless_intents(#[case] name: &str, #[case] expected: Intent) {
        assert_eq!(Intent::from_request(name, &HashMap::new()).unwrap(), expected);
    }

    #[test]
    fn unknown_intent_is_rejected() {
        let err = Intent::from_request("DanceIntent", &HashMap::new()).unwrap_err();
        assert_eq!(err, IntentError::Unknown("DanceIntent".to_string()));
    }
}
