//! Operation - オーケストレータが公開する操作
//!
//! 新しい操作はコンテキストを捨ててから始まり、
//! 追従操作（Confirm / Decline / Undo）は既存のコンテキストを消費します。

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operation はユーザー操作 1 つを表す
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Authenticate,
    GetToken,
    AddTaskToList,
    ReadList,
    Confirm,
    Decline,
    Undo,
}

impl Operation {
    /// `GeneralError` で読み上げる操作名
    pub fn function_name(&self) -> &'static str {
        match self {
            Operation::Authenticate => "authenticate intent",
            Operation::GetToken => "get token intent",
            Operation::AddTaskToList => "add task to list intent",
            Operation::ReadList => "read list intent",
            Operation::Confirm => "confirm intent",
            Operation::Decline => "no confirm intent",
            Operation::Undo => "undo intent",
        }
    }

    /// 開始時に古いコンテキストをすべて破棄する操作か
    pub fn clears_contexts(&self) -> bool {
        !matches!(self, Operation::Confirm | Operation::Decline | Operation::Undo)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::authenticate(Operation::Authenticate, true)]
    #[case::get_token(Operation::GetToken, true)]
    #[case::add_task(Operation::AddTaskToList, true)]
    #[case::read_list(Operation::ReadList, true)]
    #[case::confirm(Operation::Confirm, false)]
    #[case::decline(Operation::Decline, false)]
    #[case::undo(Operation::Undo, false)]
    fn only_fresh_operations_clear_contexts(#[case] operation: Operation, #[case] expected: bool) {
        assert_eq!(operation.clears_contexts(), expected);
    }

    #[test]
    fn display_uses_function_name() {
        assert_eq!(Operation::Decline.to_string(), "no confirm intent");
    }
}
