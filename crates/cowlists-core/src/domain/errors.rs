//! Errors - エラーの分類
//!
//! 各操作の入口が最終的なエラー境界です。[`OperationError`] はオーケストレータの外へ出ず、
//! [`OperationError::dialog`] でユーザー向けのダイアログ 1 つに変換されます。
//!
//! # 対応表
//!
//! | Variant          | Dialog                                           |
//! |------------------|--------------------------------------------------|
//! | `Configuration`  | `ConfigNotFound`                                 |
//! | `Authentication` | `InAuthentication` / `NotAuthenticated` / `AuthenticateBeforeToken` |
//! | `Remote`         | `RestResponseError` (code + text verbatim)       |
//! | `Unexpected`     | `GeneralError` (operation name + line)           |

use std::panic::Location;

use thiserror::Error;

use super::dialog::{
    Dialog, DialogKey, ERROR_CODE_PARAMETER, ERROR_TEXT_PARAMETER, FUNCTION_NAME_PARAMETER,
    LINE_PARAMETER,
};
use super::operation::Operation;

/// 無効または期限切れの認証トークンを表すリモートのエラーコード
pub const INVALID_TOKEN_CODE: &str = "98";

/// RemoteError はすべてのリモート呼び出しに共通する失敗の形
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote error {code}: {text}")]
pub struct RemoteError {
    pub code: String,
    pub text: String,
}

impl RemoteError {
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
        }
    }

    pub fn is_invalid_token(&self) -> bool {
        self.code == INVALID_TOKEN_CODE
    }
}

/// AuthFailure は認証が必要な操作を進められない理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// リンクは送信済みだが、まだトークンに交換されていない
    #[error("authorization handshake is pending")]
    HandshakePending,

    /// トークンもハンドシェイクもない。新しいハンドシェイクが必要
    #[error("not authenticated")]
    NotAuthenticated,

    /// ハンドシェイクなしでトークン交換が要求された
    #[error("no authorization handshake to exchange")]
    NoHandshake,
}

impl AuthFailure {
    fn dialog_key(&self) -> DialogKey {
        match self {
            AuthFailure::HandshakePending => DialogKey::InAuthentication,
            AuthFailure::NotAuthenticated => DialogKey::NotAuthenticated,
            AuthFailure::NoHandshake => DialogKey::AuthenticateBeforeToken,
        }
    }
}

/// OperationError はオーケストレータの 1 ステップの失敗
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("api key or secret not configured")]
    Configuration,

    #[error(transparent)]
    Authentication(#[from] AuthFailure),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("{message} (at {location})")]
    Unexpected {
        message: String,
        location: &'static Location<'static>,
    },
}

impl OperationError {
    /// 個別の扱いがない障害。呼び出し元の位置を記録する
    #[track_caller]
    pub fn unexpected(message: impl Into<String>) -> Self {
        OperationError::Unexpected {
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// `operation` についてこのエラーを伝える唯一のダイアログ
    pub fn dialog(&self, operation: Operation) -> Dialog {
        match self {
            OperationError::Configuration => Dialog::new(DialogKey::ConfigNotFound),
            OperationError::Authentication(failure) => Dialog::new(failure.dialog_key()),
            OperationError::Remote(err) => remote_error_dialog(err),
            OperationError::Unexpected { location, .. } => {
                general_error_dialog(operation, &location.line().to_string())
            }
        }
    }
}

pub fn remote_error_dialog(err: &RemoteError) -> Dialog {
    Dialog::new(DialogKey::RestResponseError)
        .with(ERROR_TEXT_PARAMETER, err.text.clone())
        .with(ERROR_CODE_PARAMETER, err.code.clone())
}

pub fn general_error_dialog(operation: Operation, line: &str) -> Dialog {
    Dialog::new(DialogKey::GeneralError)
        .with(FUNCTION_NAME_PARAMETER, operation.function_name())
        .with(LINE_PARAMETER, line)
}
