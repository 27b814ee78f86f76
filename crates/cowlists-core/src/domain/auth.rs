//! Auth - 認証状態
//!
//! 認証状態は操作のたびにリモートサービスから導出し、操作をまたいでキャッシュしません。
//! トークンはサーバー側でいつでも失効しうるためです。

use serde::{Deserialize, Serialize};

/// TokenState はこのセッションでリモートサービスが保持しているもの
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    /// 長期の認証トークンが保存されている
    pub has_token: bool,
    /// ハンドシェイク（frob）を要求済みで、まだ交換していない
    pub handshake_pending: bool,
}

/// AuthState は `operation_init` が使う粗い認証状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// トークンがある。有効かどうかはリモートで確認するまで分からない
    TokenPresent,
    /// トークンはないが、認可リンクは送信済み
    HandshakePending,
    /// 何もない。先に認証が必要
    Unauthenticated,
}

impl From<TokenState> for AuthState {
    fn from(state: TokenState) -> Self {
        if state.has_token {
            AuthState::TokenPresent
        } else if state.handshake_pending {
            AuthState::HandshakePending
        } else {
            AuthState::Unauthenticated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::token_wins(true, true, AuthState::TokenPresent)]
    #[case::token_only(true, false, AuthState::TokenPresent)]
    #[case::handshake(false, true, AuthState::HandshakePending)]
    #[case::nothing(false, false, AuthState::Unauthenticated)]
    fn auth_state_from_token_state(
        #[case] has_token: bool,
        #[case] handshake_pending: bool,
        #[case] expected: AuthState,
    ) {
        let state = TokenState {
            has_token,
            handshake_pending,
        };
        assert_eq!(AuthState::from(state), expected);
    }
}
