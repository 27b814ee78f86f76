//! Domain - ドメインモデル
//!
//! レコード、ダイアログ、保留コンテキスト、認証状態、エラーを定義します。
//! ここにはネットワークに触れるコードも、可変のセッション状態もありません。

pub mod auth;
pub mod context;
pub mod dialog;
pub mod errors;
pub mod list;
pub mod operation;
pub mod task;

pub use self::auth::{AuthState, TokenState};
pub use self::context::{ConfirmPending, ContextKind, PendingOperationContext, UndoPending};
pub use self::dialog::{Dialog, DialogKey, DialogParams, Reply, Speech};
pub use self::errors::{AuthFailure, OperationError, RemoteError};
pub use self::list::ListRecord;
pub use self::operation::Operation;
pub use self::task::{CreatedTask, ProposedTask, TaskRecord, TaskSummary};
