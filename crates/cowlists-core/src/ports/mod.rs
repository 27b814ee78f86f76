//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! オーケストレーターはこれらの trait だけに依存し、
//! REST クライアントや通知手段の詳細を知りません。

pub mod clock;
pub mod id_generator;
pub mod notifier;
pub mod remote_tasks;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::notifier::{AuthLinkNotifier, NotifyError};
pub use self::remote_tasks::RemoteTaskService;
