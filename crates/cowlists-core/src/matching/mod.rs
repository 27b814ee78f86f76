//! Matching - リスト名のファジーマッチ
//!
//! - **sequence**: 一致ブロックの探索と基本の類似度
//! - **score**: トークン単位のスコアと重み付き類似度
//! - **resolver**: 発話されたリスト名を 2 段階でリストに対応付け

pub mod resolver;
pub mod score;
pub mod sequence;

pub use self::resolver::{EXACT_MATCH, FuzzyListResolver, ListMatch};
pub use self::score::{extract_one, weighted_ratio};
