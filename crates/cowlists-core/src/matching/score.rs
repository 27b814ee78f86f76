//! Score - トークン単位の類似度スコア（0-100）
//!
//! [`weighted_ratio`] は 2 つの文字列の長さの差に応じて、いくつかの方式の最大値を採ります。
//!
//! # 方式
//! - 前処理後の文字列どうしの単純な類似度
//! - token-sort / token-set 類似度（語順と重複を無視）
//! - 一方が 1.5 倍以上長いときの partial 系（最もよく揃う部分文字列）。
//!   0.9 倍（8 倍を超えると 0.6 倍）に割り引く
//!
//! スコアは偶数丸めで、100 になるのは前処理後の文字列が等しいときだけです。

use std::collections::BTreeSet;

use super::sequence::SequenceMatcher;

const UNBASE_SCALE: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.90;
const LONG_PARTIAL_SCALE: f64 = 0.60;

/// Latin-1 補助の文字を落とし、単語以外の文字を空白に置き換え、
/// 小文字化して前後の空白を除く
pub fn full_process(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(|c| !(0x80..=0xff).contains(&u32::from(*c)))
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    cleaned.to_lowercase().trim().to_string()
}

fn round_score(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 100.0) as u8
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn raw_ratio(a: &[char], b: &[char]) -> f64 {
    SequenceMatcher::new(a, b).ratio()
}

pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    round_score(100.0 * raw_ratio(&chars(a), &chars(b)))
}

/// 短い方の文字列と、長い方で最もよく揃う区間との類似度
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (a, b) = (chars(a), chars(b));
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut best = 0.0_f64;
    for block in SequenceMatcher::new(&shorter, &longer).matching_blocks() {
        let start = block.b_start.saturating_sub(block.a_start);
        let end = (start + shorter.len()).min(longer.len());
        let window = &longer[start..end];
        let r = raw_ratio(&shorter, window);
        if r > 0.995 {
            return 100;
        }
        best = best.max(r);
    }
    round_score(100.0 * best)
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

pub fn token_sort_ratio(a: &str, b: &str, partial: bool) -> u8 {
    let (a, b) = (sorted_tokens(a), sorted_tokens(b));
    if partial {
        partial_ratio(&a, &b)
    } else {
        ratio(&a, &b)
    }
}

pub fn token_set_ratio(a: &str, b: &str, partial: bool) -> u8 {
    if a == b {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |set: Vec<&str>| set.join(" ");
    let common = join(tokens_a.intersection(&tokens_b).copied().collect());
    let only_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let only_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined_a = format!("{common} {only_a}").trim().to_string();
    let combined_b = format!("{common} {only_b}").trim().to_string();
    let common = common.trim();

    let score = |x: &str, y: &str| if partial { partial_ratio(x, y) } else { ratio(x, y) };
    [
        score(common, &combined_a),
        score(common, &combined_b),
        score(&combined_a, &combined_b),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

/// 前処理済みの 2 つの文字列の重み付き類似度
pub fn weighted_ratio_processed(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = ratio(a, b) as f64;
    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    if len_ratio < 1.5 {
        let sort = token_sort_ratio(a, b, false) as f64 * UNBASE_SCALE;
        let set = token_set_ratio(a, b, false) as f64 * UNBASE_SCALE;
        return round_score(base.max(sort).max(set));
    }

    let partial_scale = if len_ratio > 8.0 {
        LONG_PARTIAL_SCALE
    } else {
        PARTIAL_SCALE
    };
    let partial = partial_ratio(a, b) as f64 * partial_scale;
    let sort = token_sort_ratio(a, b, true) as f64 * UNBASE_SCALE * partial_scale;
    let set = token_set_ratio(a, b, true) as f64 * UNBASE_SCALE * partial_scale;
    round_score(base.max(partial).max(sort).max(set))
}

pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    weighted_ratio_processed(&full_process(a), &full_process(b))
}

/// 最高スコアの候補を `(index, score)` で返す。同点なら先の候補
pub fn extract_one<S: AsRef<str>>(query: &str, choices: &[S]) -> Option<(usize, u8)> {
    let query = full_process(query);
    let mut best: Option<(usize, u8)> = None;
    for (index, choice) in choices.iter().enumerate() {
        let score = weighted_ratio_processed(&query, &full_process(choice.as_ref()));
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best
}
