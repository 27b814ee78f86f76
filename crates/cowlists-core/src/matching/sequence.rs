//! Sequence - 最長一致ブロックによる列の比較
//!
//! 古典的な "gestalt pattern matching" と同じ規則でブロックを探します。
//! 最長の共通ブロック（同じ長さなら `a` で先、次に `b` で先のもの）を取り、
//! 左右を再帰的に処理します。入力は短いリスト名なので junk の判定はしません。

use std::collections::HashMap;

/// 一致ブロック: `a[a_start..a_start + len] == b[b_start..b_start + len]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

pub struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b_index: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    pub fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, ch) in b.iter().enumerate() {
            b_index.entry(*ch).or_default().push(j);
        }
        Self { a, b, b_index }
    }

    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchBlock {
        let mut best = MatchBlock {
            a_start: alo,
            b_start: blo,
            len: 0,
        };
        // run length of the match ending at (i - 1, j), keyed by j
        let mut run_ending: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_run: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b_index.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let previous = if j > 0 {
                        run_ending.get(&(j - 1)).copied().unwrap_or(0)
                    } else {
                        0
                    };
                    let k = previous + 1;
                    next_run.insert(j, k);
                    if k > best.len {
                        best = MatchBlock {
                            a_start: i + 1 - k,
                            b_start: j + 1 - k,
                            len: k,
                        };
                    }
                }
            }
            run_ending = next_run;
        }

        best
    }

    /// 隣接しない一致ブロックを昇順に返す。末尾は長さ 0 の番兵
    /// `(len(a), len(b), 0)`
    pub fn matching_blocks(&self) -> Vec<MatchBlock> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut pending = vec![(0, la, 0, lb)];
        let mut found = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);
            if block.len == 0 {
                continue;
            }
            found.push(block);
            if alo < block.a_start && blo < block.b_start {
                pending.push((alo, block.a_start, blo, block.b_start));
            }
            if block.a_start + block.len < ahi && block.b_start + block.len < bhi {
                pending.push((block.a_start + block.len, ahi, block.b_start + block.len, bhi));
            }
        }
        found.sort();

        let mut collapsed = Vec::with_capacity(found.len() + 1);
        let mut current = MatchBlock {
            a_start: 0,
            b_start: 0,
            len: 0,
        };
        for block in found {
            if current.a_start + current.len == block.a_start
                && current.b_start + current.len == block.b_start
            {
                current.len += block.len;
            } else {
                if current.len > 0 {
                    collapsed.push(current);
                }
                current = block;
            }
        }
        if current.len > 0 {
            collapsed.push(current);
        }
        collapsed.push(MatchBlock {
            a_start: la,
            b_start: lb,
            len: 0,
        });
        collapsed
    }

    /// `[0, 1]` の類似度: `2 * matched / (len(a) + len(b))`
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|b| b.len).sum();
        2.0 * matched as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn matching_blocks_end_with_sentinel() {
        let a = chars("abxcd");
        let b = chars("abcd");
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();

        assert_eq!(
            blocks,
            vec![
                MatchBlock { a_start: 0, b_start: 0, len: 2 },
                MatchBlock { a_start: 3, b_start: 2, len: 2 },
                MatchBlock { a_start: 5, b_start: 4, len: 0 },
            ]
        );
    }

    #[test]
    fn longest_match_prefers_earliest_block() {
        let a = chars("abab");
        let b = chars("ab");
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();

        assert_eq!(blocks[0], MatchBlock { a_start: 0, b_start: 0, len: 2 });
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn ratio_counts_matched_characters() {
        let a = chars("abcd");
        let b = chars("abce");
        assert_eq!(SequenceMatcher::new(&a, &b).ratio(), 0.75);

        let empty: Vec<char> = Vec::new();
        assert_eq!(SequenceMatcher::new(&empty, &empty).ratio(), 1.0);
        assert_eq!(SequenceMatcher::new(&a, &empty).ratio(), 0.0);
    }
}
