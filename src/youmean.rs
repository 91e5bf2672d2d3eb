//! Suggestions for mistyped names
//!
//! Unknown names are compared against every registered name with the
//! Gestalt (Ratcliff/Obershelp) similarity: twice the number of matching
//! characters over the total length, where matches are found by picking
//! the longest common substring and recursing into what is left on both
//! sides. Case and punctuation are folded before comparison so that
//! `--MY_OPT` still finds `--my-opt`.

use crate::validate::Registry;

/// similarity threshold below which a name is not worth suggesting
pub(crate) const SIMILARITY_THRESHOLD: f64 = 0.6;

fn fold(name: &str) -> Vec<char> {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// longest common substring, returns (start in a, start in b, length)
fn common_substring(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // row-by-row suffix lengths, names are short so quadratic is fine
    let mut prev = vec![0usize; b.len() + 1];
    for (ai, &ac) in a.iter().enumerate() {
        let mut row = vec![0usize; b.len() + 1];
        for (bi, &bc) in b.iter().enumerate() {
            if ac == bc {
                let len = prev[bi] + 1;
                row[bi + 1] = len;
                if len > best.2 {
                    best = (ai + 1 - len, bi + 1 - len, len);
                }
            }
        }
        prev = row;
    }
    best
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (ai, bi, len) = common_substring(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..ai], &b[..bi]) + matching_chars(&a[ai + len..], &b[bi + len..])
}

/// Gestalt similarity of two names after folding, in `[0, 1]`
pub(crate) fn gestalt(a: &str, b: &str) -> f64 {
    let a = fold(a);
    let b = fold(b);
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / (a.len() + b.len()) as f64
}

/// Registered names similar to the unknown one, best first
pub(crate) fn similar_names(unknown: &str, registry: &Registry) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = registry
        .names
        .keys()
        .map(|name| (gestalt(unknown, name), name.as_str()))
        .filter(|(score, _)| *score >= SIMILARITY_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, name)| name.to_string()).collect()
}
