// Text similarity and diff summaries
//
// Similarity is a sequence-matcher ratio over characters: twice the number
// of matched characters over the combined length. It drives both
// convergence detection and the improvement score.

use std::collections::{BTreeSet, HashMap};

/// Sentinel returned by [`diff_summary`] for identical texts.
pub const NO_CHANGES: &str = "No changes made.";

/// Similarity ratio between two texts, 0.0 to 1.0.
///
/// 1.0 for identical strings, near 0.0 for disjoint content, monotonic
/// under partial overlap. Two empty strings are identical.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Total length of the matching blocks between `a` and `b`, found by
/// recursively taking the longest common run and matching to its left and
/// right.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    // char -> positions in b, for O(occurrences) inner-loop lookups
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &ch) in b.iter().enumerate() {
        b2j.entry(ch).or_default().push(j);
    }

    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size > 0 {
            total += size;
            pending.push((alo, i, blo, j));
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    total
}

fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    // j -> length of longest run ending at a[i], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for i in alo..ahi {
        let mut new_j2len = HashMap::new();
        if let Some(positions) = b2j.get(&a[i]) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let run = if j > 0 {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                new_j2len.insert(j, run);
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        j2len = new_j2len;
    }
    best
}

/// Human-readable summary of what changed between two text versions.
///
/// Reports up to five removed and five added words plus a note when the
/// length shifted by more than 50 characters.
pub fn diff_summary(original: &str, revised: &str) -> String {
    if original == revised {
        return NO_CHANGES.to_string();
    }

    let original_words = word_set(original);
    let revised_words = word_set(revised);

    let removed: Vec<&String> = original_words.difference(&revised_words).take(5).collect();
    let added: Vec<&String> = revised_words.difference(&original_words).take(5).collect();

    let mut parts = Vec::new();
    if !removed.is_empty() {
        parts.push(format!("Removed concepts: {}", join_words(&removed)));
    }
    if !added.is_empty() {
        parts.push(format!("Added concepts: {}", join_words(&added)));
    }

    let len_diff = revised.chars().count() as i64 - original.chars().count() as i64;
    if len_diff.abs() > 50 {
        if len_diff > 0 {
            parts.push(format!("Response expanded by ~{} characters", len_diff));
        } else {
            parts.push(format!("Response shortened by ~{} characters", -len_diff));
        }
    }

    if parts.is_empty() {
        "Minor phrasing changes.".to_string()
    } else {
        parts.join(" | ")
    }
}

fn word_set(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

fn join_words(words: &[&String]) -> String {
    words
        .iter()
        .map(|w| w.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_have_similarity_one() {
        assert_eq!(text_similarity("hello world", "hello world"), 1.0);
        assert_eq!(text_similarity("", ""), 1.0);
    }

    #[test]
    fn test_disjoint_strings_have_similarity_zero() {
        assert_eq!(text_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = "the quick brown fox";
        let b = "the quick red fox jumps";
        assert!((text_similarity(a, b) - text_similarity(b, a)).abs() < 1e-12);
    }

    #[test]
    fn test_partial_overlap_is_between_zero_and_one() {
        let s = text_similarity("hello world", "hello there");
        assert!(s > 0.0 && s < 1.0);
    }

    #[test]
    fn test_empty_versus_nonempty() {
        assert_eq!(text_similarity("", "abc"), 0.0);
    }

    #[test]
    fn test_diff_summary_no_changes() {
        assert_eq!(diff_summary("same text", "same text"), NO_CHANGES);
        assert_eq!(diff_summary("", ""), NO_CHANGES);
    }

    #[test]
    fn test_diff_summary_reports_added_and_removed() {
        let summary = diff_summary("alpha beta gamma", "alpha delta gamma");
        assert!(summary.contains("Removed concepts: beta"));
        assert!(summary.contains("Added concepts: delta"));
        assert!(summary.contains(" | "));
    }

    #[test]
    fn test_diff_summary_reports_expansion() {
        let original = "short";
        let revised = format!("short {}", "x".repeat(100));
        let summary = diff_summary(original, &revised);
        assert!(summary.contains("expanded by"));
    }

    #[test]
    fn test_diff_summary_reports_shortening() {
        let original = format!("keep {}", "y".repeat(100));
        let summary = diff_summary(&original, "keep");
        assert!(summary.contains("shortened by"));
    }

    #[test]
    fn test_diff_summary_minor_changes() {
        // Same word set, small length delta, but not byte-identical
        let summary = diff_summary("Word word", "word Word");
        assert_eq!(summary, "Minor phrasing changes.");
    }

    #[test]
    fn test_diff_summary_caps_examples_at_five() {
        let original = "a b c d e f g h";
        let summary = diff_summary(original, "z");
        let removed_part = summary
            .split(" | ")
            .find(|p| p.starts_with("Removed concepts:"))
            .unwrap();
        assert_eq!(removed_part.matches(',').count(), 4);
    }
}
