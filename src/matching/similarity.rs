/// Threshold for accepting a cross-venue event title match.
pub const TITLE_MATCH_THRESHOLD: f64 = 0.4;
/// Threshold for open-ended label matching (series names, team nicknames).
pub const LABEL_MATCH_THRESHOLD: f64 = 0.5;

/// Ratcliff/Obershelp similarity: `2 * matched / (len(a) + len(b))`, in [0, 1].
/// Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, k) = longest_common_block(a, b);
    if k == 0 {
        return 0;
    }
    k + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + k..], &b[j + k..])
}

/// Longest common substring as (start_a, start_b, len); earliest in `a` on ties.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut cur = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let k = prev[j] + 1;
                cur[j + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        prev = cur;
    }
    best
}

/// Index and score of the candidate most similar to `target` (case-insensitive).
/// Empty candidates are skipped; the first of equal scores wins. `None` when the
/// best score is under `threshold`.
pub fn find_best_match<'a, I>(target: &str, candidates: I, threshold: f64) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let target = target.to_lowercase();
    let mut best: Option<(usize, f64)> = None;

    for (idx, cand) in candidates.into_iter().enumerate() {
        let cand = cand.to_lowercase();
        if cand.is_empty() {
            continue;
        }
        let score = ratio(&target, &cand);
        if best.map_or(score > 0.0, |(_, s)| score > s) {
            best = Some((idx, score));
        }
    }

    best.filter(|(_, score)| *score >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        assert!(approx(ratio("chiefs vs ravens", "chiefs vs ravens"), 1.0));
        assert!(approx(ratio("", ""), 1.0));
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(approx(ratio("abc", "xyz"), 0.0));
        assert!(approx(ratio("abc", ""), 0.0));
    }

    #[test]
    fn known_ratios() {
        // Matching blocks "ab" + "d" -> 2*3/8.
        assert!(approx(ratio("abcd", "abxd"), 0.75));
        // Classic example: "a" "b" "c"... from abcde vs ace -> 2*3/8.
        assert!(approx(ratio("abcde", "ace"), 0.75));
    }

    #[test]
    fn ratio_is_symmetric_for_simple_inputs() {
        assert!(approx(ratio("seahawks vs rams", "rams vs seahawks"), ratio("rams vs seahawks", "seahawks vs rams")));
    }

    #[test]
    fn best_match_picks_highest_score() {
        let cands = ["Lakers vs Warriors", "Chiefs vs Ravens", "Chiefs vs Bills"];
        let (idx, score) = find_best_match("chiefs vs ravens", cands, TITLE_MATCH_THRESHOLD).unwrap();
        assert_eq!(idx, 1);
        assert!(approx(score, 1.0));
    }

    #[test]
    fn best_match_skips_empty_and_respects_threshold() {
        assert!(find_best_match("chiefs vs ravens", ["", "zzzz"], TITLE_MATCH_THRESHOLD).is_none());
        assert!(find_best_match("anything", std::iter::empty::<&str>(), 0.0).is_none());
    }

    #[test]
    fn best_match_is_case_insensitive() {
        let (idx, _) = find_best_match("NFL", ["nba", "nfl"], LABEL_MATCH_THRESHOLD).unwrap();
        assert_eq!(idx, 1);
    }
}
