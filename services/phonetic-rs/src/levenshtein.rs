//! Edit distance over opaque token sequences.

use rayon::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

/// Standard Levenshtein distance using dynamic programming.
///
/// Tokens are compared as whole units, so `["tʰ", "a"]` and `["t", "a"]`
/// differ by one substitution rather than one deletion.
pub fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let len_a = a.len();
    let len_b = b.len();

    if len_a == 0 {
        return len_b;
    }
    if len_b == 0 {
        return len_a;
    }

    let mut prev_row: Vec<usize> = (0..=len_b).collect();
    let mut curr_row = vec![0; len_b + 1];

    for (i, seg_a) in a.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, seg_b) in b.iter().enumerate() {
            let cost = if seg_a == seg_b { 0 } else { 1 };

            curr_row[j + 1] = std::cmp::min(
                std::cmp::min(
                    curr_row[j] + 1,     // insertion
                    prev_row[j + 1] + 1, // deletion
                ),
                prev_row[j] + cost, // substitution
            );
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len_b]
}

/// Distance between two sound-class signatures.
///
/// Signatures are compared one user-perceived character at a time.
pub fn signature_distance(sig_a: &str, sig_b: &str) -> usize {
    let chars_a: Vec<&str> = sig_a.graphemes(true).collect();
    let chars_b: Vec<&str> = sig_b.graphemes(true).collect();
    levenshtein(&chars_a, &chars_b)
}

/// Token distances for many pairs, computed in parallel; output order
/// matches input order.
pub fn batch_levenshtein<T: PartialEq + Sync>(pairs: &[(Vec<T>, Vec<T>)]) -> Vec<usize> {
    pairs.par_iter().map(|(a, b)| levenshtein(a, b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_identical() {
        assert_eq!(levenshtein(&toks("p a t"), &toks("p a t")), 0);
    }

    #[test]
    fn test_empty_sides() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(levenshtein(&empty, &toks("a b c")), 3);
        assert_eq!(levenshtein(&toks("a b"), &empty), 2);
        assert_eq!(levenshtein(&empty, &empty), 0);
    }

    #[test]
    fn test_multichar_tokens_are_atomic() {
        assert_eq!(levenshtein(&toks("tʰ a"), &toks("t a")), 1);
        assert_eq!(levenshtein(&toks("k a t"), &toks("k a")), 1);
        assert_eq!(levenshtein(&toks("a p a"), &toks("a b a")), 1);
    }

    #[test]
    fn test_signature_distance() {
        assert_eq!(signature_distance("VPV", "VPV"), 0);
        assert_eq!(signature_distance("VPV", "VMV"), 1);
        assert_eq!(signature_distance("", "KV"), 2);
    }

    #[test]
    fn test_batch_keeps_order() {
        let pairs = vec![
            (toks("p a"), toks("p a")),
            (toks("p a t"), toks("b a")),
            (toks(""), toks("k")),
        ];
        assert_eq!(batch_levenshtein(&pairs), vec![0, 2, 1]);
    }

    fn seq() -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(0u8..4, 0..8)
    }

    proptest! {
        #[test]
        fn proptest_self_distance_is_zero(s in seq()) {
            prop_assert_eq!(levenshtein(&s, &s), 0);
        }

        #[test]
        fn proptest_symmetric(s in seq(), t in seq()) {
            prop_assert_eq!(levenshtein(&s, &t), levenshtein(&t, &s));
        }

        #[test]
        fn proptest_empty_is_length(t in seq()) {
            let empty: Vec<u8> = Vec::new();
            prop_assert_eq!(levenshtein(&empty, &t), t.len());
        }

        #[test]
        fn proptest_triangle_inequality(s in seq(), t in seq(), u in seq()) {
            prop_assert!(levenshtein(&s, &u) <= levenshtein(&s, &t) + levenshtein(&t, &u));
        }
    }
}
