//! Response Matcher
//!
//! Decides whether a heard utterance counts as the target color. Matching
//! is deliberately forgiving: young speakers and consumer recognizers both
//! mangle color names, so every accepted variant is tried with exact,
//! containment, and approximate comparison.
//!
//! The approximate check is a cheap position-wise agreement over the
//! overlapping prefix, not true edit distance. Known limitation: transposed
//! letters ("bule" for "blue") can be rejected even though a human would
//! accept them. Curate such cases into the variant list instead of
//! loosening the check.

use strsim::normalized_levenshtein;

use crate::lexicon::{Lexicon, LexiconItem};

/// Fraction of the candidate's length that must agree position-wise for
/// the approximate check to accept.
const AGREEMENT_RATIO: f64 = 0.7;

/// Maximum length difference the approximate check will consider at all.
const MAX_LENGTH_GAP: usize = 2;

/// True if `heard` counts as a correct answer for `target`
pub fn matches(heard: &str, target: &LexiconItem) -> bool {
    let heard = heard.trim().to_lowercase();
    if heard.is_empty() {
        return false;
    }

    Lexicon::accepted_variants(target).iter().any(|variant| {
        heard == *variant
            || heard.contains(variant.as_str())
            || variant.contains(heard.as_str())
            || fuzzy_match(&heard, variant)
    })
}

/// Position-wise agreement over the overlapping prefix.
fn fuzzy_match(heard: &str, candidate: &str) -> bool {
    let heard: Vec<char> = heard.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();

    if heard.len().abs_diff(candidate.len()) > MAX_LENGTH_GAP {
        return false;
    }

    let agreeing = heard
        .iter()
        .zip(candidate.iter())
        .filter(|(h, c)| h == c)
        .count();

    agreeing as f64 >= candidate.len() as f64 * AGREEMENT_RATIO
}

/// Best-scoring variant for a rejected utterance, for near-miss logging.
///
/// Uses normalized Levenshtein so the log reflects real similarity even
/// where the acceptance check above is blind (e.g. transpositions). Never
/// consulted for acceptance.
pub fn closest_variant(heard: &str, target: &LexiconItem) -> Option<(String, f64)> {
    let heard = heard.trim().to_lowercase();
    if heard.is_empty() {
        return None;
    }

    Lexicon::accepted_variants(target)
        .into_iter()
        .map(|variant| {
            let score = normalized_levenshtein(&heard, &variant);
            (variant, score)
        })
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}
