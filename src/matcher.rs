//! Guest-list matching
//!
//! A submitted name is admitted when it approximately equals any entry on
//! the guest list. Both sides are normalized to lowercase ASCII
//! alphanumerics, then compared by:
//!
//! 1. exact equality
//! 2. containment in either direction
//! 3. Levenshtein distance below a percentage of the longer length
//!
//! An empty guest list admits everyone.
//!
//! Names with no ASCII letters or digits at all (for example names written
//! only in a non-Latin script) normalize to the empty string, and two empty
//! normalized names match each other. Such a guest-list entry admits every
//! other such name; keep a romanized spelling on the list to avoid that.

use tracing::debug;

/// Default edit-distance tolerance, as a percentage of the longer name
pub const DEFAULT_THRESHOLD_PERCENT: u32 = 30;

/// Lowercase and keep only `[a-z0-9]`.
pub fn normalize(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Classic insert/delete/substitute edit distance, each with cost 1,
/// counted over characters.
pub use strsim::levenshtein;

/// Approximate name equality with the default threshold.
pub fn fuzzy_match(a: &str, b: &str) -> bool {
    fuzzy_match_with(a, b, DEFAULT_THRESHOLD_PERCENT)
}

/// Approximate name equality, symmetric in `a` and `b`.
pub fn fuzzy_match_with(a: &str, b: &str, threshold_percent: u32) -> bool {
    let a = normalize(a);
    let b = normalize(b);

    if a == b {
        return true;
    }
    // One side has nothing left to compare; containment would be vacuous
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a.contains(&b) || b.contains(&a) {
        return true;
    }

    let distance = levenshtein(&a, &b);
    let max_len = a.chars().count().max(b.chars().count());
    distance * 100 < threshold_percent as usize * max_len
}

/// Whether `name` may RSVP against `guest_list`.
pub fn is_allowed<S: AsRef<str>>(name: &str, guest_list: &[S]) -> bool {
    is_allowed_with(name, guest_list, DEFAULT_THRESHOLD_PERCENT)
}

/// [`is_allowed`] with an explicit threshold.
pub fn is_allowed_with<S: AsRef<str>>(name: &str, guest_list: &[S], threshold_percent: u32) -> bool {
    if guest_list.is_empty() {
        return true;
    }
    if normalize(name).is_empty() {
        debug!("Submitted name normalizes to empty");
    }
    guest_list
        .iter()
        .any(|entry| fuzzy_match_with(name, entry.as_ref(), threshold_percent))
}
