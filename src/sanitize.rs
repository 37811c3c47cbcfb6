//! Free-text sanitization and phone validation
//!
//! Every free-text field passes through [`sanitize_input`] before it is
//! stored: markup-significant characters are removed, surrounding
//! whitespace is trimmed and the result is truncated to a character limit.

/// Characters removed from all free text
const STRIPPED: [char; 4] = ['<', '>', '"', '\''];

/// Default character limit for free-text fields
pub const DEFAULT_MAX_FIELD_LEN: usize = 500;

/// Strip `< > " '`, trim, and keep at most `max_len` characters.
pub fn sanitize_input(input: &str, max_len: usize) -> String {
    input
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect::<String>()
        .trim()
        .chars()
        .take(max_len)
        .collect()
}

/// Sanitize an optional field, dropping it when nothing is left.
pub fn sanitize_optional(input: Option<&str>, max_len: usize) -> Option<String> {
    input
        .map(|s| sanitize_input(s, max_len))
        .filter(|s| !s.is_empty())
}

/// Digits of a phone number, everything else removed
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// A phone number is valid when it has between `min` and `max` digits.
pub fn is_valid_phone(phone: &str, min: usize, max: usize) -> bool {
    let count = phone.chars().filter(char::is_ascii_digit).count();
    (min..=max).contains(&count)
}
