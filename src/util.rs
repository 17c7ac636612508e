//! # Generic utilities

/// Split a string at a char index.
///
/// Returns the whole string and an empty tail when the index lies past the
/// last char.
pub fn split_at_char(text: &str, mut index: usize) -> (&str, &str) {
    let mut iter = text.chars();
    while index > 0 {
        if iter.next().is_none() {
            return (text, "");
        }
        index -= 1;
    }
    let mid = text.len() - iter.as_str().len();
    text.split_at(mid)
}

/// The length of a string in chars.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
