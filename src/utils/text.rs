//! Character-level text helpers.

/// Cut `text` to at most `max_chars` characters, appending `marker` when cut.
///
/// Returns the (possibly shortened) text and the original length in characters.
pub fn truncate_chars(text: String, max_chars: usize, marker: &str) -> (String, usize) {
    match text.char_indices().nth(max_chars) {
        None => {
            let len = text.chars().count();
            (text, len)
        }
        Some((cut, _)) => {
            let original_len = max_chars + text[cut..].chars().count();
            let mut kept = text;
            kept.truncate(cut);
            kept.push_str(marker);
            (kept, original_len)
        }
    }
}
