//! Shared helpers

pub mod encoding;
pub mod paths;
pub mod text;

pub use encoding::{decode_text, is_binary};
pub use paths::{is_readme, path_depth};
pub use text::truncate_chars;

/// Format an integer with thousands separators (`12345` → `12,345`).
pub fn format_with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
