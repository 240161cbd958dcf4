//! Formatting utilities used for CLI and export outputs.

use unicode_width::UnicodeWidthStr;

/// Pad to `width` terminal columns (CJK characters count double).
pub fn pad_right(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(w)))
}

/// Shortest human form of an amount or a day count:
/// 300 → "300", 1.5 → "1.5", 0.1 + 0.2 → "0.3".
pub fn fmt_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let s = format!("{:.2}", rounded);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Marker for a half-shift in listings.
pub fn presence_mark(present: bool) -> &'static str {
    if present { "✔" } else { "·" }
}

/// "Chen ✔" / "- ·"
pub fn shift_cell(owner: &str, present: bool) -> String {
    format!("{} {}", owner, presence_mark(present))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_drop_trailing_zeros() {
        assert_eq!(fmt_amount(300.0), "300");
        assert_eq!(fmt_amount(1.5), "1.5");
        assert_eq!(fmt_amount(0.1 + 0.2), "0.3");
        assert_eq!(fmt_amount(90.25), "90.25");
        assert_eq!(fmt_amount(0.0), "0");
    }

    #[test]
    fn padding_counts_display_width() {
        assert_eq!(pad_right("张三", 6), "张三  ");
    }
}
