use rust_decimal::Decimal;

/// Whole won with thousand separators and no symbol.
/// e.g. `-1234567` → `"-1,234,567"`
pub(crate) fn format_number(val: Decimal) -> String {
    let rounded = val.round_dp(0);
    let digits = format!("{:.0}", rounded.abs());

    let with_commas: String = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if rounded < Decimal::ZERO {
        format!("-{with_commas}")
    } else {
        with_commas
    }
}

/// Format a won amount with thousand separators and no decimals.
/// e.g. `1234567` → `"₩1,234,567"`
pub(crate) fn format_won(val: Decimal) -> String {
    let number = format_number(val);
    match number.strip_prefix('-') {
        Some(abs) => format!("-₩{abs}"),
        None => format!("₩{number}"),
    }
}

/// One decimal place with a percent sign; blank for the total rows.
pub(crate) fn format_percent(val: Option<Decimal>) -> String {
    match val {
        Some(p) => format!("{:.1}%", p.round_dp(1)),
        None => String::new(),
    }
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// The result is guaranteed to be at most `max` characters (counting "…" as one).
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// Move a list cursor down by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_down(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if *index + 1 < len {
        *index += 1;
        if *index >= *scroll + page {
            *scroll = index.saturating_sub(page.saturating_sub(1));
        }
    }
}

/// Move a list cursor up by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_up(index: &mut usize, scroll: &mut usize) {
    *index = index.saturating_sub(1);
    if *index < *scroll {
        *scroll = *index;
    }
}

pub(crate) fn scroll_to_top(index: &mut usize, scroll: &mut usize) {
    *index = 0;
    *scroll = 0;
}

pub(crate) fn scroll_to_bottom(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if len > 0 {
        *index = len - 1;
        *scroll = index.saturating_sub(page.saturating_sub(1));
    }
}

/// Pull a cursor back inside a list that shrank.
pub(crate) fn clamp_cursor(index: &mut usize, scroll: &mut usize, len: usize) {
    if *index >= len {
        *index = len.saturating_sub(1);
    }
    if *scroll > *index {
        *scroll = *index;
    }
}
