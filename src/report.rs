//! Formatting helpers for console reports.

use std::fmt::Display;

/// Group digits in thousands: `1234567` -> `1,234,567`.
pub fn format_count(value: u64) -> String {
    let raw = value.to_string();
    let mut grouped_reversed = String::with_capacity(raw.len() + (raw.len() / 3));
    for (idx, ch) in raw.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            grouped_reversed.push(',');
        }
        grouped_reversed.push(ch);
    }
    grouped_reversed.chars().rev().collect()
}

/// Render items as a bracketed list: `[2019, 2020]`.
pub fn format_list<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    let body = items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{body}]")
}

/// Horizontal rule used around batch output.
pub fn rule(width: usize) -> String {
    "=".repeat(width)
}
