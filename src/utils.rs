use ratatui::{
    layout::{Position, Rect},
    style::Color,
};
use std::sync::OnceLock;

pub const ACCENT: Color = Color::Rgb(214, 94, 14);
pub const MUTED: Color = Color::Rgb(80, 73, 69);
pub const ERROR: Color = Color::Rgb(204, 36, 29);
pub const SUCCESS: Color = Color::Rgb(152, 151, 26);

pub static DEBUG_PRINT_LIMIT: OnceLock<usize> = OnceLock::new();

/// Used by the context macros when clipping printed arguments
pub fn debug_print_limit() -> usize {
    *DEBUG_PRINT_LIMIT.get().unwrap_or(&1)
}

pub fn clip_string(mut string: String, ending: &str, length: usize) -> String {
    if length == 0 {
        string = String::default();
    } else if string.chars().count() > length {
        string = format!(
            "{}{}",
            string
                .chars()
                .take(length.saturating_sub(ending.chars().count()))
                .collect::<String>(),
            ending
        );
    }

    string
}

/// Case-insensitive substring match of an already trimmed and lowercased query
pub fn label_matches(label: &str, query: &str) -> bool {
    label.to_lowercase().contains(query)
}

pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

pub fn rect_contains(area: &Rect, position: Position) -> bool {
    area.width > 0 && area.height > 0 && area.contains(position)
}

/// Splits off `height` rows from the top of `area`, the rest is returned as the second rect
pub fn split_top(area: &Rect, height: u16) -> (Rect, Rect) {
    let height = height.min(area.height);

    let top = Rect::new(area.x, area.y, area.width, height);
    let rest = Rect::new(area.x, area.y + height, area.width, area.height - height);

    (top, rest)
}
