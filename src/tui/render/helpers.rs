use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;

use crate::util::unicode;

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Pad a line of spans with background-colored spaces up to `width`.
pub(super) fn fill_line(spans: &mut Vec<Span<'_>>, width: usize, style: Style) {
    let used = spans_width(spans);
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), style));
    }
}

/// Centered popup rect of the given size, clipped to `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

pub fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// First index to show so that `cursor` stays inside a window of `visible` rows.
pub fn scroll_offset(cursor: usize, current: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    if cursor < current {
        cursor
    } else if cursor >= current + visible {
        cursor + 1 - visible
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_clips() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(centered_rect(40, 10, area), Rect::new(20, 7, 40, 10));
        assert_eq!(centered_rect(100, 30, area), area);
    }

    #[test]
    fn scroll_follows_cursor() {
        assert_eq!(scroll_offset(0, 0, 5), 0);
        assert_eq!(scroll_offset(7, 0, 5), 3);
        assert_eq!(scroll_offset(2, 3, 5), 2);
        assert_eq!(scroll_offset(4, 2, 5), 2);
    }

    #[test]
    fn contains_edges() {
        let r = Rect::new(2, 2, 3, 3);
        assert!(contains(r, 2, 2));
        assert!(contains(r, 4, 4));
        assert!(!contains(r, 5, 4));
        assert!(!contains(r, 1, 3));
    }
}
