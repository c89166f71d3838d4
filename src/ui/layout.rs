use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct KioskLayout {
    pub header: Rect,
    pub body: Rect,
    pub footer: Rect,
}

impl KioskLayout {
    /// Header, content, hint footer. With the lowered-screen switch on, the
    /// top of the display is left blank so every control sits within reach
    /// from a seated position.
    pub fn new(area: Rect, low_screen: bool) -> Self {
        let area = if low_screen {
            let dead_zone = area.height * 2 / 5;
            Rect::new(
                area.x,
                area.y + dead_zone,
                area.width,
                area.height - dead_zone,
            )
        } else {
            area
        };

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(2),
            ])
            .split(area);

        Self {
            header: vertical[0],
            body: vertical[1],
            footer: vertical[2],
        }
    }
}

/// Rows per focusable element: large text doubles the footprint of each row.
pub fn row_height(large_text: bool) -> u16 {
    if large_text { 2 } else { 1 }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 40;
    const MIN_POPUP_HEIGHT: u16 = 10;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_screen_pushes_content_down() {
        let area = Rect::new(0, 0, 80, 50);
        let normal = KioskLayout::new(area, false);
        let lowered = KioskLayout::new(area, true);
        assert_eq!(normal.header.y, 0);
        assert_eq!(lowered.header.y, 20);
        assert!(lowered.footer.y > lowered.body.y);
    }

    #[test]
    fn test_row_height_doubles_for_large_text() {
        assert_eq!(row_height(false), 1);
        assert_eq!(row_height(true), 2);
    }

    #[test]
    fn test_pack_hint_lines_wraps() {
        let hints = ["[arrows] Move", "[enter] Select", "[esc] Back"];
        let packed = pack_hint_lines(&hints, 30);
        assert!(packed.len() >= 2);
        assert!(packed.iter().all(|l| l.chars().count() <= 30));
    }
}
