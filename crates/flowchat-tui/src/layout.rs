//! Placement of the chat window inside the terminal.

use flowchat_core::Position;
use ratatui::layout::Rect;

/// Config sizes are in pixels; a terminal cell is roughly 8x16.
pub const CELL_WIDTH_PX: u32 = 8;
pub const CELL_HEIGHT_PX: u32 = 16;

const MIN_WIDTH: u16 = 24;
const MIN_HEIGHT: u16 = 12;

/// Window size in cells, clamped to what the terminal can show
pub fn window_size(width_px: u32, height_px: u32, area: Rect) -> (u16, u16) {
    let width = u16::try_from(width_px / CELL_WIDTH_PX).unwrap_or(u16::MAX);
    let height = u16::try_from(height_px / CELL_HEIGHT_PX).unwrap_or(u16::MAX);
    (
        width.max(MIN_WIDTH).min(area.width),
        height.max(MIN_HEIGHT).min(area.height),
    )
}

/// Rect of `width` x `height` anchored inside `area`
pub fn anchored(area: Rect, position: Position, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let free_x = area.width - width;
    let free_y = area.height - height;

    let x = match position {
        Position::TopLeft | Position::CenterLeft | Position::BottomLeft => 0,
        Position::TopCenter | Position::BottomCenter => free_x / 2,
        Position::TopRight | Position::CenterRight | Position::BottomRight => free_x,
    };
    let y = match position {
        Position::TopLeft | Position::TopCenter | Position::TopRight => 0,
        Position::CenterLeft | Position::CenterRight => free_y / 2,
        Position::BottomLeft | Position::BottomCenter | Position::BottomRight => free_y,
    };

    Rect::new(area.x + x, area.y + y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_size_in_cells() {
        let area = Rect::new(0, 0, 200, 60);
        assert_eq!(window_size(450, 650, area), (56, 40));
    }

    #[test]
    fn test_size_clamped_to_terminal() {
        let area = Rect::new(0, 0, 40, 20);
        assert_eq!(window_size(450, 650, area), (40, 20));
        assert_eq!(window_size(8, 16, Rect::new(0, 0, 100, 100)), (MIN_WIDTH, MIN_HEIGHT));
    }

    #[test]
    fn test_anchors() {
        let area = Rect::new(0, 0, 100, 50);
        assert_eq!(anchored(area, Position::BottomRight, 40, 20), Rect::new(60, 30, 40, 20));
        assert_eq!(anchored(area, Position::TopLeft, 40, 20), Rect::new(0, 0, 40, 20));
        assert_eq!(anchored(area, Position::TopCenter, 40, 20), Rect::new(30, 0, 40, 20));
        assert_eq!(anchored(area, Position::CenterLeft, 40, 20), Rect::new(0, 15, 40, 20));
    }

    #[test]
    fn test_anchor_respects_area_origin() {
        let area = Rect::new(5, 2, 20, 10);
        assert_eq!(anchored(area, Position::BottomRight, 50, 50), area);
    }
}
