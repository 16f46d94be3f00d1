//! Top-level views, one state struct per tab.

pub mod documents;
pub mod folders;
pub mod home;
pub mod search;
pub mod upload;

use ratatui::layout::Rect;

/// A fixed-size rect centered in `area`, clamped to fit.
pub(crate) fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fixed_fits_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_fixed(60, 16, area);
        assert_eq!(rect.width, 60);
        assert_eq!(rect.height, 16);
        assert!(rect.x + rect.width <= area.width);
        assert!(rect.y + rect.height <= area.height);
    }

    #[test]
    fn test_centered_fixed_clamps_oversized() {
        let area = Rect::new(0, 0, 30, 10);
        let rect = centered_fixed(60, 16, area);
        assert_eq!(rect.width, 30);
        assert_eq!(rect.height, 10);
    }
}
