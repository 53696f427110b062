use crate::common::config::GapSettings;
use crate::sys::geometry::Rect;

/// Screen area left for tiles once the outer gaps are taken off.
pub fn compute_tiling_area(screen: Rect, gaps: &GapSettings) -> Rect {
    Rect::from_xywh(
        screen.origin.x + gaps.outer.left,
        screen.origin.y + gaps.outer.top,
        (screen.size.width - gaps.outer.left - gaps.outer.right).max(0.0),
        (screen.size.height - gaps.outer.top - gaps.outer.bottom).max(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtracts_outer_gaps() {
        let mut gaps = GapSettings::uniform(10.0);
        gaps.outer.left = 30.0;
        let area = compute_tiling_area(Rect::from_xywh(0.0, 25.0, 1000.0, 800.0), &gaps);
        assert_eq!(area, Rect::from_xywh(30.0, 35.0, 960.0, 780.0));
    }

    #[test]
    fn never_negative() {
        let area = compute_tiling_area(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), &GapSettings::uniform(20.0));
        assert_eq!(area.size.width, 0.0);
        assert_eq!(area.size.height, 0.0);
    }
}
