use super::{Point, Polarity};

/// A located finder pattern.
///
/// Corners are the outer corners of the symbol in canonical orientation:
/// the solid "L" runs down the left side and along the bottom, so
/// `bottom_left` is the L vertex and the clock tracks meet at `top_right`.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Outer corners: top-left, top-right, bottom-right, bottom-left
    pub corners: [Point; 4],
    /// Polarity the pattern was found under
    pub polarity: Polarity,
    /// Finder-pattern quality in `[0, 1]`
    pub confidence: f32,
    /// Rough module pitch in pixels
    pub module_size: f32,
}

impl Candidate {
    /// Top-left corner (end of the solid left edge)
    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    /// Top-right corner (where the clock tracks meet)
    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    /// Bottom-right corner (end of the solid bottom edge)
    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    /// Bottom-left corner (vertex of the L)
    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }
}
