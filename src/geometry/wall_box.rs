use crate::math::{Point3, Vector3};

/// One solid slice of a wall: a prism with a quad base and a quad top.
///
/// "Left" is the side the wall's lateral axis points to, "start" is the
/// side nearer the wall's start point. Each top corner sits directly
/// above its bottom corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallBox {
    pub bottom_left_start: Point3,
    pub bottom_right_start: Point3,
    pub bottom_right_end: Point3,
    pub bottom_left_end: Point3,
    pub top_left_start: Point3,
    pub top_right_start: Point3,
    pub top_right_end: Point3,
    pub top_left_end: Point3,
}

impl WallBox {
    /// Builds a box around the centreline segment `start -> end`.
    ///
    /// `start` and `end` are bottom centreline points; `lateral` points
    /// left and has length half the wall thickness. The top face rises to
    /// `start_top` at the start and `end_top` at the end.
    #[must_use]
    pub fn spanning(
        start: &Point3,
        end: &Point3,
        lateral: &Vector3,
        start_top: f64,
        end_top: f64,
    ) -> Self {
        let raise = |p: Point3, z: f64| Point3::new(p.x, p.y, z);
        let bottom_left_start = start + lateral;
        let bottom_right_start = start - lateral;
        let bottom_right_end = end - lateral;
        let bottom_left_end = end + lateral;
        Self {
            bottom_left_start,
            bottom_right_start,
            bottom_right_end,
            bottom_left_end,
            top_left_start: raise(bottom_left_start, start_top),
            top_right_start: raise(bottom_right_start, start_top),
            top_right_end: raise(bottom_right_end, end_top),
            top_left_end: raise(bottom_left_end, end_top),
        }
    }

    /// The eight corners in flattening order: the four bottom corners
    /// (LS, RS, RE, LE) followed by the four top corners in the same order.
    #[must_use]
    pub fn vertices(&self) -> [Point3; 8] {
        [
            self.bottom_left_start,
            self.bottom_right_start,
            self.bottom_right_end,
            self.bottom_left_end,
            self.top_left_start,
            self.top_right_start,
            self.top_right_end,
            self.top_left_end,
        ]
    }

    /// The four corners on the left face: two bottom, then two top.
    #[must_use]
    pub fn left_corners(&self) -> [Point3; 4] {
        [
            self.bottom_left_start,
            self.bottom_left_end,
            self.top_left_start,
            self.top_left_end,
        ]
    }

    /// Distance between the top-left-start and bottom-left-end corners.
    #[must_use]
    pub fn left_diagonal(&self) -> f64 {
        (self.top_left_start - self.bottom_left_end).norm()
    }

    /// Lowest Z of the four bottom corners.
    #[must_use]
    pub fn bottom_z(&self) -> f64 {
        self.bottom_left_start
            .z
            .min(self.bottom_right_start.z)
            .min(self.bottom_right_end.z)
            .min(self.bottom_left_end.z)
    }

    /// Highest Z of the four top corners.
    #[must_use]
    pub fn top_z(&self) -> f64 {
        self.top_left_start
            .z
            .max(self.top_right_start.z)
            .max(self.top_right_end.z)
            .max(self.top_left_end.z)
    }

    /// Offset of the box's start face along `dir`, measured from `origin`.
    #[must_use]
    pub fn start_offset(&self, origin: &Point3, dir: &Vector3) -> f64 {
        (self.bottom_left_start - origin).dot(dir)
    }

    /// Offset of the box's end face along `dir`, measured from `origin`.
    #[must_use]
    pub fn end_offset(&self, origin: &Point3, dir: &Vector3) -> f64 {
        (self.bottom_left_end - origin).dot(dir)
    }
}
