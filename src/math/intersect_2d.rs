use super::{Point3, Vector3, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, solves the 2x2 system with
/// Cramer's rule and returns `(t, u)`, or `None` if the determinant vanishes.
/// Only the X and Y components take part.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point3,
    d1: &Vector3,
    p2: &Point3,
    d2: &Vector3,
) -> Option<(f64, f64)> {
    let cross = d1.x * d2.y - d1.y * d2.x;
    if cross.abs() < TOLERANCE {
        return None;
    }
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let t = (dx * d2.y - dy * d2.x) / cross;
    let u = (dx * d1.y - dy * d1.x) / cross;
    Some((t, u))
}

/// Returns `true` if two directions are parallel (or anti-parallel) in the
/// XY plane within `angular_epsilon`.
///
/// Zero-length directions are reported as parallel, since they cannot
/// define a crossing.
#[must_use]
pub fn are_parallel_2d(a: &Vector3, b: &Vector3, angular_epsilon: f64) -> bool {
    let a_len = a.x.hypot(a.y);
    let b_len = b.x.hypot(b.y);
    if a_len < TOLERANCE || b_len < TOLERANCE {
        return true;
    }
    let dot = (a.x * b.x + a.y * b.y) / (a_len * b_len);
    dot.abs() >= 1.0 - angular_epsilon
}

/// Result of crossing two bounded segments in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentCrossing {
    /// Crossing point. Z is the mean of both segments' heights there.
    pub location: Point3,
    /// Signed distance from the first segment's start to the crossing.
    pub dist_along_first: f64,
    /// Signed distance from the second segment's start to the crossing.
    pub dist_along_second: f64,
}

/// Crosses segment `a0 -> a1` with segment `b0 -> b1` in the XY plane.
///
/// Returns `None` when either segment is shorter than `epsilon`, when the
/// segments are parallel within `angular_epsilon`, or when the crossing
/// lies within `epsilon` of either segment's endpoints (touching endpoints
/// do not count). Distances are measured along each segment in world
/// units, so swapping the arguments swaps the two distances.
#[must_use]
pub fn segment_crossing_2d(
    a0: &Point3,
    a1: &Point3,
    b0: &Point3,
    b1: &Point3,
    epsilon: f64,
    angular_epsilon: f64,
) -> Option<SegmentCrossing> {
    let da = Vector3::new(a1.x - a0.x, a1.y - a0.y, 0.0);
    let db = Vector3::new(b1.x - b0.x, b1.y - b0.y, 0.0);

    let a_len = da.norm();
    let b_len = db.norm();
    if a_len < epsilon || b_len < epsilon {
        return None;
    }
    if are_parallel_2d(&da, &db, angular_epsilon) {
        return None;
    }

    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;
    let dist_along_first = t * a_len;
    let dist_along_second = u * b_len;

    let within = |d: f64, len: f64| d >= epsilon && d <= len - epsilon;
    if !within(dist_along_first, a_len) || !within(dist_along_second, b_len) {
        return None;
    }

    let za = a0.z + (a1.z - a0.z) * t;
    let zb = b0.z + (b1.z - b0.z) * u;
    let location = Point3::new(a0.x + da.x * t, a0.y + da.y * t, 0.5 * (za + zb));

    Some(SegmentCrossing {
        location,
        dist_along_first,
        dist_along_second,
    })
}
