use super::{Point3, Vector3, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Squared length under which a merged edge counts as collapsed.
const MERGE_DELTA: f64 = 1e-5;

/// Distance under which a vertex counts as lying on the merged edge.
const POINTS_ARE_SAME: f64 = 2e-5;

/// Computes the signed area of a polygon in the XY plane (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point3]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Computes the normalized XY direction from point `a` to point `b`.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if the segment has zero length
/// in the XY plane.
pub fn segment_direction(a: &Point3, b: &Point3) -> Result<Vector3> {
    let d = b - a;
    let len = d.x.hypot(d.y);
    if len < TOLERANCE {
        return Err(GeometryError::Degenerate(format!(
            "zero-length segment between ({}, {}) and ({}, {})",
            a.x, a.y, b.x, b.y
        ))
        .into());
    }
    Ok(Vector3::new(d.x / len, d.y / len, 0.0))
}

/// Returns the left-pointing normal of a direction vector in the XY plane.
///
/// This is `up × dir`, the lateral axis of a wall running along `dir`.
#[must_use]
pub fn left_normal(dir: Vector3) -> Vector3 {
    Vector3::new(-dir.y, dir.x, 0.0)
}

/// Returns `true` unless `a` and `b` lie strictly on opposite sides of
/// `edge`. Points on the edge's line count as the same side.
#[must_use]
pub fn vectors_on_same_side(edge: &Vector3, a: &Vector3, b: &Vector3) -> bool {
    edge.cross(a).dot(&edge.cross(b)) >= 0.0
}

/// Same-side point-in-triangle test. Boundary points are inside.
#[must_use]
pub fn point_in_triangle(a: &Point3, b: &Point3, c: &Point3, p: &Point3) -> bool {
    vectors_on_same_side(&(b - a), &(p - a), &(c - a))
        && vectors_on_same_side(&(c - b), &(p - b), &(a - b))
        && vectors_on_same_side(&(a - c), &(p - c), &(b - c))
}

/// Returns `true` if the edges `v0 -> v1` and `v1 -> v2` can merge into the
/// single edge `v0 -> v2`, i.e. `v1` lies on that edge's line.
///
/// A collapsed `v0 -> v2` edge is always mergeable.
#[must_use]
pub fn edges_mergeable(v0: &Point3, v1: &Point3, v2: &Point3) -> bool {
    let merged = v2 - v0;
    let len_sq = merged.norm_squared();
    if len_sq <= MERGE_DELTA {
        return true;
    }
    let fraction = merged.dot(&(v1 - v0)) / len_sq;
    let projected = v0 + merged * fraction;
    (projected - v1).abs().max() <= POINTS_ARE_SAME
}

/// Signed angle in radians turned when going from direction `from` to
/// direction `to`, signed by which side of `normal` the turn falls on.
///
/// Both directions are normalized first. Zero-length input and straight
/// continuations both yield zero.
#[must_use]
pub fn turning_angle(from: &Vector3, to: &Vector3, normal: &Vector3) -> f64 {
    let (Some(from), Some(to)) = (from.try_normalize(TOLERANCE), to.try_normalize(TOLERANCE))
    else {
        return 0.0;
    };
    let magnitude = from.dot(&to).clamp(-1.0, 1.0).acos();
    let side = from.cross(&to).dot(normal);
    if side.abs() < TOLERANCE {
        0.0
    } else {
        magnitude * side.signum()
    }
}
