use crate::error::{Result, TessellationError};
use crate::math::polygon_2d::{edges_mergeable, point_in_triangle};
use crate::math::{up, Point3, Vector3};

/// Decomposes a simple polygon into triangles by ear clipping.
///
/// The polygon must wind clockwise seen from above: a vertex is convex
/// when the triangle it forms with its neighbours has a negative signed
/// area about the up axis. Ears are clipped first-fit in vertex order.
/// Holes are not supported.
pub struct EarClip<'a> {
    points: &'a [Point3],
    keep_colinear: bool,
}

impl<'a> EarClip<'a> {
    /// Creates a new `EarClip` operation over `points`.
    #[must_use]
    pub fn new(points: &'a [Point3]) -> Self {
        Self {
            points,
            keep_colinear: true,
        }
    }

    /// Whether vertices lying on the line through their neighbours are
    /// kept (the default) or culled before each ear search.
    #[must_use]
    pub fn keep_colinear(mut self, keep: bool) -> Self {
        self.keep_colinear = keep;
        self
    }

    /// Executes the triangulation, returning index triples into the input.
    ///
    /// Fewer than three input points yield the single trivial triple
    /// `[0, 1, 2]`.
    ///
    /// # Errors
    ///
    /// Returns `TessellationError::NoEar` if a pass over the remaining
    /// vertices finds no ear, meaning the polygon self-intersects or winds
    /// the wrong way.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<Vec<[u32; 3]>> {
        if self.points.len() < 3 {
            return Ok(vec![[0, 1, 2]]);
        }

        let normal = up();
        let mut verts: Vec<Point3> = self.points.to_vec();
        let mut original: Vec<u32> = (0..verts.len() as u32).collect();
        let mut triangles = Vec::with_capacity(verts.len() - 2);

        loop {
            if !self.keep_colinear {
                cull_colinear(&mut verts, &mut original);
            }
            let n = verts.len();
            if n < 3 {
                break;
            }

            let Some(ear) = (0..n).find(|&b| is_ear(&verts, b, &normal)) else {
                return Err(TessellationError::NoEar { remaining: n }.into());
            };
            let a = (ear + n - 1) % n;
            let c = (ear + 1) % n;
            triangles.push([original[a], original[ear], original[c]]);
            verts.remove(ear);
            original.remove(ear);
        }

        Ok(triangles)
    }
}

fn is_ear(verts: &[Point3], b: usize, normal: &Vector3) -> bool {
    let n = verts.len();
    let a = (b + n - 1) % n;
    let c = (b + 1) % n;
    let (pa, pb, pc) = (&verts[a], &verts[b], &verts[c]);

    let det = (pb - pa).cross(&(pc - pa)).dot(normal);
    if det >= 0.0 {
        return false;
    }

    !verts
        .iter()
        .enumerate()
        .any(|(i, p)| i != a && i != b && i != c && point_in_triangle(pa, pb, pc, p))
}

fn cull_colinear(verts: &mut Vec<Point3>, original: &mut Vec<u32>) {
    let mut i = 0;
    while i < verts.len() && verts.len() >= 3 {
        let n = verts.len();
        let i1 = (i + 1) % n;
        let i2 = (i + 2) % n;
        if edges_mergeable(&verts[i], &verts[i1], &verts[i2]) {
            verts.remove(i1);
            original.remove(i1);
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::signed_area_2d;
    use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint2, Triangulation};

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn triangle_area(points: &[Point3], tri: [u32; 3]) -> f64 {
        let [a, b, c] = tri.map(|i| points[i as usize]);
        0.5 * (b - a).cross(&(c - a)).z
    }

    /// Interior triangle count and area from a constrained Delaunay
    /// triangulation of the same polygon.
    fn cdt_reference(points: &[Point3]) -> (usize, f64) {
        let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
        let handles: Vec<_> = points
            .iter()
            .map(|q| cdt.insert(SpadePoint2::new(q.x, q.y)).unwrap())
            .collect();
        for i in 0..handles.len() {
            cdt.add_constraint(handles[i], handles[(i + 1) % handles.len()]);
        }

        let mut count = 0;
        let mut area = 0.0;
        for face in cdt.inner_faces() {
            let [a, b, c] = face.vertices().map(|v| {
                let pos = v.position();
                p(pos.x, pos.y)
            });
            let centroid = p((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
            if contains(points, &centroid) {
                count += 1;
                area += 0.5 * (b - a).cross(&(c - a)).z.abs();
            }
        }
        (count, area)
    }

    /// Even-odd point-in-polygon test.
    fn contains(points: &[Point3], q: &Point3) -> bool {
        let n = points.len();
        let mut inside = false;
        for i in 0..n {
            let (a, b) = (points[i], points[(i + 1) % n]);
            if (a.y > q.y) != (b.y > q.y) {
                let x = a.x + (q.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if q.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn assert_matches_reference(points: &[Point3]) {
        let triangles = EarClip::new(points).execute().unwrap();
        assert_eq!(triangles.len(), points.len() - 2);
        let mut total = 0.0;
        for &tri in &triangles {
            let area = triangle_area(points, tri);
            assert!(area < 0.0, "clockwise input yields clockwise triangles");
            total += area.abs();
        }
        let (count, reference_area) = cdt_reference(points);
        assert_eq!(count, triangles.len());
        assert!((total - reference_area).abs() < 1e-6);
        assert!((total - signed_area_2d(points).abs()).abs() < 1e-6);
    }

    #[test]
    fn degenerate_input_returns_trivial_triple() {
        assert_eq!(EarClip::new(&[]).execute().unwrap(), vec![[0, 1, 2]]);
        assert_eq!(
            EarClip::new(&[p(0.0, 0.0), p(1.0, 0.0)]).execute().unwrap(),
            vec![[0, 1, 2]]
        );
    }

    #[test]
    fn single_triangle() {
        let pts = [p(0.0, 0.0), p(0.0, 300.0), p(400.0, 0.0)];
        assert_eq!(EarClip::new(&pts).execute().unwrap(), vec![[2, 0, 1]]);
    }

    #[test]
    fn first_fit_ear_order() {
        // Clockwise square: every vertex is an ear, so clipping starts at 0.
        let pts = [p(0.0, 0.0), p(0.0, 4.0), p(4.0, 4.0), p(4.0, 0.0)];
        let triangles = EarClip::new(&pts).execute().unwrap();
        assert_eq!(triangles, vec![[3, 0, 1], [3, 1, 2]]);
    }

    #[test]
    fn convex_polygon_matches_reference() {
        let pts: Vec<Point3> = (0..7)
            .map(|i| {
                let angle = -f64::from(i) * std::f64::consts::TAU / 7.0;
                p(100.0 * angle.cos(), 100.0 * angle.sin())
            })
            .collect();
        assert_matches_reference(&pts);
    }

    #[test]
    fn l_shape_matches_reference() {
        let pts = [
            p(0.0, 0.0),
            p(0.0, 6.0),
            p(3.0, 6.0),
            p(3.0, 3.0),
            p(6.0, 3.0),
            p(6.0, 0.0),
        ];
        assert_matches_reference(&pts);
    }

    #[test]
    fn star_matches_reference() {
        let pts: Vec<Point3> = (0..10)
            .map(|i| {
                let angle = -f64::from(i) * std::f64::consts::TAU / 10.0;
                let radius = if i % 2 == 0 { 100.0 } else { 40.0 };
                p(radius * angle.cos(), radius * angle.sin())
            })
            .collect();
        assert_matches_reference(&pts);
    }

    #[test]
    fn counter_clockwise_polygon_has_no_ear() {
        let pts = [p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)];
        let err = EarClip::new(&pts).execute().unwrap_err();
        assert!(matches!(
            err,
            crate::error::FloorgraphError::Tessellation(TessellationError::NoEar { remaining: 4 })
        ));
    }

    #[test]
    fn colinear_vertices_culled_on_request() {
        let pts = [
            p(0.0, 0.0),
            p(0.0, 2.0),
            p(0.0, 4.0),
            p(4.0, 4.0),
            p(4.0, 0.0),
        ];
        let culled = EarClip::new(&pts).keep_colinear(false).execute().unwrap();
        assert_eq!(culled.len(), 2);
        assert!(culled.iter().all(|t| !t.contains(&1)));
    }
}
