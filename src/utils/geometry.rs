//! Geometry utilities: perspective transforms, line fitting, convex hulls

use crate::models::Point;

/// Perspective transformation matrix (3x3, a33 fixed to 1)
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveTransform {
    a11: f64,
    a12: f64,
    a13: f64,
    a21: f64,
    a22: f64,
    a23: f64,
    a31: f64,
    a32: f64,
}

impl PerspectiveTransform {
    /// Create transform mapping 4 source points onto 4 destination points
    pub fn from_points(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        // Direct linear transform: two equations per correspondence
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];

        for i in 0..4 {
            let (sx, sy) = (src[i].x as f64, src[i].y as f64);
            let (dx, dy) = (dst[i].x as f64, dst[i].y as f64);

            let row = i * 2;
            a[row] = [sx, sy, 1.0, 0.0, 0.0, 0.0, -dx * sx, -dx * sy];
            b[row] = dx;
            a[row + 1] = [0.0, 0.0, 0.0, sx, sy, 1.0, -dy * sx, -dy * sy];
            b[row + 1] = dy;
        }

        solve_linear_system(&a, &b).map(|s| Self {
            a11: s[0],
            a12: s[1],
            a13: s[2],
            a21: s[3],
            a22: s[4],
            a23: s[5],
            a31: s[6],
            a32: s[7],
        })
    }

    /// Transform a point; points on the horizon line map to `None`
    pub fn transform(&self, p: &Point) -> Option<Point> {
        let (x, y) = (p.x as f64, p.y as f64);
        let denominator = self.a31 * x + self.a32 * y + 1.0;
        if denominator.abs() < 1e-10 {
            return None;
        }
        let x_new = (self.a11 * x + self.a12 * y + self.a13) / denominator;
        let y_new = (self.a21 * x + self.a22 * y + self.a23) / denominator;
        Some(Point::new(x_new as f32, y_new as f32))
    }
}

/// Solve 8x8 linear system using Gaussian elimination with partial pivoting
#[allow(clippy::needless_range_loop)]
fn solve_linear_system(a: &[[f64; 8]; 8], b: &[f64; 8]) -> Option<[f64; 8]> {
    let mut a = *a;
    let mut b = *b;
    let n = 8;

    for i in 0..n {
        let mut max_val = a[i][i].abs();
        let mut max_row = i;
        for k in (i + 1)..n {
            if a[k][i].abs() > max_val {
                max_val = a[k][i].abs();
                max_row = k;
            }
        }

        if max_val < 1e-12 {
            return None;
        }

        if max_row != i {
            a.swap(i, max_row);
            b.swap(i, max_row);
        }

        for k in (i + 1)..n {
            let factor = a[k][i] / a[i][i];
            b[k] -= factor * b[i];
            for j in i..n {
                a[k][j] -= factor * a[i][j];
            }
        }
    }

    let mut x = [0.0f64; 8];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[i][j] * x[j];
        }
        x[i] = sum / a[i][i];
    }

    Some(x)
}

/// Infinite line through `origin` along unit vector `direction`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// A point on the line
    pub origin: Point,
    /// Unit direction
    pub direction: Point,
}

impl Line {
    /// Line through two distinct points
    pub fn through(a: &Point, b: &Point) -> Option<Self> {
        Some(Self {
            origin: *a,
            direction: a.to(b).normalized()?,
        })
    }

    /// Total least squares fit (principal axis of the point cloud)
    pub fn fit(points: &[Point]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let cx = points.iter().map(|p| p.x as f64).sum::<f64>() / n;
        let cy = points.iter().map(|p| p.y as f64).sum::<f64>() / n;
        let (mut sxx, mut syy, mut sxy) = (0.0f64, 0.0f64, 0.0f64);
        for p in points {
            let dx = p.x as f64 - cx;
            let dy = p.y as f64 - cy;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }
        if sxx + syy < 1e-9 {
            return None;
        }
        let angle = 0.5 * (2.0 * sxy).atan2(sxx - syy);
        Some(Self {
            origin: Point::new(cx as f32, cy as f32),
            direction: Point::new(angle.cos() as f32, angle.sin() as f32),
        })
    }

    /// Signed perpendicular distance (positive to the left of `direction`
    /// in a y-down image, i.e. where `direction x offset > 0`)
    pub fn signed_distance(&self, p: &Point) -> f32 {
        self.direction.cross(&self.origin.to(p))
    }

    /// Intersection with another line, `None` when (nearly) parallel
    pub fn intersect(&self, other: &Line) -> Option<Point> {
        let denom = self.direction.cross(&other.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = self.origin.to(&other.origin).cross(&other.direction) / denom;
        Some(Point::new(
            self.origin.x + self.direction.x * t,
            self.origin.y + self.direction.y * t,
        ))
    }
}

/// Convex hull (Andrew's monotone chain), counter-clockwise in a y-up frame
/// (clockwise on screen), without collinear points
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let turn = |o: &Point, a: &Point, b: &Point| o.to(a).cross(&o.to(b));
    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    for p in &pts {
        while hull.len() >= 2 && turn(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    let lower_len = hull.len() + 1;
    for p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && turn(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Calculate distance between two points
pub fn distance(p1: &Point, p2: &Point) -> f32 {
    p1.distance(p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perspective_transform() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];

        let dst = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 50.0),
            Point::new(0.0, 50.0),
        ];

        let t = PerspectiveTransform::from_points(&src, &dst).unwrap();
        let p = t.transform(&Point::new(50.0, 50.0)).unwrap();
        assert!((p.x - 25.0).abs() < 1e-3);
        assert!((p.y - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_transform_maps_corners_exactly() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let dst = [
            Point::new(102.0, 40.0),
            Point::new(410.0, 61.0),
            Point::new(395.0, 380.0),
            Point::new(90.0, 350.0),
        ];
        let t = PerspectiveTransform::from_points(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            let p = t.transform(s).unwrap();
            assert!(p.distance(d) < 1e-2, "{p:?} vs {d:?}");
        }
    }

    #[test]
    fn test_degenerate_transform() {
        let same = [Point::new(1.0, 1.0); 4];
        assert!(PerspectiveTransform::from_points(&same, &same).is_none());
    }

    #[test]
    fn test_line_fit_and_intersection() {
        let horizontal: Vec<Point> = (0..10).map(|i| Point::new(i as f32, 5.0)).collect();
        let vertical: Vec<Point> = (0..10).map(|i| Point::new(3.0, i as f32)).collect();
        let h = Line::fit(&horizontal).unwrap();
        let v = Line::fit(&vertical).unwrap();
        let p = h.intersect(&v).unwrap();
        assert!((p.x - 3.0).abs() < 1e-4 && (p.y - 5.0).abs() < 1e-4);
        assert!(h.intersect(&h).is_none());
        assert!((h.signed_distance(&Point::new(0.0, 7.0)).abs() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_convex_hull_of_square_with_interior() {
        let mut points = Vec::new();
        for y in 0..5 {
            for x in 0..5 {
                points.push(Point::new(x as f32, y as f32));
            }
        }
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        for corner in [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
        ] {
            assert!(hull.contains(&corner));
        }
    }

    #[test]
    fn test_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((distance(&p1, &p2) - 5.0).abs() < 0.001);
    }
}
