use kurbo::{BezPath, Point};

/// Converts a polyline into a smooth Catmull-Rom curve path.
///
/// Zero points produce an empty path, one point a lone move-to, two points a
/// straight segment. With three or more points each consecutive pair becomes
/// a cubic whose control points are derived from the neighboring points;
/// neighbors past the sequence ends are clamped to the nearest real point
/// rather than extrapolated. `tension` scales the control-point offset
/// uniformly (1.0 is the standard Catmull-Rom curve).
///
/// The solver is pure: identical input always yields an identical path.
pub fn solve_spline(points: &[Point], tension: f64) -> BezPath {
    let mut path = BezPath::new();
    let Some(&first) = points.first() else {
        return path;
    };

    path.move_to(first);
    match points.len() {
        1 => return path,
        2 => {
            path.line_to(points[1]);
            return path;
        }
        _ => {}
    }

    let last = points.len() - 1;
    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];

        let c1 = Point::new(
            p1.x + (p2.x - p0.x) * tension / 6.0,
            p1.y + (p2.y - p0.y) * tension / 6.0,
        );
        let c2 = Point::new(
            p2.x - (p3.x - p1.x) * tension / 6.0,
            p2.y - (p3.y - p1.y) * tension / 6.0,
        );
        path.curve_to(c1, c2, p2);
    }
    path
}
