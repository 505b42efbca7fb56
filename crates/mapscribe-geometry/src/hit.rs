//! Pixel-space hit testing helpers.

use crate::coords::Point;

/// Distance from `p` to the segment `a`-`b`
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b.sub(a);
    let len2 = ab.dot(ab);
    if len2 == 0.0 {
        return p.distance_to(a);
    }
    let t = (p.sub(a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance_to(a.add(ab.scale(t)))
}

/// Whether `p` lies within `tolerance` of the open polyline through `pts`
pub fn near_polyline(p: Point, pts: &[Point], tolerance: f64) -> bool {
    match pts {
        [] => false,
        [only] => p.distance_to(*only) <= tolerance,
        _ => pts
            .windows(2)
            .any(|w| distance_to_segment(p, w[0], w[1]) <= tolerance),
    }
}

/// Whether `p` lies within `tolerance` of the closed ring through `pts`
pub fn near_ring(p: Point, pts: &[Point], tolerance: f64) -> bool {
    if near_polyline(p, pts, tolerance) {
        return true;
    }
    match (pts.first(), pts.last()) {
        (Some(first), Some(last)) if pts.len() > 2 => distance_to_segment(p, *last, *first) <= tolerance,
        _ => false,
    }
}

/// Even-odd point-in-polygon test
pub fn point_in_ring(p: Point, pts: &[Point]) -> bool {
    let mut inside = false;
    let n = pts.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let a = pts[i];
        let b = pts[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
