//! Vector helpers for landmark geometry
//!
//! Every helper is total: zero-length inputs produce zeros instead of NaN.

use super::landmarks::Landmark;

/// Below this length a vector is treated as degenerate
pub const EPSILON: f32 = 1e-6;

pub type Vec3 = [f32; 3];

pub fn sub(a: Landmark, b: Landmark) -> Vec3 {
    [a.x - b.x, a.y - b.y, a.z - b.z]
}

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn length(v: Vec3) -> f32 {
    dot(v, v).sqrt()
}

/// Unit vector, or (0,0,0) when `v` is degenerate
pub fn normalize(v: Vec3) -> Vec3 {
    let len = length(v);
    if !len.is_finite() || len < EPSILON {
        return [0.0, 0.0, 0.0];
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Euclidean distance between two landmarks
pub fn distance(a: Landmark, b: Landmark) -> f32 {
    length(sub(a, b))
}

/// Distance in the image plane only
pub fn distance_2d(a: Landmark, b: Landmark) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Mean of a set of landmarks
pub fn centroid(points: &[Landmark]) -> Landmark {
    if points.is_empty() {
        return Landmark::default();
    }
    let n = points.len() as f32;
    let (sx, sy, sz) = points
        .iter()
        .fold((0.0, 0.0, 0.0), |(x, y, z), p| (x + p.x, y + p.y, z + p.z));
    Landmark::new(sx / n, sy / n, sz / n)
}

/// Bend angle at `joint` in radians.
///
/// 0 when parent→joint and joint→child point the same way (straight),
/// approaching π when the segment folds back on itself.
pub fn bend_angle(parent: Landmark, joint: Landmark, child: Landmark) -> f32 {
    let v1 = sub(joint, parent);
    let v2 = sub(child, joint);
    let mag1 = length(v1);
    let mag2 = length(v2);

    // Handle degenerate case
    if mag1 < EPSILON || mag2 < EPSILON {
        return 0.0;
    }

    let cos_angle = (dot(v1, v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos()
}
