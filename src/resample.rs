//! Arc-length resampling of polylines.

use crate::point::Point;

/// Resample `points` to exactly `target_count` samples spaced evenly along the
/// path.
///
/// The first and last samples are copies of the first and last input points;
/// everything in between is linearly interpolated between the two input
/// points that bracket the sample's arc-length position. Degenerate inputs
/// (a single point, or every point coincident) yield copies of the first point.
pub fn resample(points: &[Point], target_count: usize) -> Vec<Point> {
    if points.is_empty() || target_count == 0 {
        return Vec::new();
    }
    if points.len() == 1 || target_count == 1 {
        return vec![points[0]; target_count];
    }

    let dists = cumulative_lengths(points);
    let total = dists[dists.len() - 1];
    if !(total.is_finite() && total > 0.0) {
        return vec![points[0]; target_count];
    }

    let last = points.len() - 1;
    let step = total / (target_count - 1) as f32;
    let mut out = Vec::with_capacity(target_count);
    out.push(points[0]);

    // `seg` is the index of the end point of the segment being sampled. It only
    // ever moves forward and stops at the final point if rounding pushes the
    // target distance past the end of the table.
    let mut seg = 1;
    for k in 1..target_count - 1 {
        let target = step * k as f32;
        while seg < last && dists[seg] < target {
            seg += 1;
        }
        let (start, end) = (&points[seg - 1], &points[seg]);
        let span = dists[seg] - dists[seg - 1];
        let t = if span > 0.0 {
            ((target - dists[seg - 1]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(start.lerp(end, t));
    }

    out.push(points[last]);
    out
}

fn cumulative_lengths(points: &[Point]) -> Vec<f32> {
    let mut dists = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    dists.push(acc);
    for w in points.windows(2) {
        acc += w[0].distance(&w[1]);
        dists.push(acc);
    }
    dists
}
