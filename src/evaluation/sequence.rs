use crate::point::Point;

/// Ordered tap check: the i-th tap must land within `tolerance_px` of the
/// i-th target, and there must be exactly as many taps as targets.
pub fn evaluate_dot_to_dot(taps: &[Point], targets: &[Point], tolerance_px: f32) -> bool {
    if taps.len() != targets.len() {
        return false;
    }
    taps.iter()
        .zip(targets)
        .all(|(tap, target)| tap.distance(target) <= tolerance_px)
}

/// Exact, element-wise match of a submitted layer order.
pub fn evaluate_layer_order<S: AsRef<str>, T: AsRef<str>>(order: &[S], target: &[T]) -> bool {
    order.len() == target.len()
        && order
            .iter()
            .zip(target)
            .all(|(submitted, expected)| submitted.as_ref() == expected.as_ref())
}
