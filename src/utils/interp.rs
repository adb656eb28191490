// src/utils/interp.rs
//! Linear interpolation over ordered (time, pressure) curves

use crate::source::Sample;

/// Linearly interpolate the pressure of an ordered curve at `time`.
///
/// Queries before the first point return the first pressure, queries past
/// the last point return the last pressure. Points with duplicated
/// timestamps collapse to the earlier value instead of dividing by zero.
///
/// Returns `None` only for an empty curve.
pub fn interp_pressure(curve: &[Sample], time: f64) -> Option<f64> {
    let first = curve.first()?;
    if time <= first.time {
        return Some(first.pressure);
    }
    let last = curve.last()?;
    if time >= last.time {
        return Some(last.pressure);
    }

    // partition_point finds the first sample strictly past the query time;
    // the guards above ensure both neighbors exist.
    let hi = curve.partition_point(|s| s.time <= time);
    let right = curve[hi];
    let left = curve[hi - 1];

    let dt = right.time - left.time;
    if dt <= 0.0 {
        return Some(left.pressure);
    }
    let frac = (time - left.time) / dt;
    Some(left.pressure + (right.pressure - left.pressure) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> Vec<Sample> {
        vec![
            Sample::new(0.0, 0.0),
            Sample::new(1.0, 10.0),
            Sample::new(2.0, 10.0),
            Sample::new(3.0, 0.0),
        ]
    }

    #[test]
    fn test_midpoint_interpolation() {
        let c = curve();
        assert_eq!(interp_pressure(&c, 0.5), Some(5.0));
        assert_eq!(interp_pressure(&c, 2.5), Some(5.0));
    }

    #[test]
    fn test_exact_points() {
        let c = curve();
        assert_eq!(interp_pressure(&c, 1.0), Some(10.0));
        assert_eq!(interp_pressure(&c, 3.0), Some(0.0));
    }

    #[test]
    fn test_clamped_ends() {
        let c = curve();
        assert_eq!(interp_pressure(&c, -1.0), Some(0.0));
        assert_eq!(interp_pressure(&c, 100.0), Some(0.0));
    }

    #[test]
    fn test_empty_curve() {
        assert_eq!(interp_pressure(&[], 1.0), None);
    }

    #[test]
    fn test_duplicate_timestamps() {
        let c = vec![
            Sample::new(0.0, 1.0),
            Sample::new(1.0, 2.0),
            Sample::new(1.0, 8.0),
            Sample::new(2.0, 8.0),
        ];
        // a query inside the duplicated region stays finite
        let v = interp_pressure(&c, 1.0).unwrap();
        assert!(v.is_finite());
    }
}
