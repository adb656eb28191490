// src/utils/scan.rs
//! Linear-scan helpers for slope-bracket searches
//!
//! The contour analyzer brackets inhalation and exhalation by walking a
//! derivative array until the slope decays past a scaled limit. These
//! helpers make each walk an explicit, isolated search returning an
//! optional index; fallback policy stays with the caller.

/// Scan forward through `values[from..to]` and return the first index whose
/// value satisfies `pred`. `to` is clamped to the array length.
pub fn scan_forward<F>(values: &[f64], from: usize, to: usize, pred: F) -> Option<usize>
where
    F: Fn(f64) -> bool,
{
    let to = to.min(values.len());
    if from >= to {
        return None;
    }
    (from..to).find(|&i| pred(values[i]))
}

/// Scan backward from `from` down to `down_to` (both inclusive) and return
/// the first index whose value satisfies `pred`.
pub fn scan_backward<F>(values: &[f64], from: usize, down_to: usize, pred: F) -> Option<usize>
where
    F: Fn(f64) -> bool,
{
    if values.is_empty() || from < down_to {
        return None;
    }
    let from = from.min(values.len() - 1);
    (down_to..=from).rev().find(|&i| pred(values[i]))
}

/// Index of the maximum value in `values`, or `None` when empty.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the most negative value in `values[from..]`, searched with a
/// manual sweep seeded at zero: only strictly negative values qualify.
/// Returns `None` when no negative value exists in the range.
pub fn argmin_negative_after(values: &[f64], from: usize) -> Option<usize> {
    let mut find = 0.0f64;
    let mut find_idx = None;
    for (i, &v) in values.iter().enumerate().skip(from) {
        if v < find {
            find = v;
            find_idx = Some(i);
        }
    }
    find_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_forward_finds_first_match() {
        let v = [5.0, 4.0, 0.2, 3.0, 0.1];
        assert_eq!(scan_forward(&v, 0, v.len(), |x| x < 1.0), Some(2));
        assert_eq!(scan_forward(&v, 3, v.len(), |x| x < 1.0), Some(4));
        assert_eq!(scan_forward(&v, 0, 2, |x| x < 1.0), None);
    }

    #[test]
    fn test_scan_forward_clamps_range() {
        let v = [1.0, 2.0];
        assert_eq!(scan_forward(&v, 0, 100, |x| x > 1.5), Some(1));
        assert_eq!(scan_forward(&v, 5, 100, |x| x > 0.0), None);
    }

    #[test]
    fn test_scan_backward_walks_down() {
        let v = [0.1, 5.0, 4.0, 0.2, 3.0];
        assert_eq!(scan_backward(&v, 4, 0, |x| x < 1.0), Some(3));
        assert_eq!(scan_backward(&v, 2, 1, |x| x < 1.0), None);
    }

    #[test]
    fn test_scan_backward_empty_and_inverted() {
        assert_eq!(scan_backward(&[], 0, 0, |_| true), None);
        let v = [1.0, 2.0];
        assert_eq!(scan_backward(&v, 0, 1, |_| true), None);
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[1.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[]), None);
        // first occurrence wins on ties
        assert_eq!(argmax(&[2.0, 2.0]), Some(0));
    }

    #[test]
    fn test_argmin_negative_after() {
        let v = [1.0, -0.5, -2.0, -1.0, 0.5];
        assert_eq!(argmin_negative_after(&v, 0), Some(2));
        assert_eq!(argmin_negative_after(&v, 3), Some(3));
        assert_eq!(argmin_negative_after(&v, 4), None);
        // all positive: seeded at zero, nothing qualifies
        assert_eq!(argmin_negative_after(&[1.0, 2.0], 0), None);
    }
}
