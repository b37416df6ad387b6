//! Flags a target curve that sits above (or below) every neighbor near the
//! observation boundary. Such a target is likely to be mispredicted, since
//! the neighbors are what the prediction was built from.

use serde::Serialize;

/// Number of indices examined, ending at the last known step.
pub const WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    High,
    Low,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::High => "high",
            Direction::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutlierReport {
    pub is_outlier: bool,
    pub direction: Option<Direction>,
    /// Indices that had both a target value and at least one neighbor value.
    pub checked_indices: usize,
}

impl OutlierReport {
    fn none(checked_indices: usize) -> Self {
        Self {
            is_outlier: false,
            direction: None,
            checked_indices,
        }
    }
}

pub fn detect(
    target: &[Option<f64>],
    neighbors: &[&[Option<f64>]],
    last_known_index: usize,
) -> OutlierReport {
    let start = last_known_index.saturating_sub(WINDOW - 1);
    let mut all_high = true;
    let mut all_low = true;
    let mut checked = 0;

    for idx in start..=last_known_index {
        let Some(value) = target.get(idx).copied().flatten() else {
            continue;
        };
        let mut present = neighbors
            .iter()
            .filter_map(|curve| curve.get(idx).copied().flatten())
            .peekable();
        if present.peek().is_none() {
            continue;
        }
        let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        checked += 1;
        all_high &= value > max;
        all_low &= value < min;
    }

    if checked == 0 {
        return OutlierReport::none(0);
    }
    let direction = match (all_high, all_low) {
        (true, _) => Some(Direction::High),
        (_, true) => Some(Direction::Low),
        _ => None,
    };
    OutlierReport {
        is_outlier: direction.is_some(),
        direction,
        checked_indices: checked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(v: &[f64]) -> Vec<Option<f64>> {
        v.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_consistently_high() {
        let target = some(&[100.0, 110.0, 120.0]);
        let n = some(&[50.0, 60.0, 70.0]);
        let r = detect(&target, &[&n[..], &n[..]], 2);
        assert!(r.is_outlier);
        assert_eq!(r.direction, Some(Direction::High));
        assert_eq!(r.checked_indices, 3);
    }

    #[test]
    fn test_consistently_low() {
        let target = some(&[1.0, 2.0, 3.0, 4.0]);
        let a = some(&[0.0, 50.0, 60.0, 70.0]);
        let b = some(&[0.0, 10.0, 20.0, 30.0]);
        let r = detect(&target, &[&a[..], &b[..]], 3);
        assert_eq!(r.direction, Some(Direction::Low));
    }

    #[test]
    fn test_mixed_is_not_outlier() {
        let target = some(&[100.0, 110.0, 120.0]);
        let a = some(&[90.0, 200.0, 70.0]);
        let b = some(&[50.0, 300.0, 10.0]);
        let r = detect(&target, &[&a[..], &b[..]], 2);
        assert!(!r.is_outlier);
        assert_eq!(r.direction, None);
    }

    #[test]
    fn test_no_neighbor_data() {
        let target = some(&[100.0, 110.0, 120.0]);
        let empty = vec![None, None, None];
        let r = detect(&target, &[&empty[..]], 2);
        assert_eq!(r, OutlierReport::none(0));
        assert!(!detect(&target, &[], 2).is_outlier);
    }

    #[test]
    fn test_tie_breaks_both() {
        let target = some(&[100.0, 110.0, 120.0]);
        let n = some(&[50.0, 60.0, 120.0]);
        assert!(!detect(&target, &[&n[..]], 2).is_outlier);
    }

    #[test]
    fn test_window_clamps_at_start() {
        let target = some(&[100.0]);
        let n = some(&[10.0]);
        let r = detect(&target, &[&n[..]], 0);
        assert_eq!(r.checked_indices, 1);
        assert_eq!(r.direction, Some(Direction::High));
    }

    #[test]
    fn test_partial_neighbor_data_uses_present_points() {
        let target = some(&[0.0, 0.0, 100.0, 110.0, 120.0]);
        let a = vec![None, None, None, Some(10.0), None];
        let b = vec![None, None, Some(5.0), None, None];
        let r = detect(&target, &[&a[..], &b[..]], 4);
        assert_eq!(r.checked_indices, 2);
        assert_eq!(r.direction, Some(Direction::High));
    }
}
