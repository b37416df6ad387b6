//! Align a neighbor event's curve onto the current event's time basis.
//!
//! Two independent steps:
//! - progress resampling: output step `i` of `n` reads the neighbor at
//!   progress `i / (n - 1)`, linearly interpolated between the two bracketing
//!   samples. Progress 0 and 1 land exactly on the first and last sample.
//! - amplitude scaling: every value is multiplied by
//!   `current_days / neighbor_days`, assuming score accumulates roughly in
//!   proportion to event length.
//!
//! A missing or non-positive duration skips the amplitude step and reports a
//! [`RescaleWarning`] instead of failing.

use std::fmt;

use serde::Serialize;

use crate::time_axis::STEP_MINUTES;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RescaleWarning {
    NeighborDurationInvalid(f64),
    CurrentDurationInvalid(f64),
}

impl fmt::Display for RescaleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RescaleWarning::NeighborDurationInvalid(d) => {
                write!(f, "neighbor duration {} days is not usable; values left unscaled", d)
            }
            RescaleWarning::CurrentDurationInvalid(d) => {
                write!(f, "current duration {} days is not usable; values left unscaled", d)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rescaled {
    pub values: Vec<Option<f64>>,
    pub warning: Option<RescaleWarning>,
}

/// Duration spanned by `raw_length` samples at the fixed step. Fewer than
/// two samples span nothing.
pub fn neighbor_duration_days(raw_length: usize) -> f64 {
    raw_length.saturating_sub(1) as f64 * STEP_MINUTES as f64 / (24.0 * 60.0)
}

fn usable(days: f64) -> bool {
    days.is_finite() && days > 0.0
}

/// Amplitude ratio, or the reason it cannot be applied.
pub fn duration_ratio(
    neighbor_days: Option<f64>,
    current_days: Option<f64>,
) -> Result<f64, RescaleWarning> {
    let neighbor = neighbor_days.unwrap_or(0.0);
    let current = current_days.unwrap_or(0.0);
    if !usable(neighbor) {
        return Err(RescaleWarning::NeighborDurationInvalid(neighbor));
    }
    if !usable(current) {
        return Err(RescaleWarning::CurrentDurationInvalid(current));
    }
    Ok(current / neighbor)
}

/// Value of `curve` at fractional position `pos` in `[0, len - 1]`.
fn sample_at(curve: &[Option<f64>], pos: f64) -> Option<f64> {
    let last = curve.len() - 1;
    let lo = (pos.floor() as usize).min(last);
    let hi = (lo + 1).min(last);
    let t = pos - lo as f64;
    if t <= 0.0 || lo == hi {
        return curve[lo];
    }
    match (curve[lo], curve[hi]) {
        (Some(a), Some(b)) => Some(a + (b - a) * t),
        _ => None,
    }
}

/// Resample `curve` onto `target_len` evenly spaced progress points.
pub fn resample(curve: &[Option<f64>], target_len: usize) -> Vec<Option<f64>> {
    if curve.is_empty() || target_len == 0 {
        return Vec::new();
    }
    if target_len == 1 {
        return vec![curve[0]];
    }
    let last = (curve.len() - 1) as f64;
    let denom = (target_len - 1) as f64;
    (0..target_len)
        .map(|i| {
            if i == target_len - 1 {
                // exact at progress 1
                return curve[curve.len() - 1];
            }
            sample_at(curve, i as f64 / denom * last)
        })
        .collect()
}

pub fn rescale(
    curve: &[Option<f64>],
    neighbor_days: Option<f64>,
    current_days: Option<f64>,
    target_len: usize,
) -> Rescaled {
    let resampled = resample(curve, target_len);
    match duration_ratio(neighbor_days, current_days) {
        Ok(ratio) => Rescaled {
            values: resampled.into_iter().map(|v| v.map(|x| x * ratio)).collect(),
            warning: None,
        },
        Err(warning) => Rescaled {
            values: resampled,
            warning: Some(warning),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(v: &[f64]) -> Vec<Option<f64>> {
        v.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_boundaries_are_exact() {
        let curve = some(&[10.0, 40.0, 70.0, 130.0]);
        for n in [2, 3, 7, 11, 100] {
            let out = rescale(&curve, Some(6.0), Some(9.0), n);
            assert_eq!(out.values.len(), n);
            assert_eq!(out.values[0], Some(15.0));
            assert_eq!(out.values[n - 1], Some(195.0));
            assert!(out.warning.is_none());
        }
    }

    #[test]
    fn test_linear_interpolation_between_samples() {
        let curve = some(&[0.0, 100.0]);
        let out = resample(&curve, 5);
        assert_eq!(out, some(&[0.0, 25.0, 50.0, 75.0, 100.0]));
    }

    #[test]
    fn test_downsample_hits_samples() {
        let curve = some(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(resample(&curve, 3), some(&[0.0, 2.0, 4.0]));
    }

    #[test]
    fn test_missing_bracket_yields_none() {
        let curve = vec![Some(0.0), None, Some(20.0)];
        let out = resample(&curve, 5);
        assert_eq!(out[0], Some(0.0));
        assert_eq!(out[1], None);
        assert_eq!(out[2], None);
        assert_eq!(out[4], Some(20.0));
    }

    #[test]
    fn test_zero_duration_passes_through() {
        let curve = some(&[5.0, 10.0]);
        let out = rescale(&curve, Some(0.0), Some(7.0), 2);
        assert_eq!(out.values, curve);
        assert_eq!(out.warning, Some(RescaleWarning::NeighborDurationInvalid(0.0)));

        let out = rescale(&curve, Some(7.0), None, 2);
        assert_eq!(out.values, curve);
        assert_eq!(out.warning, Some(RescaleWarning::CurrentDurationInvalid(0.0)));
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(rescale(&[], Some(1.0), Some(1.0), 10).values.is_empty());
        assert!(resample(&some(&[1.0]), 0).is_empty());
        assert_eq!(resample(&some(&[3.0, 4.0]), 1), some(&[3.0]));
        assert_eq!(resample(&some(&[3.0]), 4), some(&[3.0, 3.0, 3.0, 3.0]));
    }

    #[test]
    fn test_neighbor_duration_from_samples() {
        assert!((neighbor_duration_days(49) - 1.0).abs() < 1e-12);
        assert!((neighbor_duration_days(337) - 7.0).abs() < 1e-12);
        assert_eq!(neighbor_duration_days(0), 0.0);
        assert_eq!(neighbor_duration_days(1), 0.0);
    }

    #[test]
    fn test_single_sample_neighbor_is_left_unscaled() {
        let out = rescale(&some(&[5.0]), Some(neighbor_duration_days(1)), Some(7.0), 3);
        assert_eq!(out.values, some(&[5.0, 5.0, 5.0]));
        assert_eq!(out.warning, Some(RescaleWarning::NeighborDurationInvalid(0.0)));
    }
}
