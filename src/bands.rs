//! Percentile confidence bands delivered by the prediction service.
//!
//! Bands arrive only at some steps. Between two known steps the client
//! interpolates linearly; outside the known range there is no band.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `(low, high)` bounds of one percentile band.
pub type Bounds = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub p75: Bounds,
    pub p90: Bounds,
}

impl BandPoint {
    fn lerp(a: &BandPoint, b: &BandPoint, t: f64) -> BandPoint {
        let mix = |x: f64, y: f64| x + (y - x) * t;
        BandPoint {
            p75: (mix(a.p75.0, b.p75.0), mix(a.p75.1, b.p75.1)),
            p90: (mix(a.p90.0, b.p90.0), mix(a.p90.1, b.p90.1)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfidenceBands {
    known: BTreeMap<usize, BandPoint>,
}

impl ConfidenceBands {
    pub fn new(known: BTreeMap<usize, BandPoint>) -> Self {
        Self { known }
    }

    /// Build from the wire map, whose keys are step indices as strings.
    /// Keys that are not integers are dropped and returned.
    pub fn from_wire(raw: BTreeMap<String, BandPoint>) -> (Self, Vec<String>) {
        let mut known = BTreeMap::new();
        let mut rejected = Vec::new();
        for (key, point) in raw {
            match key.trim().parse::<usize>() {
                Ok(step) => {
                    known.insert(step, point);
                }
                Err(_) => rejected.push(key),
            }
        }
        (Self { known }, rejected)
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn known_steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.known.keys().copied()
    }

    pub fn at(&self, step: usize) -> Option<BandPoint> {
        if let Some(p) = self.known.get(&step) {
            return Some(*p);
        }
        let (&lo_step, lo) = self.known.range(..step).next_back()?;
        let (&hi_step, hi) = self.known.range(step..).next()?;
        let t = (step - lo_step) as f64 / (hi_step - lo_step) as f64;
        Some(BandPoint::lerp(lo, hi, t))
    }

    /// One entry per step in `0..len`.
    pub fn dense(&self, len: usize) -> Vec<Option<BandPoint>> {
        (0..len).map(|step| self.at(step)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(base: f64) -> BandPoint {
        BandPoint {
            p75: (base - 10.0, base + 10.0),
            p90: (base - 20.0, base + 20.0),
        }
    }

    fn bands() -> ConfidenceBands {
        let mut known = BTreeMap::new();
        known.insert(2, point(100.0));
        known.insert(6, point(200.0));
        ConfidenceBands::new(known)
    }

    #[test]
    fn test_known_step_is_exact() {
        assert_eq!(bands().at(2), Some(point(100.0)));
        assert_eq!(bands().at(6), Some(point(200.0)));
    }

    #[test]
    fn test_interpolates_between_known_steps() {
        let mid = bands().at(4).unwrap();
        assert_eq!(mid, point(150.0));
        let q = bands().at(3).unwrap();
        assert_eq!(q.p75, (115.0, 135.0));
    }

    #[test]
    fn test_no_extrapolation() {
        let b = bands();
        assert_eq!(b.at(0), None);
        assert_eq!(b.at(1), None);
        assert_eq!(b.at(7), None);
        let dense = b.dense(8);
        assert_eq!(dense.iter().filter(|p| p.is_some()).count(), 5);
    }

    #[test]
    fn test_from_wire_drops_bad_keys() {
        let mut raw = BTreeMap::new();
        raw.insert("12".to_string(), point(1.0));
        raw.insert("latest".to_string(), point(2.0));
        let (b, rejected) = ConfidenceBands::from_wire(raw);
        assert_eq!(b.known_steps().collect::<Vec<_>>(), vec![12]);
        assert_eq!(rejected, vec!["latest".to_string()]);
    }

    #[test]
    fn test_wire_shape() {
        let raw = r#"{"p75":[1.0,2.0],"p90":[0.5,3.0]}"#;
        let p: BandPoint = serde_json::from_str(raw).unwrap();
        assert_eq!(p.p90, (0.5, 3.0));
    }
}
