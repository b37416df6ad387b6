//! Validated model of one `predictions.json` artifact.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::bands::{BandPoint, ConfidenceBands};
use crate::logging::log_rescale_warning;
use crate::outlier::{self, OutlierReport};
use crate::rescale::{self, neighbor_duration_days};

/// Numbers that are absent, `null`, non-numeric or non-finite become `None`.
fn lenient_numbers<'de, D>(de: D) -> Result<Vec<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(de)?;
    Ok(raw
        .iter()
        .map(|v| v.as_f64().filter(|x| x.is_finite()))
        .collect())
}

fn lenient_numbers_opt<'de, D>(de: D) -> Result<Option<Vec<Option<f64>>>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_numbers(de).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NeighborPayload {
    pub name: String,
    pub id: u32,
    pub raw_length: usize,
    #[serde(deserialize_with = "lenient_numbers")]
    pub curve: Vec<Option<f64>>,
}

/// Wire shape of `prediction/{subject}/{border}/predictions.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionPayload {
    #[serde(default)]
    pub event_id: Option<u32>,
    pub subject_id: u32,
    pub border: u32,
    pub last_known_step_index: usize,
    #[serde(deserialize_with = "lenient_numbers")]
    pub raw_target: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "lenient_numbers_opt")]
    pub normalized_target: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub neighbors: BTreeMap<String, NeighborPayload>,
    #[serde(default)]
    pub intervals: BTreeMap<String, BandPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub name: String,
    pub id: u32,
    pub raw_length: usize,
    pub curve: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionSeries {
    pub event_id: Option<u32>,
    pub subject_id: u32,
    pub border: u32,
    pub raw_target: Vec<Option<f64>>,
    pub last_known_step_index: usize,
    pub normalized_target: Vec<Option<f64>>,
    pub neighbors: BTreeMap<String, Neighbor>,
    pub bands: Option<ConfidenceBands>,
    /// Non-fatal problems found while building the series.
    pub warnings: Vec<String>,
}

impl PredictionSeries {
    /// Validate a payload. `current_days` is the displayed event's duration,
    /// used for neighbors delivered at a different length.
    pub fn from_payload(payload: PredictionPayload, current_days: Option<f64>) -> Result<Self> {
        let n = payload.raw_target.len();
        if n == 0 {
            bail!(
                "empty prediction for subject {} border {}",
                payload.subject_id,
                payload.border
            );
        }
        if payload.last_known_step_index >= n {
            bail!(
                "last_known_step_index {} out of range for {} steps",
                payload.last_known_step_index,
                n
            );
        }

        let mut warnings = Vec::new();
        let normalized_target = match payload.normalized_target {
            Some(v) if v.len() == n => v,
            Some(v) => bail!("normalized_target has {} steps, raw_target has {}", v.len(), n),
            None => {
                warnings.push("normalized_target missing; using raw_target".to_string());
                payload.raw_target.clone()
            }
        };

        let mut neighbors = BTreeMap::new();
        for (key, nb) in payload.neighbors {
            let curve = if nb.curve.len() == n {
                nb.curve
            } else {
                let out = rescale::rescale(
                    &nb.curve,
                    Some(neighbor_duration_days(nb.raw_length)),
                    current_days,
                    n,
                );
                if let Some(w) = out.warning {
                    log_rescale_warning(&key, &w.to_string());
                    warnings.push(format!("{}: {}", key, w));
                }
                if out.values.is_empty() {
                    warnings.push(format!("{}: empty curve", key));
                    vec![None; n]
                } else {
                    out.values
                }
            };
            neighbors.insert(
                key,
                Neighbor {
                    name: nb.name,
                    id: nb.id,
                    raw_length: nb.raw_length,
                    curve,
                },
            );
        }

        let bands = if payload.intervals.is_empty() {
            None
        } else {
            let (bands, rejected) = ConfidenceBands::from_wire(payload.intervals);
            for key in rejected {
                warnings.push(format!("interval key {:?} is not a step index", key));
            }
            Some(bands).filter(|b| !b.is_empty())
        };

        Ok(Self {
            event_id: payload.event_id,
            subject_id: payload.subject_id,
            border: payload.border,
            raw_target: payload.raw_target,
            last_known_step_index: payload.last_known_step_index,
            normalized_target,
            neighbors,
            bands,
            warnings,
        })
    }

    pub fn from_json(body: &str, current_days: Option<f64>) -> Result<Self> {
        let payload: PredictionPayload = serde_json::from_str(body)?;
        Self::from_payload(payload, current_days)
    }

    pub fn len(&self) -> usize {
        self.raw_target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_target.is_empty()
    }

    /// Steps before the last known index are observed; the rest are predicted.
    pub fn is_observed(&self, step: usize) -> bool {
        step < self.last_known_step_index
    }

    pub fn neighbor_curves(&self) -> Vec<&[Option<f64>]> {
        self.neighbors.values().map(|n| n.curve.as_slice()).collect()
    }

    pub fn outlier(&self) -> OutlierReport {
        outlier::detect(
            &self.normalized_target,
            &self.neighbor_curves(),
            self.last_known_step_index,
        )
    }

    /// Final-step prediction, if present.
    pub fn final_prediction(&self) -> Option<f64> {
        self.raw_target.last().copied().flatten()
    }

    /// Most recent present value at or before the last known step.
    pub fn latest_observed(&self) -> Option<(usize, f64)> {
        (0..=self.last_known_step_index)
            .rev()
            .find_map(|i| self.raw_target[i].map(|v| (i, v)))
    }
}
