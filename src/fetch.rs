//! Loading of the static JSON artifacts.
//!
//! Artifacts come from an [`ArtifactSource`]: the CDN over HTTP in production,
//! a directory on disk during local development. Prediction artifacts for one
//! event are requested concurrently and awaited as one batch; a failed subject
//! is left out of the result rather than failing the batch.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::config::ArtifactLocation;
use crate::event::{EventInfo, EventKind};
use crate::logging::{log_fetch, log_fetch_failure, ProfileScope};
use crate::series::PredictionSeries;

pub const METADATA_PATH: &str = "metadata/latest_event_border_info.json";

pub fn prediction_path(subject_id: u32, border: u32) -> String {
    format!("prediction/{}/{}/predictions.json", subject_id, border)
}

#[async_trait]
pub trait ArtifactSource {
    /// Body of the artifact at `path`, relative to the source root.
    async fn get(&self, path: &str) -> Result<String>;
}

pub struct HttpSource {
    client: Client,
    base: String,
}

impl HttpSource {
    pub fn new(base: &str) -> Self {
        Self {
            client: Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ArtifactSource for HttpSource {
    async fn get(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}", self.base, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;
        if !resp.status().is_success() {
            return Err(anyhow!("GET {} returned {}", url, resp.status()));
        }
        Ok(resp.text().await?)
    }
}

pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactSource for DirSource {
    async fn get(&self, path: &str) -> Result<String> {
        let full = self.root.join(path);
        tokio::fs::read_to_string(&full)
            .await
            .with_context(|| format!("read {}", full.display()))
    }
}

pub fn source_for(location: &ArtifactLocation) -> Box<dyn ArtifactSource + Send + Sync> {
    match location {
        ArtifactLocation::Dir(dir) => Box::new(DirSource::new(dir.clone())),
        ArtifactLocation::Cdn(base) => Box::new(HttpSource::new(base)),
    }
}

pub fn body_sha256(body: &str) -> String {
    hex::encode(Sha256::digest(body.as_bytes()))
}

/// Predictions of one event, keyed by border then subject id.
#[derive(Debug, Default)]
pub struct PredictionSet {
    pub by_border: BTreeMap<u32, BTreeMap<u32, PredictionSeries>>,
    /// `(subject_id, border, reason)` for every artifact left out.
    pub omitted: Vec<(u32, u32, String)>,
}

impl PredictionSet {
    pub fn get(&self, border: u32, subject_id: u32) -> Option<&PredictionSeries> {
        self.by_border.get(&border)?.get(&subject_id)
    }

    pub fn loaded(&self) -> usize {
        self.by_border.values().map(|m| m.len()).sum()
    }
}

pub struct ArtifactFetcher<S: ArtifactSource + ?Sized> {
    source: Box<S>,
}

impl<S: ArtifactSource + ?Sized> ArtifactFetcher<S> {
    pub fn new(source: Box<S>) -> Self {
        Self { source }
    }

    async fn get_logged(&self, path: &str) -> Result<String> {
        let body = self.source.get(path).await?;
        log_fetch(path, body.len(), &body_sha256(&body));
        Ok(body)
    }

    pub async fn fetch_event_info(&self) -> Result<EventInfo> {
        let body = self.get_logged(METADATA_PATH).await?;
        serde_json::from_str(&body).with_context(|| format!("parse {}", METADATA_PATH))
    }

    pub async fn fetch_prediction(
        &self,
        subject_id: u32,
        border: u32,
        current_days: Option<f64>,
    ) -> Result<PredictionSeries> {
        let path = prediction_path(subject_id, border);
        let body = self.get_logged(&path).await?;
        PredictionSeries::from_json(&body, current_days).with_context(|| format!("parse {}", path))
    }

    /// Every (subject, border) pair the event kind calls for, fetched concurrently.
    pub async fn fetch_all(&self, kind: EventKind, current_days: Option<f64>) -> PredictionSet {
        let _scope = ProfileScope::new("fetch_all");
        let pairs: Vec<(u32, u32)> = kind
            .borders()
            .iter()
            .flat_map(|&border| kind.subjects().into_iter().map(move |s| (s, border)))
            .collect();

        let results = join_all(
            pairs
                .iter()
                .map(|&(subject, border)| self.fetch_prediction(subject, border, current_days)),
        )
        .await;

        let mut set = PredictionSet::default();
        for (&(subject, border), result) in pairs.iter().zip(results) {
            match result {
                Ok(series) => {
                    set.by_border.entry(border).or_default().insert(subject, series);
                }
                Err(err) => {
                    let reason = format!("{:#}", err);
                    log_fetch_failure(subject, border, &reason);
                    set.omitted.push((subject, border, reason));
                }
            }
        }
        set
    }
}
