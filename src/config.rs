use std::path::PathBuf;

use url::Url;

pub const DEFAULT_CDN_BASE: &str = "https://cdn.example.com/border-forecast";
pub const DEFAULT_ARTIFACT_DIR: &str = "public/data";

/// Where artifacts are read from, decided by the host the dashboard is served on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    LocalDev,
    Production,
}

impl Environment {
    pub fn from_host(serve_url: &str) -> Self {
        let host = Url::parse(serve_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_matches(['[', ']']).to_ascii_lowercase()));
        match host.as_deref() {
            Some("localhost") | Some("127.0.0.1") | Some("::1") => Environment::LocalDev,
            Some(h) if h.ends_with(".local") || h.ends_with(".localhost") => Environment::LocalDev,
            _ => Environment::Production,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLocation {
    Dir(PathBuf),
    Cdn(String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub serve_url: String,
    pub cdn_base: String,
    pub artifact_dir: String,
    pub prefs_path: String,
    pub out_dir: String,
    pub chart_width: u32,
    pub chart_height: u32,
    /// Crosshair position in pixels for rendered charts, if any.
    pub pointer_x: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serve_url: "http://localhost:8080/".to_string(),
            cdn_base: DEFAULT_CDN_BASE.to_string(),
            artifact_dir: DEFAULT_ARTIFACT_DIR.to_string(),
            prefs_path: "prefs.sqlite".to_string(),
            out_dir: "out/charts".to_string(),
            chart_width: 960,
            chart_height: 480,
            pointer_x: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            serve_url: std::env::var("SERVE_URL").unwrap_or(d.serve_url),
            cdn_base: std::env::var("CDN_BASE").unwrap_or(d.cdn_base),
            artifact_dir: std::env::var("ARTIFACT_DIR").unwrap_or(d.artifact_dir),
            prefs_path: std::env::var("PREFS_PATH").unwrap_or(d.prefs_path),
            out_dir: std::env::var("OUT_DIR").unwrap_or(d.out_dir),
            chart_width: std::env::var("CHART_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(d.chart_width),
            chart_height: std::env::var("CHART_HEIGHT").ok().and_then(|v| v.parse().ok()).unwrap_or(d.chart_height),
            pointer_x: std::env::var("POINTER_X").ok().and_then(|v| v.parse().ok()),
        }
    }

    pub fn environment(&self) -> Environment {
        Environment::from_host(&self.serve_url)
    }

    pub fn artifact_location(&self) -> ArtifactLocation {
        match self.environment() {
            Environment::LocalDev => ArtifactLocation::Dir(PathBuf::from(&self.artifact_dir)),
            Environment::Production => {
                ArtifactLocation::Cdn(self.cdn_base.trim_end_matches('/').to_string())
            }
        }
    }
}
