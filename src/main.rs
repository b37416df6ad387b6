use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use border_forecast::chart::{render_svg, ChartData, RenderOptions};
use border_forecast::config::Config;
use border_forecast::dashboard::{load_dashboard, DashboardView, SeriesSummary};
use border_forecast::fetch::{source_for, ArtifactFetcher};
use border_forecast::logging::{log, obj, v_str, Domain, Level, ProfileScope};
use border_forecast::series::PredictionSeries;
use border_forecast::theme::{Palette, SqlitePreferences, Theme, ThemeStore};
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::json;

fn load_palette(cfg: &Config) -> Palette {
    match SqlitePreferences::open(&cfg.prefs_path) {
        Ok(backend) => ThemeStore::load(backend).palette(),
        Err(err) => {
            log(
                Level::Warn,
                Domain::Theme,
                "prefs_unavailable",
                obj(&[("path", v_str(&cfg.prefs_path)), ("msg", v_str(&format!("{:#}", err)))]),
            );
            Palette::for_theme(Theme::default())
        }
    }
}

fn write_series_charts(
    out_dir: &Path,
    series: &PredictionSeries,
    start_at: &DateTime<FixedOffset>,
    palette: &Palette,
    opts: &RenderOptions,
) -> Result<Vec<String>> {
    let mut written = Vec::new();
    for (suffix, data) in [
        ("prediction", ChartData::prediction(series, start_at)),
        ("neighbors", ChartData::comparison(series, start_at)),
    ] {
        let svg = render_svg(&data, palette, opts);
        if svg.is_empty() {
            continue;
        }
        let name = format!("{}_{}_{}.svg", series.border, series.subject_id, suffix);
        let path = out_dir.join(&name);
        fs::write(&path, svg).with_context(|| format!("write {}", path.display()))?;
        log(
            Level::Debug,
            Domain::Render,
            "chart_written",
            obj(&[
                ("subject_id", json!(series.subject_id)),
                ("border", json!(series.border)),
                ("path", v_str(&path.display().to_string())),
            ]),
        );
        written.push(name);
    }
    Ok(written)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let location = cfg.artifact_location();
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("serve_url", v_str(&cfg.serve_url)),
            ("artifacts", v_str(&format!("{:?}", location))),
            ("out_dir", v_str(&cfg.out_dir)),
        ]),
    );

    let palette = load_palette(&cfg);
    let fetcher = ArtifactFetcher::new(source_for(&location));
    let view = load_dashboard(&fetcher, &Utc::now()).await;

    let out_dir = Path::new(&cfg.out_dir);
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;

    let opts = RenderOptions {
        width: cfg.chart_width,
        height: cfg.chart_height,
        pointer_x: cfg.pointer_x,
        zoom: None,
    };

    let mut charts = Vec::new();
    if let Some(event) = view.event() {
        let _scope = ProfileScope::new("render_all");
        for series in view.series() {
            charts.extend(write_series_charts(out_dir, series, &event.start_at, &palette, &opts)?);
        }
    }

    let summaries: Vec<SeriesSummary> = view.summaries();
    let reason = match &view {
        DashboardView::NoActiveEvent { reason } => Some(reason.as_str()),
        _ => None,
    };
    let index = json!({
        "layout": view.layout(),
        "event": view.event(),
        "tabs": view.tab_labels(),
        "reason": reason,
        "summaries": summaries,
        "charts": charts,
    });
    let index_path = out_dir.join("index.json");
    fs::write(&index_path, serde_json::to_string_pretty(&index)?)
        .with_context(|| format!("write {}", index_path.display()))?;

    log(
        Level::Info,
        Domain::System,
        "done",
        obj(&[
            ("layout", json!(view.layout())),
            ("charts", json!(charts.len())),
            ("index", v_str(&index_path.display().to_string())),
        ]),
    );
    Ok(())
}
