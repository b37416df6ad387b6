//! Chart-ready series and their SVG rendering.
//!
//! Two charts exist per prediction: the prediction chart (observed and
//! predicted score with confidence bands) and the comparison chart
//! (normalized target against the neighbor curves). Both are rendered through
//! the same [`ChartProjector`], so the crosshair snaps exactly as it would in
//! the interactive view.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::bands::BandPoint;
use crate::idols::subject_label;
use crate::outlier::{Direction, OutlierReport};
use crate::projector::{ChartProjector, TooltipSide};
use crate::series::PredictionSeries;
use crate::theme::Palette;
use crate::time_axis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRole {
    Observed,
    Predicted,
    Target,
    Neighbor,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub name: String,
    pub role: LineRole,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub title: String,
    pub labels: Vec<String>,
    pub lines: Vec<Line>,
    pub bands: Vec<Option<BandPoint>>,
    pub last_known_step_index: usize,
    pub outlier: Option<OutlierReport>,
}

impl ChartData {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Raw score split at the last known step, plus confidence bands.
    pub fn prediction(series: &PredictionSeries, start_at: &DateTime<FixedOffset>) -> Self {
        let split = series.last_known_step_index;
        // both halves share the split point so the lines join
        let observed = series
            .raw_target
            .iter()
            .enumerate()
            .map(|(i, v)| if i <= split { *v } else { None })
            .collect();
        let predicted = series
            .raw_target
            .iter()
            .enumerate()
            .map(|(i, v)| if i >= split { *v } else { None })
            .collect();

        Self {
            title: format!("{} · Rank {}", subject_label(series.subject_id), series.border),
            labels: time_axis::build(start_at, series.len()),
            lines: vec![
                Line {
                    name: "Observed".to_string(),
                    role: LineRole::Observed,
                    values: observed,
                },
                Line {
                    name: "Predicted".to_string(),
                    role: LineRole::Predicted,
                    values: predicted,
                },
            ],
            bands: series
                .bands
                .as_ref()
                .map(|b| b.dense(series.len()))
                .unwrap_or_default(),
            last_known_step_index: split,
            outlier: None,
        }
    }

    /// Normalized target against every neighbor curve, with the outlier flag.
    pub fn comparison(series: &PredictionSeries, start_at: &DateTime<FixedOffset>) -> Self {
        let mut lines = vec![Line {
            name: "Current".to_string(),
            role: LineRole::Target,
            values: series.normalized_target.clone(),
        }];
        lines.extend(series.neighbors.values().map(|n| Line {
            name: n.name.clone(),
            role: LineRole::Neighbor,
            values: n.curve.clone(),
        }));

        Self {
            title: format!(
                "{} · Rank {} · neighbors",
                subject_label(series.subject_id),
                series.border
            ),
            labels: time_axis::build(start_at, series.len()),
            lines,
            bands: Vec::new(),
            last_known_step_index: series.last_known_step_index,
            outlier: Some(series.outlier()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Crosshair pointer position in pixels.
    pub pointer_x: Option<f64>,
    /// Inclusive zoom window over absolute indices.
    pub zoom: Option<(usize, usize)>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 960,
            height: 480,
            pointer_x: None,
            zoom: None,
        }
    }
}

const MARGIN_TOP: u32 = 50;
const MARGIN_RIGHT: u32 = 30;
const MARGIN_BOTTOM: u32 = 60;
const MARGIN_LEFT: u32 = 90;
const TOOLTIP_GAP: f64 = 10.0;
const TOOLTIP_LINE: f64 = 16.0;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_score(v: f64) -> String {
    let n = v.round() as i64;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

fn line_color<'a>(role: LineRole, palette: &'a Palette) -> &'a str {
    match role {
        LineRole::Observed => palette.observed,
        LineRole::Predicted | LineRole::Target => palette.predicted,
        LineRole::Neighbor => palette.neighbor,
    }
}

/// Min/max of every present value in `range`, padded by 5%.
fn y_bounds(data: &ChartData, range: std::ops::RangeInclusive<usize>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut take = |v: f64| {
        min = min.min(v);
        max = max.max(v);
    };
    for i in range {
        for line in &data.lines {
            if let Some(v) = line.values.get(i).copied().flatten() {
                take(v);
            }
        }
        if let Some(b) = data.bands.get(i).copied().flatten() {
            take(b.p90.0);
            take(b.p90.1);
        }
    }
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

/// SVG document for `data`; empty when there is nothing to plot.
pub fn render_svg(data: &ChartData, palette: &Palette, opts: &RenderOptions) -> String {
    if data.is_empty() {
        return String::new();
    }

    let width = opts.width.max(MARGIN_LEFT + MARGIN_RIGHT + 10);
    let height = opts.height.max(MARGIN_TOP + MARGIN_BOTTOM + 10);
    let plot_width = f64::from(width - MARGIN_LEFT - MARGIN_RIGHT);
    let plot_height = f64::from(height - MARGIN_TOP - MARGIN_BOTTOM);
    let plot_left = f64::from(MARGIN_LEFT);
    let plot_bottom = f64::from(height - MARGIN_BOTTOM);

    let mut projector = ChartProjector::new(plot_left, plot_width, data.len());
    if let Some((min, max)) = opts.zoom {
        projector.set_zoom(min, max);
    }
    let first = projector.to_absolute(0);
    let last = projector.to_absolute(projector.visible_len() - 1);

    let (min_y, max_y) = y_bounds(data, first..=last);
    let scale_y = |v: f64| -> f64 {
        f64::from(MARGIN_TOP) + (1.0 - (v - min_y) / (max_y - min_y)) * plot_height
    };

    let mut svg = String::with_capacity(16 * 1024);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
        width, height
    );
    let _ = writeln!(
        svg,
        r#"<rect width="{}" height="{}" fill="{}"/>"#,
        width, height, palette.background
    );
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" font-family="system-ui, sans-serif" font-size="18" font-weight="bold" fill="{}">{}</text>"#,
        f64::from(width) / 2.0,
        palette.text,
        escape(&data.title)
    );

    // Grid and y ticks
    for i in 0..=5 {
        let frac = f64::from(i) / 5.0;
        let v = min_y + frac * (max_y - min_y);
        let y = scale_y(v);
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1"/>"#,
            MARGIN_LEFT,
            y,
            plot_left + plot_width,
            y,
            palette.grid
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.2}" text-anchor="end" font-family="system-ui, sans-serif" font-size="11" fill="{}">{}</text>"#,
            MARGIN_LEFT - 10,
            y + 4.0,
            palette.text,
            format_score(v)
        );
    }

    // X ticks: at most 8 labels across the visible window
    let visible = projector.visible_len();
    let stride = visible.div_ceil(8).max(1);
    for rel in (0..visible).step_by(stride) {
        let x = projector.index_to_pixel(rel);
        let label = &data.labels[projector.to_absolute(rel)];
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{}" text-anchor="middle" font-family="system-ui, sans-serif" font-size="11" fill="{}">{}</text>"#,
            x,
            height - MARGIN_BOTTOM + 20,
            palette.text,
            escape(label)
        );
    }

    // Axes
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1.5"/>"#,
        MARGIN_LEFT,
        plot_bottom,
        plot_left + plot_width,
        plot_bottom,
        palette.axis
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{:.2}" stroke="{}" stroke-width="1.5"/>"#,
        MARGIN_LEFT, MARGIN_TOP, MARGIN_LEFT, plot_bottom, palette.axis
    );

    // Bands: p90 under p75, each polygon split where a band is missing
    for (pick, fill) in [
        ((|b: &BandPoint| b.p90) as fn(&BandPoint) -> (f64, f64), palette.band_p90),
        ((|b: &BandPoint| b.p75) as fn(&BandPoint) -> (f64, f64), palette.band_p75),
    ] {
        let mut run: Vec<(f64, f64, f64)> = Vec::new();
        let flush = |run: &mut Vec<(f64, f64, f64)>, svg: &mut String| {
            if run.len() >= 2 {
                let mut pts = String::new();
                for (x, lo, _) in run.iter() {
                    let _ = write!(pts, "{:.2},{:.2} ", x, scale_y(*lo));
                }
                for (x, _, hi) in run.iter().rev() {
                    let _ = write!(pts, "{:.2},{:.2} ", x, scale_y(*hi));
                }
                let _ = writeln!(
                    svg,
                    r#"<polygon points="{}" fill="{}" fill-opacity="0.6" stroke="none"/>"#,
                    pts.trim_end(),
                    fill
                );
            }
            run.clear();
        };
        for rel in 0..visible {
            match data.bands.get(projector.to_absolute(rel)).copied().flatten() {
                Some(b) => {
                    let (lo, hi) = pick(&b);
                    run.push((projector.index_to_pixel(rel), lo, hi));
                }
                None => flush(&mut run, &mut svg),
            }
        }
        flush(&mut run, &mut svg);
    }

    // Observed/predicted boundary
    if let Some(x) = projector.absolute_to_pixel(data.last_known_step_index) {
        let _ = writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-dasharray="4 4"/>"#,
            x, MARGIN_TOP, x, plot_bottom, palette.axis
        );
    }

    // Lines; neighbors first so the target draws on top
    let mut ordered: Vec<&Line> = data.lines.iter().collect();
    ordered.sort_by_key(|l| l.role != LineRole::Neighbor);
    for line in ordered {
        let mut path = String::new();
        let mut pen_down = false;
        for rel in 0..visible {
            match line.values.get(projector.to_absolute(rel)).copied().flatten() {
                Some(v) => {
                    let prefix = if pen_down { " L" } else { " M" };
                    let _ = write!(path, "{} {:.2},{:.2}", prefix, projector.index_to_pixel(rel), scale_y(v));
                    pen_down = true;
                }
                None => pen_down = false,
            }
        }
        if path.is_empty() {
            continue;
        }
        let (stroke_width, dash) = match line.role {
            LineRole::Neighbor => ("1.2", r#" stroke-opacity="0.7""#),
            LineRole::Predicted => ("2.5", r#" stroke-dasharray="6 3""#),
            _ => ("2.5", ""),
        };
        let _ = writeln!(
            svg,
            r#"<path d="{}" stroke="{}" stroke-width="{}" fill="none"{}><title>{}</title></path>"#,
            path.trim_start(),
            line_color(line.role, palette),
            stroke_width,
            dash,
            escape(&line.name)
        );
    }

    if let Some(direction) = data.outlier.and_then(|r| r.direction) {
        let side = match direction {
            Direction::High => "above",
            Direction::Low => "below",
        };
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{}" text-anchor="end" font-family="system-ui, sans-serif" font-size="12" fill="{}">Outlier ({}): current event is {} every neighbor</text>"#,
            plot_left + plot_width,
            MARGIN_TOP - 8,
            palette.warning,
            direction.as_str(),
            side
        );
    }

    if let Some(hover) = opts.pointer_x.and_then(|px| projector.hover(px)) {
        render_crosshair(&mut svg, data, palette, &projector, hover.absolute, hover.pixel_x, plot_bottom);
    }

    svg.push_str("</svg>\n");
    svg
}

fn render_crosshair(
    svg: &mut String,
    data: &ChartData,
    palette: &Palette,
    projector: &ChartProjector,
    absolute: usize,
    x: f64,
    plot_bottom: f64,
) {
    let _ = writeln!(
        svg,
        r#"<line x1="{:.2}" y1="{}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1"/>"#,
        x, MARGIN_TOP, x, plot_bottom, palette.crosshair
    );

    let mut rows = vec![data.labels[absolute].clone()];
    for line in &data.lines {
        if let Some(v) = line.values.get(absolute).copied().flatten() {
            rows.push(format!("{}: {}", line.name, format_score(v)));
        }
    }
    if let Some(b) = data.bands.get(absolute).copied().flatten() {
        rows.push(format!("90%: {} to {}", format_score(b.p90.0), format_score(b.p90.1)));
    }

    let longest = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let box_w = longest as f64 * 7.0 + 16.0;
    let box_h = rows.len() as f64 * TOOLTIP_LINE + 10.0;
    let (side, box_x) = projector.tooltip_position(x, box_w, TOOLTIP_GAP);
    let box_y = f64::from(MARGIN_TOP) + 8.0;

    let _ = writeln!(
        svg,
        r#"<g class="tooltip" data-side="{}"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="4" fill="{}" stroke="{}"/>"#,
        match side {
            TooltipSide::Left => "left",
            TooltipSide::Right => "right",
        },
        box_x,
        box_y,
        box_w,
        box_h,
        palette.tooltip_bg,
        palette.grid
    );
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="system-ui, sans-serif" font-size="12" fill="{}">{}</text>"#,
            box_x + 8.0,
            box_y + 18.0 + i as f64 * TOOLTIP_LINE,
            palette.text,
            escape(row)
        );
    }
    svg.push_str("</g>\n");
}
