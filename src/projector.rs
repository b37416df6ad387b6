//! Pointer geometry for the chart's crosshair and tooltip.
//!
//! Indices returned while zoomed are relative to the window start; use
//! [`ChartProjector::to_absolute`] before indexing the full series.

use serde::Serialize;

/// Snap a horizontal pixel position to the nearest data index in `0..visible_len`.
pub fn pixel_to_index(pixel_x: f64, plot_left: f64, plot_width: f64, visible_len: usize) -> usize {
    if visible_len <= 1 || !(plot_width > 0.0) || !pixel_x.is_finite() {
        return 0;
    }
    let last = visible_len - 1;
    let step = plot_width / last as f64;
    let raw = ((pixel_x - plot_left) / step).round();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(last)
    }
}

/// Pixel position of data index `index` in `0..visible_len`.
pub fn index_to_pixel(index: usize, plot_left: f64, plot_width: f64, visible_len: usize) -> f64 {
    if visible_len <= 1 {
        return plot_left;
    }
    plot_left + index as f64 * plot_width / (visible_len - 1) as f64
}

/// Inclusive range of absolute indices currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoomWindow {
    pub min: usize,
    pub max: usize,
}

impl ZoomWindow {
    pub fn len(&self) -> usize {
        self.max - self.min + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hover {
    /// Index relative to the visible window.
    pub relative: usize,
    /// Index into the full series.
    pub absolute: usize,
    /// Snapped crosshair position.
    pub pixel_x: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartProjector {
    pub plot_left: f64,
    pub plot_width: f64,
    series_len: usize,
    zoom: Option<ZoomWindow>,
}

impl ChartProjector {
    pub fn new(plot_left: f64, plot_width: f64, series_len: usize) -> Self {
        Self {
            plot_left,
            plot_width,
            series_len,
            zoom: None,
        }
    }

    pub fn zoom_window(&self) -> Option<ZoomWindow> {
        self.zoom
    }

    pub fn visible_len(&self) -> usize {
        self.zoom.map(|z| z.len()).unwrap_or(self.series_len)
    }

    fn offset(&self) -> usize {
        self.zoom.map(|z| z.min).unwrap_or(0)
    }

    pub fn to_absolute(&self, relative: usize) -> usize {
        relative + self.offset()
    }

    pub fn pixel_to_index(&self, pixel_x: f64) -> usize {
        pixel_to_index(pixel_x, self.plot_left, self.plot_width, self.visible_len())
    }

    pub fn index_to_pixel(&self, relative: usize) -> f64 {
        index_to_pixel(relative, self.plot_left, self.plot_width, self.visible_len())
    }

    /// Pixel of an absolute index, or `None` when it is outside the window.
    pub fn absolute_to_pixel(&self, absolute: usize) -> Option<f64> {
        let offset = self.offset();
        if absolute < offset || absolute - offset >= self.visible_len() {
            return None;
        }
        Some(self.index_to_pixel(absolute - offset))
    }

    pub fn hover(&self, pixel_x: f64) -> Option<Hover> {
        if self.series_len == 0 {
            return None;
        }
        let relative = self.pixel_to_index(pixel_x);
        Some(Hover {
            relative,
            absolute: self.to_absolute(relative),
            pixel_x: self.index_to_pixel(relative),
        })
    }

    /// Show `[min, max]`, clamped to the series. An empty or inverted range resets.
    pub fn set_zoom(&mut self, min: usize, max: usize) {
        if self.series_len == 0 || min >= max {
            self.zoom = None;
            return;
        }
        let last = self.series_len - 1;
        let max = max.min(last);
        let min = min.min(max);
        self.zoom = if min == 0 && max == last {
            None
        } else {
            Some(ZoomWindow { min, max })
        };
    }

    /// Scale the visible span by `factor` (< 1 zooms in) around absolute index `center`.
    pub fn zoom(&mut self, center: usize, factor: f64) {
        if self.series_len < 2 || !(factor > 0.0) {
            return;
        }
        let span = ((self.visible_len() as f64 * factor).round() as usize).clamp(2, self.series_len);
        let half = span / 2;
        let last = self.series_len - 1;
        let min = center.min(last).saturating_sub(half).min(self.series_len - span);
        self.set_zoom(min, min + span - 1);
    }

    /// Shift the window by `delta` indices, stopping at either end.
    pub fn pan(&mut self, delta: isize) {
        let Some(window) = self.zoom else {
            return;
        };
        let span = window.len();
        let max_min = self.series_len - span;
        let min = (window.min as isize).saturating_add(delta).clamp(0, max_min as isize) as usize;
        self.zoom = Some(ZoomWindow {
            min,
            max: min + span - 1,
        });
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = None;
    }

    /// Place a tooltip of `width` next to the crosshair without leaving the plot.
    pub fn tooltip_position(&self, crosshair_x: f64, width: f64, gap: f64) -> (TooltipSide, f64) {
        let right_edge = self.plot_left + self.plot_width;
        if crosshair_x + gap + width <= right_edge {
            (TooltipSide::Right, crosshair_x + gap)
        } else {
            (TooltipSide::Left, (crosshair_x - gap - width).max(self.plot_left))
        }
    }
}
