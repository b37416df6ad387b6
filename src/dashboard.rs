//! Dashboard view model: which layout to show and what goes in it.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::event::{EventInfo, EventKind};
use crate::fetch::{ArtifactFetcher, ArtifactSource};
use crate::idols::subject_label;
use crate::logging::{log, log_outlier, obj, v_str, Domain, Level};
use crate::outlier::OutlierReport;
use crate::series::PredictionSeries;

pub const NOT_RUNNING: &str = "No event is currently running";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Placeholder,
    TwoTab,
    PerSubject,
}

/// One tab of the standard layout. `series` is `None` when its artifact failed.
#[derive(Debug)]
pub struct BorderTab {
    pub border: u32,
    pub series: Option<PredictionSeries>,
}

#[derive(Debug)]
pub struct BorderGroup {
    pub border: u32,
    pub subjects: BTreeMap<u32, PredictionSeries>,
}

#[derive(Debug)]
pub enum DashboardView {
    NoActiveEvent {
        reason: String,
    },
    Standard {
        event: EventInfo,
        tabs: Vec<BorderTab>,
    },
    PerSubject {
        event: EventInfo,
        groups: Vec<BorderGroup>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesSummary {
    pub subject_id: u32,
    pub label: &'static str,
    pub border: u32,
    pub latest_observed: Option<f64>,
    pub final_prediction: Option<f64>,
    pub outlier: OutlierReport,
}

impl SeriesSummary {
    pub fn of(series: &PredictionSeries) -> Self {
        Self {
            subject_id: series.subject_id,
            label: subject_label(series.subject_id),
            border: series.border,
            latest_observed: series.latest_observed().map(|(_, v)| v),
            final_prediction: series.final_prediction(),
            outlier: series.outlier(),
        }
    }
}

impl DashboardView {
    pub fn layout(&self) -> Layout {
        match self {
            DashboardView::NoActiveEvent { .. } => Layout::Placeholder,
            DashboardView::Standard { .. } => Layout::TwoTab,
            DashboardView::PerSubject { .. } => Layout::PerSubject,
        }
    }

    pub fn event(&self) -> Option<&EventInfo> {
        match self {
            DashboardView::NoActiveEvent { .. } => None,
            DashboardView::Standard { event, .. } | DashboardView::PerSubject { event, .. } => {
                Some(event)
            }
        }
    }

    pub fn tab_labels(&self) -> Vec<String> {
        match self {
            DashboardView::NoActiveEvent { .. } => Vec::new(),
            DashboardView::Standard { tabs, .. } => {
                tabs.iter().map(|t| format!("Rank {}", t.border)).collect()
            }
            DashboardView::PerSubject { groups, .. } => {
                groups.iter().map(|g| format!("Rank {}", g.border)).collect()
            }
        }
    }

    /// Every loaded series, in display order.
    pub fn series(&self) -> Vec<&PredictionSeries> {
        match self {
            DashboardView::NoActiveEvent { .. } => Vec::new(),
            DashboardView::Standard { tabs, .. } => {
                tabs.iter().filter_map(|t| t.series.as_ref()).collect()
            }
            DashboardView::PerSubject { groups, .. } => {
                groups.iter().flat_map(|g| g.subjects.values()).collect()
            }
        }
    }

    pub fn summaries(&self) -> Vec<SeriesSummary> {
        self.series().into_iter().map(SeriesSummary::of).collect()
    }
}

fn placeholder(reason: String) -> DashboardView {
    log(
        Level::Warn,
        Domain::System,
        "no_active_event",
        obj(&[("msg", v_str(&reason))]),
    );
    DashboardView::NoActiveEvent { reason }
}

/// Fetch metadata, pick the layout, then fetch that layout's predictions.
pub async fn load_dashboard<S, Tz>(fetcher: &ArtifactFetcher<S>, now: &DateTime<Tz>) -> DashboardView
where
    S: ArtifactSource + ?Sized,
    Tz: TimeZone,
{
    let event = match fetcher.fetch_event_info().await {
        Ok(event) => event,
        Err(err) => return placeholder(format!("{}: {:#}", NOT_RUNNING, err)),
    };
    let kind = match event.kind() {
        Ok(kind) => kind,
        Err(err) => return placeholder(format!("{}: {:#}", NOT_RUNNING, err)),
    };
    if !event.is_running(now) {
        return placeholder(format!("{}: {} is outside its schedule", NOT_RUNNING, event.name));
    }

    log(
        Level::Info,
        Domain::System,
        "event_loaded",
        obj(&[
            ("event_id", serde_json::json!(event.id)),
            ("name", v_str(&event.name)),
            ("kind", v_str(kind.as_str())),
        ]),
    );

    let set = fetcher.fetch_all(kind, Some(event.duration_days())).await;
    let mut by_border = set.by_border;

    for series in by_border.values().flat_map(|m| m.values()) {
        let report = series.outlier();
        if let Some(direction) = report.direction {
            log_outlier(
                series.subject_id,
                series.border,
                direction.as_str(),
                report.checked_indices,
            );
        }
    }

    match kind {
        EventKind::StandardDuoBorder => {
            let tabs = kind
                .borders()
                .iter()
                .map(|&border| BorderTab {
                    border,
                    series: by_border.get_mut(&border).and_then(|m| m.remove(&0)),
                })
                .collect();
            DashboardView::Standard { event, tabs }
        }
        EventKind::PerSubjectMultiBorder => {
            let groups = kind
                .borders()
                .iter()
                .map(|&border| BorderGroup {
                    border,
                    subjects: by_border.remove(&border).unwrap_or_default(),
                })
                .collect();
            DashboardView::PerSubject { event, groups }
        }
    }
}
