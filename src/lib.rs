pub mod bands;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod event;
pub mod fetch;
pub mod idols;
pub mod logging;
pub mod outlier;
pub mod projector;
pub mod rescale;
pub mod series;
pub mod theme;
pub mod time_axis;
