//! UI Components
//!
//! Leptos components for the dashboard.

pub mod fps_chart;
pub mod readout_card;
pub mod status;

pub use fps_chart::FpsChart;
pub use readout_card::ReadoutCard;
pub use status::StatusIndicator;
