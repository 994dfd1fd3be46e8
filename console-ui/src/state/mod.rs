//! State Management
//!
//! Dashboard signals and the supervised WebSocket connection feeding them.

pub mod connection;
pub mod dashboard;

pub use connection::init_supervisor;
pub use dashboard::{provide_dashboard_state, DashboardState};
