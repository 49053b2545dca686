//! Server-Sent Events fan-out to connected dashboards

pub mod broadcaster;

pub use broadcaster::EventBroadcaster;
