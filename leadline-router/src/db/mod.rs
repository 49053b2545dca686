//! Database access for the router service
//!
//! The registry and store own all SQL; handlers and the assignment engine
//! never touch the pool directly.

pub mod callers;
pub mod leads;

pub use callers::CallerRegistry;
pub use leads::LeadStore;
