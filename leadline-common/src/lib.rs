//! # Leadline Common Library
//!
//! Shared code for the Leadline lead-routing service including:
//! - Data models (Caller, Lead, LeadStatus)
//! - Dashboard event types (LeadEvent enum)
//! - API response envelope types
//! - Database initialization and schema
//! - Operating-day utilities

pub mod api;
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use models::{Caller, Lead, LeadStatus};
