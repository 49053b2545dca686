//! HTTP API handlers
//!
//! Each module pairs its handlers with a typed error that knows its HTTP
//! mapping. All responses use the `{success, data?, count?, message?}`
//! envelope.

pub mod callers;
pub mod health;
pub mod leads;
pub mod sse;
