//! leadline-router library - lead routing service
//!
//! HTTP surface, SSE fan-out and the assignment engine over a shared
//! SQLite pool.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod assignment;
pub mod config;
pub mod db;
pub mod sse;

use assignment::AssignmentEngine;
use db::{CallerRegistry, LeadStore};
use sse::EventBroadcaster;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Caller registry (admin surface + engine reads/reservations)
    pub registry: CallerRegistry,
    /// Lead store (listing, status transitions, deletes)
    pub leads: LeadStore,
    /// The assignment decision engine
    pub engine: AssignmentEngine,
    /// Live-update channel to connected dashboards
    pub events: EventBroadcaster,
}

impl AppState {
    /// Create application state over an initialized database pool
    pub fn new(pool: SqlitePool) -> Self {
        let registry = CallerRegistry::new(pool.clone());
        let leads = LeadStore::new(pool);
        let engine = AssignmentEngine::new(registry.clone(), leads.clone());
        let events = EventBroadcaster::new(100);
        Self { registry, leads, engine, events }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, patch, post, put};

    Router::new()
        // Health probes (GET / kept for platform health checks)
        .route("/", get(api::health::health_check))
        .route("/health", get(api::health::health_check))
        // Admin surface
        .route("/api/callers", get(api::callers::list_callers))
        .route("/api/callers", post(api::callers::create_caller))
        .route("/api/callers/:id", put(api::callers::update_caller))
        .route("/api/callers/:id", delete(api::callers::delete_caller))
        // Lead ingestion and status surface
        .route("/api/leads", post(api::leads::ingest_lead))
        .route("/api/leads", get(api::leads::list_leads))
        .route("/api/leads/active", get(api::leads::list_active_leads))
        .route("/api/leads/:id/status", patch(api::leads::update_lead_status))
        .route("/api/leads/:id", delete(api::leads::delete_lead))
        // Live updates
        .route("/events", get(api::sse::event_stream))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
