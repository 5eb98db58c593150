pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::bundle::handlers as bundle_handlers;
use crate::export::handlers as export_handlers;
use crate::state::AppState;
use crate::verify::handlers as verify_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Export API
        .route(
            "/api/v1/export/roster/:company_id",
            get(export_handlers::handle_export_roster),
        )
        .route(
            "/api/v1/export/documents/:company_id",
            get(bundle_handlers::handle_export_documents),
        )
        // Verification API
        .route("/api/v1/verify/send", post(verify_handlers::handle_send_code))
        .route(
            "/api/v1/verify/confirm",
            post(verify_handlers::handle_confirm_code),
        )
        .with_state(state)
}
