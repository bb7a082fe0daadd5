use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::application::LedgerService;

use super::handlers;

/// Build the axum router with all ledger endpoints.
pub fn build_router(service: LedgerService) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route(
            "/batches",
            get(handlers::list_batches).post(handlers::create_batch),
        )
        .route("/batches/{id}/students", get(handlers::list_batch_students))
        .route("/students", post(handlers::create_student))
        .route(
            "/students/{id}/payments",
            get(handlers::list_student_payments),
        )
        .route("/payments", post(handlers::create_payment))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
