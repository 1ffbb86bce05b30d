//! API Routes
//!
//! Configures the Axum router with the cache and check-in endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_handler, health_handler, month_handler, set_handler,
    sign_handler, sign_status_handler, week_handler, AppState,
};
use crate::store::KeyValueStore;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET|PUT|DELETE /cache/:alias/:key` - Namespaced cache access
/// - `POST /checkin/:user_id` - Check in for today
/// - `GET /checkin/:user_id` - Today's check-in status
/// - `GET /checkin/:user_id/week` - Monday through today
/// - `GET /checkin/:user_id/month` - 1st of the month through today
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router<S: KeyValueStore>(state: AppState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/cache/:alias/:key",
            get(get_handler::<S>)
                .put(set_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route(
            "/checkin/:user_id",
            post(sign_handler::<S>).get(sign_status_handler::<S>),
        )
        .route("/checkin/:user_id/week", get(week_handler::<S>))
        .route("/checkin/:user_id/month", get(month_handler::<S>))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
