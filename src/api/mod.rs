//! API module
//!
//! HTTP API endpoints, response envelope and middleware.

pub mod envelope;
pub mod middleware;
pub mod routes;
mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use envelope::Envelope;
pub use routes::create_router;
pub use state::{AppState, PaymentSettings};

/// Build the full application router with its middleware stack
pub fn build_router(state: AppState) -> Router {
    // Note: layers run in reverse order of addition (last added = first executed)
    // Order: cors -> request id -> trace -> logging -> handler
    create_router(state)
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
