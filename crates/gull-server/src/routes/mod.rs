// Export route modules
pub mod events;

use crate::state::AppState;
use axum::{routing::get, Router};

async fn health() -> &'static str {
    "ok"
}

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(events::routes(state))
}
