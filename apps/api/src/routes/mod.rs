pub mod health;
pub mod resume;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/generate_resume",
            post(resume::handle_generate_resume)
                .layer(DefaultBodyLimit::max(resume::MAX_BODY_BYTES)),
        )
        .with_state(state)
}
