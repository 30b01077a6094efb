use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::grades::GradeRepository;

pub mod grades;

/// Shared handler state: the grade store injected at startup.
#[derive(Clone)]
pub struct AppState {
    pub grades: Arc<dyn GradeRepository>,
}

impl AppState {
    pub fn new(grades: Arc<dyn GradeRepository>) -> Self {
        Self { grades }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let grade_routes = Router::new()
        .route("/grades", get(grades::list).post(grades::create).put(grades::update))
        .route("/grades/update", patch(grades::patch_value))
        .route("/grades/:id", get(grades::get_one).delete(grades::delete_one))
        .route("/grades/student/:student/:subject", get(grades::student_total))
        .route("/grades/average/:subject/:type", get(grades::average))
        .route("/grades/best/:subject/:type", get(grades::best))
        .route("/grades/filter/:subject/:type", get(grades::filter_by_subject_type))
        .route("/grades/filter-students/:student/:subject", get(grades::filter_by_student_subject));

    Router::new()
        .route("/health", get(health))
        .merge(grade_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
