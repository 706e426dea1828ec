use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde_json::{Value, json};

use crate::SeatifyError;
use crate::recommendation::{SeatRecommendation, SeatRecommendationQuery, SeatRecommendationService};

/// Error wrapper that renders as `{"detail": ...}` with the matching status
#[derive(Debug)]
pub struct ApiError(pub SeatifyError);

impl From<SeatifyError> for ApiError {
    fn from(err: SeatifyError) -> Self {
        Self(err)
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SeatifyError::Validation { .. } | SeatifyError::LocationNotFound { .. } => {
                StatusCode::BAD_REQUEST
            }
            SeatifyError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            SeatifyError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Rejected request: {}", self.0);
        }
        (status, Json(json!({ "detail": self.0.user_message() }))).into_response()
    }
}

pub fn router(service: Arc<SeatRecommendationService>) -> Router {
    Router::new()
        .route("/seat_recommendation", get(seat_recommendation))
        .route("/health", get(health))
        .with_state(service)
}

async fn seat_recommendation(
    State(service): State<Arc<SeatRecommendationService>>,
    Query(query): Query<SeatRecommendationQuery>,
) -> Result<Json<SeatRecommendation>, ApiError> {
    let recommendation = service.recommend(&query).await?;
    Ok(Json(recommendation))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
