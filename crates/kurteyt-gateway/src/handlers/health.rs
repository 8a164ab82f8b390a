use crate::model::HealthResponse;
use axum::Json;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        health: "OK",
        version: env!("CARGO_PKG_VERSION"),
    })
}
