use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub health: &'static str,
    pub version: &'static str,
}
