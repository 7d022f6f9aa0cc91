use actix_web::{HttpResponse, web};

use crate::engine::EngineError;
use crate::engine::readiness;
use crate::model::checkin::ReadinessInputs;

/// Scores one set of check-in answers without storing anything.
#[utoipa::path(
    post,
    path = "/api/v1/readiness/evaluate",
    request_body(
        content = ReadinessInputs,
        description = "Self-reported answers, each on a 1 to 10 scale",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Readiness score and status", body = crate::engine::readiness::Readiness),
        (status = 400, description = "Answer outside the scale", body = crate::api::error::ErrorBody)
    ),
    tag = "Readiness"
)]
pub async fn evaluate(payload: web::Json<ReadinessInputs>) -> Result<HttpResponse, EngineError> {
    let readiness = readiness::evaluate(&payload)?;
    Ok(HttpResponse::Ok().json(readiness))
}
