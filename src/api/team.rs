use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::worker::RangeQuery;
use crate::engine::anomaly::Anomaly;
use crate::engine::calendar::parse_date_key;
use crate::engine::{Engine, EngineError};
use crate::model::TeamId;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnomalyQuery {
    /// Day to evaluate, YYYY-MM-DD. Defaults to today in the organization's timezone
    #[param(example = "2025-01-13")]
    pub as_of: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AnomalyResponse {
    #[schema(example = 10)]
    pub team_id: TeamId,
    /// Echo of the requested day, null when today was used
    #[schema(example = "2025-01-13", format = "date", value_type = Option<String>)]
    pub as_of: Option<NaiveDate>,
    /// Most severe first
    pub data: Vec<Anomaly>,
}

/* =========================
Team grade
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}/grade",
    params(
        ("id" = u64, Path, description = "Team id"),
        RangeQuery
    ),
    responses(
        (status = 200, description = "Blended readiness and compliance grade", body = crate::engine::TeamGrade),
        (status = 400, description = "Malformed date or invalid range", body = crate::api::error::ErrorBody),
        (status = 404, description = "Team or organization not found", body = crate::api::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::api::error::ErrorBody)
    ),
    tag = "Teams"
)]
pub async fn grade(
    engine: web::Data<Engine>,
    path: web::Path<TeamId>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, EngineError> {
    let range = engine.date_range(&query.start, &query.end)?;
    let grade = engine.compute_team_grade(path.into_inner(), range).await?;
    Ok(HttpResponse::Ok().json(grade))
}

/* =========================
Readiness anomalies
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}/anomalies",
    params(
        ("id" = u64, Path, description = "Team id"),
        AnomalyQuery
    ),
    responses(
        (status = 200, description = "Members whose readiness fell against their baseline", body = AnomalyResponse),
        (status = 400, description = "Malformed date", body = crate::api::error::ErrorBody),
        (status = 404, description = "Team or organization not found", body = crate::api::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::api::error::ErrorBody)
    ),
    tag = "Teams"
)]
pub async fn anomalies(
    engine: web::Data<Engine>,
    path: web::Path<TeamId>,
    query: web::Query<AnomalyQuery>,
) -> Result<HttpResponse, EngineError> {
    let team_id = path.into_inner();
    let as_of = query.as_of.as_deref().map(parse_date_key).transpose()?;
    let data = engine.detect_anomalies(team_id, as_of).await?;

    Ok(HttpResponse::Ok().json(AnomalyResponse {
        team_id,
        as_of,
        data,
    }))
}
