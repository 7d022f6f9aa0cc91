use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::engine::{Engine, EngineError};
use crate::model::WorkerId;
use crate::model::attendance::DailyRecord;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    /// First day of the range, YYYY-MM-DD in the organization's timezone
    #[param(example = "2025-01-06")]
    pub start: String,
    /// Last day of the range, inclusive
    #[param(example = "2025-01-10")]
    pub end: String,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceResponse {
    #[schema(example = 1)]
    pub worker_id: WorkerId,
    #[schema(example = "2025-01-06", format = "date", value_type = String)]
    pub start: NaiveDate,
    #[schema(example = "2025-01-10", format = "date", value_type = String)]
    pub end: NaiveDate,
    pub records: Vec<DailyRecord>,
}

/* =========================
Reconstructed attendance
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/workers/{id}/attendance",
    params(
        ("id" = u64, Path, description = "Worker id"),
        RangeQuery
    ),
    responses(
        (status = 200, description = "One record per decidable work day", body = AttendanceResponse),
        (status = 400, description = "Malformed date or invalid range", body = crate::api::error::ErrorBody),
        (status = 404, description = "Worker, team or organization not found", body = crate::api::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::api::error::ErrorBody)
    ),
    tag = "Workers"
)]
pub async fn attendance(
    engine: web::Data<Engine>,
    path: web::Path<WorkerId>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, EngineError> {
    let worker_id = path.into_inner();
    let range = engine.date_range(&query.start, &query.end)?;
    let records = engine.reconstruct_attendance(worker_id, range).await?;

    Ok(HttpResponse::Ok().json(AttendanceResponse {
        worker_id,
        start: range.start(),
        end: range.end(),
        records,
    }))
}

/* =========================
Performance score
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/workers/{id}/performance",
    params(
        ("id" = u64, Path, description = "Worker id"),
        RangeQuery
    ),
    responses(
        (status = 200, description = "Score and grade over the range", body = crate::engine::PerformanceReport),
        (status = 400, description = "Malformed date or invalid range", body = crate::api::error::ErrorBody),
        (status = 404, description = "Worker, team or organization not found", body = crate::api::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::api::error::ErrorBody)
    ),
    tag = "Workers"
)]
pub async fn performance(
    engine: web::Data<Engine>,
    path: web::Path<WorkerId>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, EngineError> {
    let range = engine.date_range(&query.start, &query.end)?;
    let report = engine.compute_performance(path.into_inner(), range).await?;
    Ok(HttpResponse::Ok().json(report))
}

/* =========================
Streaks
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/workers/{id}/streak",
    params(("id" = u64, Path, description = "Worker id")),
    responses(
        (status = 200, description = "Stored streak, zeroed when broken", body = crate::engine::streak::StreakSummary),
        (status = 404, description = "Worker, team or organization not found", body = crate::api::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::api::error::ErrorBody)
    ),
    tag = "Workers"
)]
pub async fn streak(
    engine: web::Data<Engine>,
    path: web::Path<WorkerId>,
) -> Result<HttpResponse, EngineError> {
    let summary = engine.derive_streak(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/v1/workers/{id}/streak/history",
    params(
        ("id" = u64, Path, description = "Worker id"),
        RangeQuery
    ),
    responses(
        (status = 200, description = "Streaks recomputed from check-ins in the range", body = crate::engine::streak::StreakSummary),
        (status = 400, description = "Malformed date or invalid range", body = crate::api::error::ErrorBody),
        (status = 404, description = "Worker, team or organization not found", body = crate::api::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::api::error::ErrorBody)
    ),
    tag = "Workers"
)]
pub async fn streak_history(
    engine: web::Data<Engine>,
    path: web::Path<WorkerId>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, EngineError> {
    let range = engine.date_range(&query.start, &query.end)?;
    let summary = engine.streak_history(path.into_inner(), range).await?;
    Ok(HttpResponse::Ok().json(summary))
}

