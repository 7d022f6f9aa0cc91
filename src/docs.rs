use crate::api::error::ErrorBody;
use crate::api::team::AnomalyResponse;
use crate::api::worker::AttendanceResponse;
use crate::engine::anomaly::{Anomaly, Severity};
use crate::engine::readiness::Readiness;
use crate::engine::scoring::{AttendanceBreakdown, Grade};
use crate::engine::streak::StreakSummary;
use crate::engine::{PerformanceReport, TeamGrade};
use crate::model::attendance::{AttendanceStatus, DailyRecord, RecordSource};
use crate::model::checkin::{ReadinessInputs, ReadinessStatus};
use crate::model::exclusion::ExclusionReason;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wellcheck Compliance API",
        version = "1.0.0",
        description = r#"
## Compliance & Readiness Engine

Read-only calculations over daily wellbeing check-ins, team schedules, holidays and approved leave.

### 🔹 Key Features
- **Attendance reconstruction**
  - Status for every scheduled work day, with or without a persisted row
- **Performance & grading**
  - Individual scores and letter grades, team grades blending readiness and compliance
- **Streaks**
  - Stored streak validity and history-based recomputation
- **Anomalies**
  - Readiness drops against each worker's own trailing baseline

### 📅 Dates
All dates are organization-local calendar days, `YYYY-MM-DD`. Ranges are inclusive.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::worker::attendance,
        crate::api::worker::performance,
        crate::api::worker::streak,
        crate::api::worker::streak_history,

        crate::api::team::grade,
        crate::api::team::anomalies,

        crate::api::readiness::evaluate
    ),
    components(
        schemas(
            ErrorBody,
            AttendanceResponse,
            DailyRecord,
            AttendanceStatus,
            RecordSource,
            ExclusionReason,
            PerformanceReport,
            AttendanceBreakdown,
            Grade,
            TeamGrade,
            StreakSummary,
            AnomalyResponse,
            Anomaly,
            Severity,
            ReadinessInputs,
            Readiness,
            ReadinessStatus
        )
    ),
    tags(
        (name = "Workers", description = "Per-worker attendance, performance and streak APIs"),
        (name = "Teams", description = "Team grade and anomaly APIs"),
        (name = "Readiness", description = "Check-in scoring APIs"),
    )
)]
pub struct ApiDoc;
