use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::OrganizationId;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Organization {
    pub id: OrganizationId,
    /// IANA identifier; every calendar decision for the organization's
    /// workers resolves through this zone.
    #[schema(example = "Asia/Manila")]
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Holiday {
    pub organization_id: OrganizationId,
    #[schema(example = "2025-01-09", value_type = String, format = "date")]
    #[sqlx(rename = "holiday_date")]
    pub date: NaiveDate,
    pub name: Option<String>,
}
