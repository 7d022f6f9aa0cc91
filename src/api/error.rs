use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::EngineError;

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "worker 42 not found")]
    pub message: String,
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::InvalidRange { .. }
            | EngineError::InvalidDateKey(_)
            | EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::UnknownWorker(_)
            | EngineError::UnknownTeam(_)
            | EngineError::UnknownOrganization(_) => StatusCode::NOT_FOUND,
            EngineError::InvalidTimezone(_) | EngineError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Engine request failed");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(ErrorBody { message })
    }
}
