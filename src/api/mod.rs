pub mod admin;
pub mod attendance;
pub mod payroll;
pub mod profile;
pub mod withdrawal;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

use crate::payroll::error::PayrollError;

const RETRY_MESSAGE: &str = "Something went wrong, please try again";

impl ResponseError for PayrollError {
    fn status_code(&self) -> StatusCode {
        match self {
            PayrollError::InvalidAmount
            | PayrollError::InvalidShift(_)
            | PayrollError::InvalidMonth { .. }
            | PayrollError::InvalidProfile(_)
            | PayrollError::ShiftNotUpgradable(_) => StatusCode::BAD_REQUEST,
            PayrollError::DuplicateCheckIn(_) | PayrollError::EmailTaken => StatusCode::CONFLICT,
            PayrollError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PayrollError::ProfileMissing | PayrollError::CheckInNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            PayrollError::RatesLocked => StatusCode::FORBIDDEN,
            PayrollError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            PayrollError::Store(e) => {
                tracing::error!(error = %e, "Store call failed");
                RETRY_MESSAGE.to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
