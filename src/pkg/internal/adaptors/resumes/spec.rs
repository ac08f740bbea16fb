use std::str::FromStr;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use standard_error::{Interpolate, StandardError, Status};
use uuid::Uuid;

use crate::pkg::internal::storage::BackendKind;

/// Flat classification, not an ordered pipeline: any status may move to any
/// other, including back to `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "resume_status", rename_all = "snake_case")]
pub enum ResumeStatus {
    New,
    Reviewed,
    Shortlisted,
    InterviewScheduled,
    Hired,
    Rejected,
    OnHold,
}

impl FromStr for ResumeStatus {
    type Err = StandardError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "new" => Ok(ResumeStatus::New),
            "reviewed" => Ok(ResumeStatus::Reviewed),
            "shortlisted" => Ok(ResumeStatus::Shortlisted),
            "interview_scheduled" => Ok(ResumeStatus::InterviewScheduled),
            "hired" => Ok(ResumeStatus::Hired),
            "rejected" => Ok(ResumeStatus::Rejected),
            "on_hold" => Ok(ResumeStatus::OnHold),
            other => Err(StandardError::new("ERR-RESUME-STATUS")
                .code(StatusCode::BAD_REQUEST)
                .interpolate_err(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub contact_number: String,
    pub contact_country_code: String,
    pub role_interest: String,
    pub storage_backend: BackendKind,
    pub storage_key: String,
    pub public_reference: String,
    pub status: ResumeStatus,
    pub expiry_date: DateTime<Utc>,
    pub is_expired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_value_parses() {
        for (text, status) in [
            ("new", ResumeStatus::New),
            ("reviewed", ResumeStatus::Reviewed),
            ("shortlisted", ResumeStatus::Shortlisted),
            ("interview_scheduled", ResumeStatus::InterviewScheduled),
            ("hired", ResumeStatus::Hired),
            ("rejected", ResumeStatus::Rejected),
            ("on_hold", ResumeStatus::OnHold),
        ] {
            assert_eq!(text.parse::<ResumeStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_a_client_error() {
        let err = "archived".parse::<ResumeStatus>().unwrap_err();
        assert_eq!(err.err_code, "ERR-RESUME-STATUS");
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
    }
}
