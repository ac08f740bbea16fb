use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path as AxumPath, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use standard_error::{Interpolate, StandardError, Status};
use uuid::Uuid;

use crate::{
    conf::settings,
    pkg::{
        internal::{
            adaptors::resumes::{
                mutators::{CreateResumeData, ResumeMutator},
                selectors::ResumeSelector,
                spec::{ResumeRecord, ResumeStatus},
            },
            storage::generate_storage_key,
            validate::{validate_submission, FileUpload, RawSubmission},
        },
        server::{
            middlewares::authn::AdminUser,
            state::{AppState, GetTxn},
        },
    },
    prelude::Result,
};

#[derive(Debug, Deserialize)]
struct ContactInput {
    #[serde(default)]
    number: String,
    #[serde(default, alias = "countryCode")]
    country_code: String,
}

fn multipart_err(e: impl ToString) -> StandardError {
    StandardError::new("ERR-MULTIPART-001")
        .code(StatusCode::BAD_REQUEST)
        .interpolate_err(e.to_string())
}

fn parse_id(id: &str) -> Result<Uuid> {
    id.parse::<Uuid>()
        .map_err(|_| StandardError::new("ERR-RESUME-INVALID-ID").code(StatusCode::BAD_REQUEST))
}

fn not_found() -> StandardError {
    StandardError::new("ERR-RESUME-NOT-FOUND").code(StatusCode::NOT_FOUND)
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut raw = RawSubmission::default();
    let mut file: Option<(FileUpload, Bytes)> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        match field.name().unwrap_or("") {
            "name" => raw.name = field.text().await.map_err(multipart_err)?,
            "email" => raw.email = field.text().await.map_err(multipart_err)?,
            "contact" => {
                let text = field.text().await.map_err(multipart_err)?;
                if !text.trim().is_empty() {
                    let contact: ContactInput = serde_json::from_str(&text)?;
                    raw.contact_number = contact.number;
                    raw.contact_country_code = contact.country_code;
                }
            }
            "contact_number" | "contactNumber" => {
                raw.contact_number = field.text().await.map_err(multipart_err)?
            }
            "country_code" | "countryCode" => {
                raw.contact_country_code = field.text().await.map_err(multipart_err)?
            }
            "role_interest" | "roleInterest" => {
                raw.role_interest = field.text().await.map_err(multipart_err)?
            }
            "resume" | "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(|c| c.to_string());
                let data = field.bytes().await.map_err(multipart_err)?;
                file = Some((
                    FileUpload {
                        filename,
                        content_type,
                        size: data.len(),
                    },
                    data,
                ));
            }
            _ => {
                let _ = field.bytes().await.map_err(multipart_err)?;
            }
        }
    }

    // nothing is persisted until both the validation and the storage write
    // have succeeded
    let submission = validate_submission(raw, file.as_ref().map(|(meta, _)| meta))?;
    let (_, data) = file
        .ok_or_else(|| StandardError::new("ERR-VALIDATE-FILE-MISSING").code(StatusCode::BAD_REQUEST))?;

    let key = generate_storage_key(&submission.extension);
    let stored = state
        .storage
        .store(&key, &data, &submission.content_type)
        .await?;

    let mut tx = state.db_pool.begin_txn().await?;
    let record = ResumeMutator::new(&mut tx)
        .create(CreateResumeData {
            name: submission.name,
            email: submission.email,
            contact_number: submission.contact_number,
            contact_country_code: submission.contact_country_code,
            role_interest: submission.role_interest,
            storage_backend: stored.backend,
            storage_key: stored.key,
            public_reference: stored.reference,
            expiry_date: Utc::now() + chrono::Duration::days(settings.resume_retention_days),
        })
        .await?;
    tx.commit().await?;

    tracing::info!(id = %record.id, backend = ?record.storage_backend, "resume stored");
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct ResumePage {
    pub total_resumes: i64,
    pub total_pages: i64,
    pub page: i64,
    pub limit: i64,
    pub resumes: Vec<ResumeRecord>,
}

fn page_bounds(params: &ListParams) -> (i64, i64) {
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    (limit, (page - 1) * limit)
}

fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

pub async fn list(
    State(state): State<AppState>,
    Extension(_user): Extension<Arc<AdminUser>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ResumePage>> {
    let (limit, offset) = page_bounds(&params);
    let mut tx = state.db_pool.begin_txn().await?;
    let mut selector = ResumeSelector::new(&mut tx);
    let total = selector.count().await?;
    let resumes = selector.list(limit, offset).await?;
    Ok(Json(ResumePage {
        total_resumes: total,
        total_pages: total_pages(total, limit),
        page: params.page.max(1),
        limit,
        resumes,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(_user): Extension<Arc<AdminUser>>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ResumeRecord>> {
    let resume_id = parse_id(&id)?;
    let mut tx = state.db_pool.begin_txn().await?;
    let record = ResumeSelector::new(&mut tx)
        .get_by_id(resume_id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(record))
}

/// Returns only the retrieval URL, never the bytes. Remote-backed records
/// get a presigned time-limited link, local ones a static path.
pub async fn signed_link(
    State(state): State<AppState>,
    Extension(_user): Extension<Arc<AdminUser>>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Value>> {
    let resume_id = parse_id(&id)?;
    let mut tx = state.db_pool.begin_txn().await?;
    let record = ResumeSelector::new(&mut tx)
        .get_by_id(resume_id)
        .await?
        .ok_or_else(not_found)?;
    let url = state
        .storage
        .signed_url(record.storage_backend, &record.storage_key)
        .await?;
    Ok(Json(json!({ "url": url })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<AdminUser>>,
    AxumPath(id): AxumPath<String>,
    Json(input): Json<UpdateStatusInput>,
) -> Result<Json<ResumeRecord>> {
    let resume_id = parse_id(&id)?;
    let status: ResumeStatus = input.status.parse()?;
    let mut tx = state.db_pool.begin_txn().await?;
    let record = ResumeMutator::new(&mut tx)
        .update_status(resume_id, status)
        .await?
        .ok_or_else(not_found)?;
    tx.commit().await?;
    tracing::info!(id = %record.id, status = ?status, admin = %user.user_id, "status updated");
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct UpdateExpiryInput {
    pub expiry_date: Option<DateTime<Utc>>,
}

pub async fn update_expiry(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<AdminUser>>,
    AxumPath(id): AxumPath<String>,
    Json(input): Json<UpdateExpiryInput>,
) -> Result<Json<ResumeRecord>> {
    let resume_id = parse_id(&id)?;
    let now = Utc::now();
    if let Some(expiry) = input.expiry_date {
        if expiry <= now {
            return Err(StandardError::new("ERR-RESUME-EXPIRY").code(StatusCode::BAD_REQUEST));
        }
    }
    let mut tx = state.db_pool.begin_txn().await?;
    let current = ResumeSelector::new(&mut tx)
        .get_by_id(resume_id)
        .await?
        .ok_or_else(not_found)?;
    let expiry_date = input.expiry_date.unwrap_or(current.expiry_date);
    let record = ResumeMutator::new(&mut tx)
        .update_expiry(resume_id, expiry_date, expiry_date <= now)
        .await?
        .ok_or_else(not_found)?;
    tx.commit().await?;
    tracing::info!(id = %record.id, expiry = %expiry_date, admin = %user.user_id, "expiry updated");
    Ok(Json(record))
}

pub async fn sweep(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<AdminUser>>,
) -> Result<Json<Value>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let count = ResumeMutator::new(&mut tx).mark_expired().await?;
    tx.commit().await?;
    tracing::info!(count, admin = %user.user_id, "expiry sweep complete");
    Ok(Json(json!({ "expired_count": count })))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<AdminUser>>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Value>> {
    let resume_id = parse_id(&id)?;
    let mut tx = state.db_pool.begin_txn().await?;
    let record = ResumeSelector::new(&mut tx)
        .get_by_id(resume_id)
        .await?
        .ok_or_else(not_found)?;

    // storage cleanup is advisory; removal of the record is the contract
    state
        .storage
        .remove(record.storage_backend, &record.storage_key)
        .await;

    ResumeMutator::new(&mut tx).delete(resume_id).await?;
    tx.commit().await?;
    tracing::info!(id = %resume_id, admin = %user.user_id, "resume deleted");
    Ok(Json(json!({ "id": resume_id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_a_client_error_not_a_lookup() {
        let err = parse_id("not-a-uuid").unwrap_err();
        assert_eq!(err.err_code, "ERR-RESUME-INVALID-ID");
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
        assert!(parse_id("8d7f1a9e-3a2b-4c5d-9e8f-0a1b2c3d4e5f").is_ok());
    }

    #[test]
    fn page_bounds_sanitize_page_and_limit() {
        assert_eq!(page_bounds(&ListParams { page: 1, limit: 10 }), (10, 0));
        assert_eq!(page_bounds(&ListParams { page: 3, limit: 10 }), (10, 20));
        assert_eq!(page_bounds(&ListParams { page: 0, limit: 10 }), (10, 0));
        assert_eq!(page_bounds(&ListParams { page: 1, limit: 500 }), (100, 0));
        assert_eq!(page_bounds(&ListParams { page: 2, limit: 0 }), (1, 1));
    }

    #[test]
    fn zero_records_is_a_well_formed_empty_page() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }
}
