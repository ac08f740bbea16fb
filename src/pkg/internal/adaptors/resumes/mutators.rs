use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    pkg::internal::{
        adaptors::resumes::spec::{ResumeRecord, ResumeStatus},
        storage::BackendKind,
    },
    prelude::Result,
};

const RETURNING: &str = "RETURNING id, name, email, contact_number, contact_country_code, \
     role_interest, storage_backend, storage_key, public_reference, status, \
     expiry_date, is_expired, created_at, updated_at";

pub struct CreateResumeData {
    pub name: String,
    pub email: String,
    pub contact_number: String,
    pub contact_country_code: String,
    pub role_interest: String,
    pub storage_backend: BackendKind,
    pub storage_key: String,
    pub public_reference: String,
    pub expiry_date: DateTime<Utc>,
}

pub struct ResumeMutator<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> ResumeMutator<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        ResumeMutator { conn }
    }

    pub async fn create(&mut self, resume: CreateResumeData) -> Result<ResumeRecord> {
        let row = sqlx::query_as::<_, ResumeRecord>(&format!(
            r#"
            INSERT INTO resumes (id, name, email, contact_number, contact_country_code,
                                 role_interest, storage_backend, storage_key,
                                 public_reference, expiry_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            {}
            "#,
            RETURNING
        ))
        .bind(Uuid::new_v4())
        .bind(&resume.name)
        .bind(&resume.email)
        .bind(&resume.contact_number)
        .bind(&resume.contact_country_code)
        .bind(&resume.role_interest)
        .bind(resume.storage_backend)
        .bind(&resume.storage_key)
        .bind(&resume.public_reference)
        .bind(resume.expiry_date)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(row)
    }

    pub async fn update_status(
        &mut self,
        resume_id: Uuid,
        status: ResumeStatus,
    ) -> Result<Option<ResumeRecord>> {
        let row = sqlx::query_as::<_, ResumeRecord>(&format!(
            r#"
            UPDATE resumes
            SET status = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            {}
            "#,
            RETURNING
        ))
        .bind(resume_id)
        .bind(status)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row)
    }

    pub async fn update_expiry(
        &mut self,
        resume_id: Uuid,
        expiry_date: DateTime<Utc>,
        is_expired: bool,
    ) -> Result<Option<ResumeRecord>> {
        let row = sqlx::query_as::<_, ResumeRecord>(&format!(
            r#"
            UPDATE resumes
            SET expiry_date = $2, is_expired = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            {}
            "#,
            RETURNING
        ))
        .bind(resume_id)
        .bind(expiry_date)
        .bind(is_expired)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row)
    }

    /// The expiry sweep. Only ever flips `is_expired` false -> true; the
    /// filter excludes already-flagged rows, so repeated runs report zero.
    pub async fn mark_expired(&mut self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE resumes
            SET is_expired = TRUE, updated_at = CURRENT_TIMESTAMP
            WHERE expiry_date <= NOW() AND is_expired = FALSE
            "#,
        )
        .execute(&mut *self.conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&mut self, resume_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(resume_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }
}
