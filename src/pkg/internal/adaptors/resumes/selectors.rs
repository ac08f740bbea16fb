use sqlx::PgConnection;
use uuid::Uuid;

use crate::{pkg::internal::adaptors::resumes::spec::ResumeRecord, prelude::Result};

const COLUMNS: &str = "id, name, email, contact_number, contact_country_code, role_interest, \
     storage_backend, storage_key, public_reference, status, expiry_date, \
     is_expired, created_at, updated_at";

pub struct ResumeSelector<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> ResumeSelector<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        ResumeSelector { conn }
    }

    pub async fn get_by_id(&mut self, resume_id: Uuid) -> Result<Option<ResumeRecord>> {
        let row = sqlx::query_as::<_, ResumeRecord>(&format!(
            "SELECT {} FROM resumes WHERE id = $1",
            COLUMNS
        ))
        .bind(resume_id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row)
    }

    pub async fn list(&mut self, limit: i64, offset: i64) -> Result<Vec<ResumeRecord>> {
        let rows = sqlx::query_as::<_, ResumeRecord>(&format!(
            "SELECT {} FROM resumes ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows)
    }

    pub async fn count(&mut self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM resumes")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(total)
    }
}
