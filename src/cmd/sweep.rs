use std::sync::Arc;

use crate::{
    conf::settings,
    pkg::{internal::adaptors::resumes::mutators::ResumeMutator, server::state::GetTxn},
    prelude::Result,
};
use sqlx::postgres::PgPoolOptions;
use standard_error::{Interpolate, StandardError};

/// One-shot expiry sweep, meant to be run from cron. The same operation is
/// exposed on-demand as `POST /resumes/sweep`.
pub async fn apply() -> Result<()> {
    let pool = Arc::new(
        PgPoolOptions::new()
            .connect(&settings.database_url)
            .await
            .map_err(|e| StandardError::new("ERR-DB-000").interpolate_err(e.to_string()))?,
    );

    let mut tx = pool.begin_txn().await?;
    let count = ResumeMutator::new(&mut tx).mark_expired().await?;
    tx.commit().await?;

    tracing::info!(count, "expiry sweep complete");
    println!("{} resumes marked expired", count);
    Ok(())
}
