use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::{get, patch, post};
use axum::Router;

use super::handlers;
use super::handlers::probes::{healthz, livez};
use super::middlewares::authn;
use super::state::AppState;
use crate::prelude::Result;

pub async fn build_routes() -> Result<Router> {
    let state = AppState::new().await?;
    let app = Router::new()
        .route("/resumes", get(handlers::resumes::list))
        .route("/resumes/sweep", post(handlers::resumes::sweep))
        .route(
            "/resumes/:id",
            get(handlers::resumes::get).delete(handlers::resumes::remove),
        )
        .route("/resumes/:id/link", get(handlers::resumes::signed_link))
        .route("/resumes/:id/status", patch(handlers::resumes::update_status))
        .route("/resumes/:id/expiry", patch(handlers::resumes::update_expiry))
        .layer(from_fn(authn::authenticate))
        .route("/resumes", post(handlers::resumes::upload))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        // above the 5MB ceiling so oversize uploads reach the validator
        // instead of being cut off by the extractor
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(state);

    Ok(app)
}
