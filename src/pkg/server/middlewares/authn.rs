use std::sync::Arc;

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use standard_error::{StandardError, Status};

use crate::prelude::Result;

/// The authenticated principal forwarded by the upstream gateway. This
/// service does not authenticate anyone itself, it only consumes the
/// identity headers the auth layer in front of it injects.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: String,
    pub role: String,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

pub async fn authenticate(headers: HeaderMap, mut request: Request, next: Next) -> Result<Response> {
    let user_id = header(&headers, "x-auth-user");
    let role = header(&headers, "x-auth-role");
    if user_id.is_empty() {
        tracing::warn!("principal missing, authentication denied");
        return Err(StandardError::new("ERR-AUTH-001").code(StatusCode::UNAUTHORIZED));
    }
    if role != "admin" {
        tracing::warn!(user_id, role, "admin role required");
        return Err(StandardError::new("ERR-AUTH-002").code(StatusCode::FORBIDDEN));
    }
    request.extensions_mut().insert(Arc::new(AdminUser {
        user_id: user_id.to_string(),
        role: role.to_string(),
    }));
    Ok(next.run(request).await)
}
