use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::access::Capabilities;
use crate::error::ApiError;
use crate::server::AppState;
use crate::session::{self, SessionUser};

/// Session middleware: reads the session cookie, verifies it, and injects
/// the `SessionUser` into the request. Rejects with 401 when absent or
/// invalid.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = session::from_headers(request.headers(), &state.config.session)
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn require_dashboard(request: Request, next: Next) -> Result<Response, ApiError> {
    check_capability(&request, |caps| caps.can_view_dashboard)?;
    Ok(next.run(request).await)
}

pub async fn require_remove_logs(request: Request, next: Next) -> Result<Response, ApiError> {
    check_capability(&request, |caps| caps.can_remove_logs)?;
    Ok(next.run(request).await)
}

pub async fn require_reset_stats(request: Request, next: Next) -> Result<Response, ApiError> {
    check_capability(&request, |caps| caps.can_reset_stats)?;
    Ok(next.run(request).await)
}

fn check_capability(
    request: &Request,
    check: impl Fn(&Capabilities) -> bool,
) -> Result<(), ApiError> {
    let user = request
        .extensions()
        .get::<SessionUser>()
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))?;

    if !check(&user.capabilities) {
        return Err(ApiError::forbidden("Forbidden"));
    }
    Ok(())
}
