//! Request bookkeeping shared by every route.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use super::AppState;
use crate::db::LookupLog;

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Record the site visit and hand handlers a [`LookupLog`] bound to it.
pub async fn record_visit(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let url = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let user_agent = header_text(request.headers(), header::USER_AGENT);
    let referer = header_text(request.headers(), header::REFERER);

    let log = LookupLog::visit(state.db.as_ref(), &url, &user_agent, &referer);
    request.extensions_mut().insert(log);

    next.run(request).await
}
