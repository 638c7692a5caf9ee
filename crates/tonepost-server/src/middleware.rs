use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use tonepost_pipeline::QuotaDecision;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Header carrying the upstream entitlement gate's verdict.
///
/// Quota enforcement is not this service's job: the upstream gateway has
/// already checked the caller's free-tier count, subscription, or admin
/// override, and relays the verdict here. An absent or unknown value means
/// allowed — this service trusts upstream either way.
const QUOTA_STATE_HEADER: &str = "x-quota-state";

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware relaying the upstream quota gate's verdict into request
/// extensions as a [`QuotaDecision`].
pub async fn trust_upstream_quota_gate(mut req: Request, next: Next) -> Response {
    let decision = decision_from_header(
        req.headers()
            .get(QUOTA_STATE_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    req.extensions_mut().insert(decision);
    next.run(req).await
}

fn decision_from_header(raw: Option<&str>) -> QuotaDecision {
    match raw {
        Some(value) if value.eq_ignore_ascii_case("exhausted") => QuotaDecision::Exhausted,
        _ => QuotaDecision::Allowed,
    }
}
