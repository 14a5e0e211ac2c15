//! Access Control Middleware.
//! Runs the IP gate in front of every `/log` route.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::http::response::AccessDenied;
use crate::observability::metrics;
use crate::security::client_ip::{peer_string, X_FORWARDED_FOR};
use crate::security::{AccessDecision, AccessPolicy};

/// State required for access control.
#[derive(Clone)]
pub struct AccessControlState {
    pub policy: Arc<AccessPolicy>,
}

/// Resolved client address attached to admitted requests.
#[derive(Clone, Debug)]
pub struct ClientIp(pub String);

/// All `X-Forwarded-For` lines joined in arrival order.
///
/// Bytes that are not valid UTF-8 are kept as replacement characters so a
/// garbled hop fails closed instead of disappearing.
fn forwarded_chain(headers: &HeaderMap) -> Option<String> {
    let mut values = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .peekable();
    values.peek()?;
    Some(values.collect::<Vec<_>>().join(","))
}

pub async fn access_control_middleware(
    State(state): State<AccessControlState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // 1. Disabled policy: passthrough without resolving anything.
    if !state.policy.is_enabled() {
        return next.run(req).await;
    }

    // 2. Peer address. A missing peer resolves to "" and is denied.
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| peer_string(addr))
        .unwrap_or_default();
    let forwarded = forwarded_chain(req.headers());

    // 3. Decide
    match state.policy.check(&peer, forwarded.as_deref()) {
        AccessDecision::Allowed { client_ip } => {
            metrics::record_access_decision("allowed");
            tracing::debug!(client_ip = %client_ip, peer = %peer, "Access granted");
            req.extensions_mut().insert(ClientIp(client_ip));
            next.run(req).await
        }
        AccessDecision::Denied { client_ip } => {
            metrics::record_access_decision("denied");
            tracing::warn!(
                client_ip = %client_ip,
                peer = %peer,
                path = %req.uri().path(),
                "Access denied"
            );
            AccessDenied::new(&client_ip).into_response()
        }
        AccessDecision::Bypassed => next.run(req).await,
    }
}
