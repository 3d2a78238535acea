//! Role based route gate (cookie credential → RouteGate 判定 → admit / rewrite)
//!
//! - Cookie から credential を取り出し、`RouteGate::evaluate` で判定する
//! - Admit: `Admission` を request extensions に入れる (handler は extractor で受け取る)
//! - Deny: URI を not-found path に書き換えて router に渡す。redirect も 401/403 も返さない
//!
//! Router::layer で掛けた middleware はルーティング後に動くため、URI の書き換えが効かない。
//! `apply` で Router の外側から包むこと。

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::Response,
};
use tower::Layer;

use crate::services::gate::GateDecision;
use crate::state::AppState;

/// Wrap a fully built router with the gate.
///
/// ```ignore
/// let pages = api::pages::routes(state.gate.not_found_path()).with_state(state.clone());
/// let app = middleware::route_gate::apply(pages, state);
/// ```
pub fn apply(router: Router, state: AppState) -> Router {
    let gated = middleware::from_fn_with_state(state, route_gate).layer(router);
    Router::new().fallback_service(gated)
}

async fn route_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let credential = cookie_value(req.headers(), state.gate.cookie_name());

    match state.gate.evaluate(&path, credential) {
        GateDecision::PassThrough => {}
        GateDecision::Admit(admission) => {
            tracing::debug!(path = %path, role = %admission.role, "route gate admitted request");
            req.extensions_mut().insert(admission);
        }
        GateDecision::Deny(denial) => {
            // Denial messages may echo parts of the credential, keep them at debug.
            tracing::warn!(path = %path, kind = denial.kind(), "route gate denied request");
            tracing::debug!(error = %denial, "route gate denial detail");

            *req.uri_mut() = state.gate.not_found_uri().clone();
        }
    }

    next.run(req).await
}

/// First value of cookie `name` across all `Cookie` headers.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
}
