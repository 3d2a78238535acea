/*
 * Responsibility
 * - ページの URL 構造を定義
 * - 保護 prefix の判定は route_gate middleware が Router の外側で行う
 */
use axum::{
    Router,
    routing::{any, get},
};

use crate::api::pages::handlers::{
    health::health,
    pages::{about, dashboard, home, login, not_found},
};
use crate::state::AppState;

/// Static pages; the not-found target must not be one of these.
pub const PAGE_PATHS: [&str; 4] = ["/", "/health", "/login", "/public/about"];

pub fn routes(not_found_path: &str) -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/login", get(login))
        .route("/public/about", get(about))
        .route("/{section}", get(dashboard).fallback(not_found))
        .route("/{section}/{*rest}", get(dashboard).fallback(not_found))
        .route(not_found_path, any(not_found))
        .fallback(not_found)
}
