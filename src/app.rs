/*
 * Responsibility
 * - Config読み込み → tracing 初期化 → Gate 生成 → Router 組み立て
 * - Middleware の適用 (route gate は Router の外側、その外に HTTP 共通層)
 * - axum::serve() で起動
 */
use std::sync::Arc;

use anyhow::{Result, bail};
use axum::Router;
use tracing_subscriber::EnvFilter;

use crate::{
    api,
    config::{Config, HttpLimits},
    middleware,
    services::gate::{GateConfig, RouteGate},
    state::AppState,
};

pub async fn run() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);

    tracing::info!(
        addr = %config.addr,
        env = ?config.app_env,
        protected = ?config.gate.protected_prefixes,
        not_found = %config.gate.not_found_path,
        "starting role gate"
    );

    let app = build_app(config.gate, config.http)?;

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!config.app_env.is_production())
        .init();
}

pub fn build_app(gate_config: GateConfig, limits: HttpLimits) -> Result<Router> {
    if api::pages::PAGE_PATHS.contains(&gate_config.not_found_path.as_str()) {
        bail!(
            "not-found path {} collides with an existing page",
            gate_config.not_found_path
        );
    }

    let gate = RouteGate::new(gate_config)?;
    let state = AppState::new(Arc::new(gate));

    let pages = api::pages::routes(state.gate.not_found_path()).with_state(state.clone());
    let gated = middleware::route_gate::apply(pages, state);

    Ok(middleware::http::apply(gated, limits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use tower::ServiceExt;

    fn app() -> Router {
        build_app(GateConfig::default(), HttpLimits::default()).unwrap()
    }

    fn token_for(role: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u-1","roles":"{role}"}}"#));
        format!("{header}.{payload}.c2lnbmF0dXJl")
    }

    async fn get(path: &str, cookie: Option<&str>) -> Response {
        let mut req = Request::builder().uri(path);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        app()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn not_found_body() -> String {
        body_string(get("/404", None).await).await
    }

    #[tokio::test]
    async fn admin_reaches_admin_settings() {
        let cookie = format!("access_token={}", token_for("ADMIN"));
        let res = get("/admin/settings", Some(&cookie)).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = body_string(res).await;
        assert!(body.contains("Administration"));
        assert!(body.contains("Signed in as ADMIN"));
    }

    #[tokio::test]
    async fn user_is_rewritten_to_not_found_on_admin_settings() {
        let cookie = format!("access_token={}", token_for("USER"));
        let res = get("/admin/settings", Some(&cookie)).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().get(header::LOCATION).is_none());
        assert_eq!(body_string(res).await, not_found_body().await);
    }

    #[tokio::test]
    async fn missing_cookie_is_rewritten_to_not_found() {
        let res = get("/manager/reports", None).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn public_page_passes_through() {
        let res = get("/public/about", None).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = get("/public/about", Some("access_token=garbage")).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_credential_is_rewritten_to_not_found() {
        let res = get("/user/profile", Some("access_token=aGVhZGVy.%%%.c2ln")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn denial_looks_like_unknown_page() {
        let denied = get("/admin", None).await;
        let unknown = get("/nothing/here", None).await;

        assert_eq!(denied.status(), unknown.status());
        assert_eq!(body_string(denied).await, body_string(unknown).await);
    }

    #[tokio::test]
    async fn denied_post_is_not_found_not_method_not_allowed() {
        let req = Request::builder()
            .method("POST")
            .uri("/admin/settings")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unprotected_section_without_admission_is_not_found() {
        let cookie = format!("access_token={}", token_for("ADMIN"));
        let res = get("/reports", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn response_carries_request_id() {
        let res = get("/health", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(
            res.headers()
                .contains_key(middleware::http::REQUEST_ID_HEADER)
        );
    }

    #[tokio::test]
    async fn custom_cookie_name_is_used() {
        let config = GateConfig {
            cookie_name: "session".to_string(),
            ..GateConfig::default()
        };
        let app = build_app(config, HttpLimits::default()).unwrap();

        let req = Request::builder()
            .uri("/manager")
            .header(header::COOKIE, format!("session={}", token_for("MANAGER")))
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn not_found_path_with_route_syntax_is_a_startup_error() {
        for path in ["/{x}", "/not found"] {
            let config = GateConfig {
                not_found_path: path.to_string(),
                ..GateConfig::default()
            };
            assert!(build_app(config, HttpLimits::default()).is_err(), "path {path}");
        }
    }

    #[tokio::test]
    async fn denial_with_custom_not_found_path_is_404() {
        let config = GateConfig {
            not_found_path: "/errors/missing".to_string(),
            ..GateConfig::default()
        };
        let app = build_app(config, HttpLimits::default()).unwrap();

        let req = Request::builder()
            .uri("/admin/settings")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn not_found_path_cannot_shadow_a_page() {
        let config = GateConfig {
            not_found_path: "/login".to_string(),
            ..GateConfig::default()
        };
        assert!(build_app(config, HttpLimits::default()).is_err());
    }
}
