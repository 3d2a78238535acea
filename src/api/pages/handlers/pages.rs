/*
 * Responsibility
 * - 公開ページ (/, /login, /public/about)
 * - role ごとの dashboard (gate が Admit したリクエストのみ)
 * - not-found (gate が Deny したリクエストの書き換え先、未定義 path の fallback)
 */
use axum::response::Html;

use crate::api::pages::extractors::Admitted;
use crate::error::AppError;
use crate::services::gate::Role;

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body>{body}</body></html>"
    ))
}

pub async fn home() -> Html<String> {
    layout(
        "Dashboard",
        "<h1>Dashboard</h1><p><a href=\"/login\">Sign in</a> to continue.</p>",
    )
}

pub async fn login() -> Html<String> {
    layout(
        "Sign in",
        "<h1>Sign in</h1>\
         <form method=\"post\" action=\"/auth/login\">\
         <input name=\"email\" type=\"email\"><input name=\"password\" type=\"password\">\
         <button type=\"submit\">Sign in</button></form>",
    )
}

pub async fn about() -> Html<String> {
    layout("About", "<h1>About</h1>")
}

/// `/{section}` and `/{section}/{*rest}` under the caller's own prefix.
pub async fn dashboard(Admitted(admission): Admitted) -> Html<String> {
    let heading = match admission.role {
        Role::User => "My bookings",
        Role::Admin => "Administration",
        Role::Manager => "Support tickets",
    };

    layout(
        heading,
        &format!(
            "<h1>{heading}</h1><p>Signed in as {}. Section {}.</p>",
            admission.role, admission.prefix
        ),
    )
}

pub async fn not_found() -> AppError {
    AppError::not_found("page")
}
