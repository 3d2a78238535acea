use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::gate::Admission;

/// Handler で、gate が許可した `Admission` を受け取るための extractor
/// route_gate middleware が Admit 時に extensions に insert している前提
/// 見つからない場合は 404 (保護されていない path では存在を明かさない)
pub struct Admitted(pub Admission);

impl<S> FromRequestParts<S> for Admitted
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Admission>()
            .cloned()
            .map(Admitted)
            .ok_or(AppError::not_found("page"))
    }
}
