/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http: 全リクエスト共通 (request id / trace / limit / timeout)
 * - route_gate: role による保護 prefix の判定
 */
pub mod http;
pub mod route_gate;
