/*
 * Responsibility
 * - Router / middleware に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc で cheap)
 */
use std::sync::Arc;

use crate::services::gate::RouteGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<RouteGate>,
}

impl AppState {
    pub fn new(gate: Arc<RouteGate>) -> Self {
        Self { gate }
    }
}
