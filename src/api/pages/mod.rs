/*
 * Responsibility
 * - Gate の後ろにあるページ群 (routes() の re-export)
 */
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{PAGE_PATHS, routes};
