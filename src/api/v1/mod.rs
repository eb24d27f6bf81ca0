/*
 * Responsibility
 * - v1 public surface (routes() / permissions() re-exports)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{permissions, routes};
