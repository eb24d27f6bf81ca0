/*
 * Responsibility
 * - Process-level services shared via AppState (auth guard, cache client)
 */
pub mod auth;
pub mod cache;
