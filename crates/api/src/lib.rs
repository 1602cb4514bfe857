//! Relay API server library.
//!
//! Exposes the building blocks (config, state, routes, router) so that
//! integration tests and the binary entrypoint share the same wiring.

pub mod config;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
