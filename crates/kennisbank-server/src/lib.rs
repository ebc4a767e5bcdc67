//! Server wiring: application state, identity extraction, and the HTTP
//! routes.

pub mod identity;
pub mod routes;
pub mod state;
