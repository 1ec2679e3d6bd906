//! HTTP server
//!
//! Application state, middleware, and the `/api` route table.

pub mod builder;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
