//! HTTP API Adapter
//!
//! Exposes the reward use cases over axum 0.7.
//!
//! Sub-modules:
//! - `handlers`: Endpoint handlers
//! - `routes`: Router assembly and server loop
//! - `state`: Shared handler state
//! - `types`: Request bodies and the outcome response wrapper

pub mod handlers;
pub mod routes;
pub mod state;
pub mod types;

pub use routes::{router, serve};
pub use state::ApiState;
