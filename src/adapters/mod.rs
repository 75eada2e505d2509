//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! infrastructure and exposes the use cases over HTTP. Each sub-module
//! groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `api`: axum HTTP endpoints
//! - `market`: Wall-clock market hours
//! - `metrics`: Prometheus metrics export and health probes
//! - `persistence`: In-memory and file-backed record store

pub mod api;
pub mod market;
pub mod metrics;
pub mod persistence;
