//! HTTP API: configuration, identity middleware, routing, and
//! request/response mapping.

pub mod app;
pub mod config;
pub mod middleware;
