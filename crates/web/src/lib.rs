//! Pur Beurre web service library.
//!
//! Accounts, server-side sessions and favorite substitutes over HTTP. The
//! binary in `main.rs` wires this library to `PostgreSQL` and Sentry; tests
//! build the same router over in-memory stores with [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
