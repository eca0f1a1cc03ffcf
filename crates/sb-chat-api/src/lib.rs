//! Storebot chat API: library crate for the HTTP chat transport.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `sb-e2e-tests`) can build the router around their own assistant.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod sweeper;
