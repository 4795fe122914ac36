//! services/api/src/lib.rs
//!
//! The essay scoring HTTP service. The `api` binary wires these modules together.

pub mod adapters;
pub mod client;
pub mod config;
pub mod error;
pub mod web;
