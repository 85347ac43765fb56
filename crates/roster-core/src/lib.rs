//! Core types and trait definitions for roster.
//!
//! This crate is free of HTTP and database dependencies. The feed, store and
//! server crates all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod error;
pub mod event;
pub mod period;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
