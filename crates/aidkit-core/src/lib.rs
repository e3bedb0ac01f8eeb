//! Core types and trait definitions for the aidkit guide client.
//!
//! This crate is deliberately free of database and provider dependencies.
//! Backends implement the traits in [`store`] and [`federated`]; the services
//! in `aidkit-sync` are generic over them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod credential;
pub mod error;
pub mod federated;
pub mod guide;
pub mod profile;
pub mod session;
pub mod store;

pub use error::{Error, Result};
