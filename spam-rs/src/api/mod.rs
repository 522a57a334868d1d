//! REST API module for spam-rs
//!
//! Exposes classification and normalization over HTTP

pub mod handlers;
pub mod server;

pub use server::ApiServer;
