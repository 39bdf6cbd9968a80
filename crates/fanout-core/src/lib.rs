//! Core types and trait definitions for the Fanout campaign console.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod book;
pub mod campaign;
pub mod config;
pub mod contact;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod phone;
pub mod session;
pub mod store;

pub use error::{Error, Result};
