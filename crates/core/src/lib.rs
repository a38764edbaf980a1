//! Core types and shared functionality for the Stellar Photos relay.
//!
//! This crate provides:
//! - Filesystem image cache and the read-through resolver
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{ImageCache, ImageSource};
pub use config::{AppConfig, ConfigError};
pub use error::{Error, HttpError};
