//! Common utilities shared across the workspace.
//!
//! This crate provides:
//! - Unified error handling
//! - The `{success, data, message, errors}` response envelope
//! - Configuration structures

pub mod config;
pub mod error;
pub mod response;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
pub use response::ApiResponse;
