//! API route handlers

pub mod error;
pub mod reports;
pub mod system;

pub use error::{ApiError, AppError};
