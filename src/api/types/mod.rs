//! Read API types

pub mod error;
pub mod ratings;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use ratings::{IdQuery, ReleaseResponse, TeamResponse};
