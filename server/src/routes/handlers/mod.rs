pub mod emails;
pub mod stats;
pub mod status;

use crate::error::{AppError, AppResult};

/// Validate an optional `max_results`, falling back to `default`.
pub(super) fn positive_limit(value: Option<i64>, default: u32) -> AppResult<u32> {
    match value {
        None => Ok(default),
        Some(n) if n > 0 => Ok(u32::try_from(n).unwrap_or(u32::MAX)),
        Some(n) => Err(AppError::BadRequest(format!(
            "max_results must be positive, got {}",
            n
        ))),
    }
}
