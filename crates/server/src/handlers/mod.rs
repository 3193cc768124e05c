//! HTTP request handlers.

pub mod charts;
pub mod downloads;
pub mod health;

pub use charts::*;
pub use downloads::*;
pub use health::*;

use crate::error::{ApiError, ApiResult};
use chartroom_core::TenantScope;

/// Parse the `{repo}` path segment.
pub(crate) fn tenant(repo: &str) -> ApiResult<TenantScope> {
    TenantScope::parse(repo).map_err(ApiError::from)
}
