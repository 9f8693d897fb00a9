//! MCP tool implementations organized by domain.

pub mod changelog;
pub mod device;
pub mod documentation;
pub mod knowledge;

use rmcp::ErrorData as McpError;

use crate::error::AppError;

/// Rejects blank required text parameters.
pub(crate) fn require(field: &str, value: &str) -> Result<(), McpError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("`{}` must not be empty", field)).into());
    }
    Ok(())
}
