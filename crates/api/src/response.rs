//! Shared response body types for API handlers.

use serde::{Deserialize, Serialize};

/// `{ "success": true }` acknowledgment returned by deletes and unshare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub const OK: SuccessResponse = SuccessResponse { success: true };
}
