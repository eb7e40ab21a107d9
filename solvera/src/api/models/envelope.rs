//! Response envelope used by the public API.
//!
//! Every public response is `{"success": bool, "data": T | null, "error": E | null}`. Errors are
//! wrapped by [`crate::errors::Error`]'s `IntoResponse`; this type covers the success path.

use crate::errors::ErrorBody;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}
