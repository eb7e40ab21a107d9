//! Request fragments shared by several page aggregates.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A question/answer pair submitted with a product or solution.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FaqInput {
    pub question: String,
    pub answer: String,
    /// Display order; defaults to the position in the submitted array
    pub sequence: Option<i32>,
}
