//! Review entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product review as persisted by the CRUD layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub product_id: String,
    /// 1-5 inclusive.
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        id: impl Into<String>,
        product_id: impl Into<String>,
        rating: u8,
        content: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.into(),
            rating,
            content,
            created_at: Utc::now(),
        }
    }
}
