//! Derived rating aggregate types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted rating aggregate for a product. Append-only: a recompute
/// appends a new row, never mutates an old one; the most recent by
/// `created_at` is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSnapshot {
    pub product_id: String,
    /// Rounded to 2 decimal places; 0.0 when the product has no reviews.
    pub average_rating: f64,
    pub review_count: usize,
    pub created_at: DateTime<Utc>,
}

impl RatingSnapshot {
    /// Builds a snapshot from the full current rating set of a product.
    pub fn compute(product_id: impl Into<String>, ratings: &[u8]) -> Self {
        let review_count = ratings.len();
        let average_rating = if review_count > 0 {
            round2(ratings.iter().map(|&r| r as f64).sum::<f64>() / review_count as f64)
        } else {
            0.0
        };

        Self {
            product_id: product_id.into(),
            average_rating,
            review_count,
            created_at: Utc::now(),
        }
    }
}

/// Rounds to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
