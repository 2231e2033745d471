//! Review mutation event types.
//!
//! Events are immutable facts describing a review mutation, serialized as
//! camelCase JSON on the wire with a `type` tag (`review.created`,
//! `review.updated`, `review.deleted`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::limits::{PRIORITY_CREATED, PRIORITY_DEFAULT};

/// Kind of review mutation. Closed set: adding a kind is a compile-time
/// checked change everywhere the enum is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "review.created")]
    Created,
    #[serde(rename = "review.updated")]
    Updated,
    #[serde(rename = "review.deleted")]
    Deleted,
}

impl EventKind {
    /// Wire tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "review.created",
            Self::Updated => "review.updated",
            Self::Deleted => "review.deleted",
        }
    }

    /// Parses a wire tag, rejecting anything outside the closed set.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "review.created" => Ok(Self::Created),
            "review.updated" => Ok(Self::Updated),
            "review.deleted" => Ok(Self::Deleted),
            other => Err(Error::unknown_kind(other)),
        }
    }

    /// Queue priority for events of this kind.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Created => PRIORITY_CREATED,
            Self::Updated | Self::Deleted => PRIORITY_DEFAULT,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A review mutation event.
///
/// Invariants: `Deleted` carries the rating being removed, not the
/// post-deletion state; `Updated` carries both `rating` (new) and
/// `old_rating` (previous). The rating fields exist for audit/logging only;
/// the aggregator never applies them as deltas.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Product whose aggregate this event affects.
    #[validate(length(min = 1))]
    pub product_id: String,
    /// Review affected by the mutation.
    #[validate(length(min = 1))]
    pub review_id: String,
    /// New rating (absent only for malformed producers; treated as zero
    /// contribution downstream).
    #[validate(range(min = 1, max = 5))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Previous rating, present for `Updated` events.
    #[validate(range(min = 1, max = 5))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_rating: Option<u8>,
    /// Producer clock at the time the event was raised.
    pub timestamp: DateTime<Utc>,
}

impl ReviewEvent {
    /// Creates a `review.created` event.
    pub fn created(product_id: impl Into<String>, review_id: impl Into<String>, rating: u8) -> Self {
        Self {
            kind: EventKind::Created,
            product_id: product_id.into(),
            review_id: review_id.into(),
            rating: Some(rating),
            old_rating: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a `review.updated` event carrying both ratings.
    pub fn updated(
        product_id: impl Into<String>,
        review_id: impl Into<String>,
        rating: u8,
        old_rating: u8,
    ) -> Self {
        Self {
            kind: EventKind::Updated,
            product_id: product_id.into(),
            review_id: review_id.into(),
            rating: Some(rating),
            old_rating: Some(old_rating),
            timestamp: Utc::now(),
        }
    }

    /// Creates a `review.deleted` event carrying the removed rating.
    pub fn deleted(product_id: impl Into<String>, review_id: impl Into<String>, rating: u8) -> Self {
        Self {
            kind: EventKind::Deleted,
            product_id: product_id.into(),
            review_id: review_id.into(),
            rating: Some(rating),
            old_rating: None,
            timestamp: Utc::now(),
        }
    }

    /// Serializes this event into a queue payload.
    pub fn to_payload(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decodes a queue payload back into a typed event.
    ///
    /// The `type` tag is checked against the closed kind set before full
    /// deserialization so an unknown tag surfaces as `UnknownEventKind`,
    /// distinct from a structurally malformed payload.
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self> {
        let tag = payload
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::validation("event payload missing `type` tag"))?;
        EventKind::parse(tag)?;
        Ok(serde_json::from_value(payload.clone())?)
    }
}
