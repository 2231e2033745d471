//! Core types, schemas, and validation for the review pipeline.

pub mod error;
pub mod events;
pub mod job;
pub mod limits;
pub mod rating;

pub use error::{Error, Result};
pub use events::*;
pub use job::*;
pub use rating::*;
