//! # newswire-core
//!
//! Core types, traits, and abstractions shared by all newswire crates:
//!
//! - Domain models (`Organization`, `Article`, `FeedItem`, job reports)
//! - The workspace-wide error taxonomy
//! - Repository and inference backend traits
//! - In-memory repository implementations for tests
//! - Slug normalization, default constants, logging field schema

pub mod defaults;
pub mod error;
pub mod logging;
pub mod memory;
pub mod models;
pub mod slug;
pub mod traits;

pub use error::{Error, Result};
pub use models::*;
pub use slug::slugify;
pub use traits::*;
