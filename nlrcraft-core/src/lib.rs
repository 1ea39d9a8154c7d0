//! Shared primitives for the NLRcraft plant NLR identification pipeline.
//!
//! `nlrcraft-core` provides the foundation the other NLRcraft crates build on:
//!
//! - **Error types**: [`NlrError`] and [`Result`] for structured error handling
//! - **Traits**: [`Scored`] and [`Summarizable`]
//! - **Ids**: [`normalize_id`] for comparing protein ids across files

pub mod error;
pub mod id;
pub mod traits;

pub use error::{NlrError, Result};
pub use id::normalize_id;
pub use traits::*;
