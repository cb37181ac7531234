//! # Phonix Core
//!
//! Core types, traits, and generation logic for Phonix, the phonics activity
//! generator. Connectors implement [`TextGenerator`]; everything between the
//! teacher's request and a validated activity lives here.

pub mod types;
pub mod traits;
pub mod errors;
pub mod extract;
pub mod prompt;
pub mod validation;
pub mod retry;
pub mod client;

// Re-export commonly used types and traits
pub use types::{GeneratedActivity, GenerationRequest, GenerationResult, RegenerationRequest, WordCandidate};
pub use traits::TextGenerator;
pub use errors::{CoreError, GenerationError};
pub use client::ActivityGenerationClient;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::types::*;
    pub use crate::traits::*;
    pub use crate::errors::*;
    pub use crate::client::ActivityGenerationClient;
    pub use crate::prompt::PromptBuilder;
    pub use crate::retry::RetryPolicy;
    pub use async_trait::async_trait;
}
