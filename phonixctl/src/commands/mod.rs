//! Command implementations

pub mod generate;
pub mod prompt;
pub mod words;
