//! Engine error type.
//!
//! Most engine paths are forgiving (unknown tokens, zero allocations, missing
//! prices). Only the cases below are refused.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("insufficient scenarios: need at least 2 to compare, got {found}")]
    InsufficientScenarios { found: usize },

    #[error("unknown scenario id: {0}")]
    UnknownScenario(String),

    #[error("experiment has no variants to select from")]
    NoVariants,

    #[error("invalid investable amount: {0}")]
    InvalidAmount(String),

    #[error("valuation unavailable: {0}")]
    Valuation(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
