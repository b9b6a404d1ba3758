//! Questionnaire answers as submitted by the form collaborator.
//!
//! Tokens are parsed forgivingly: anything unrecognized is kept as `Unknown`
//! and the classifier treats it as balanced/medium.

use crate::error::{EngineError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Objective {
    /// Quick gains, weeks to months
    VeryShort,
    Medium,
    Long,
    Unknown(String),
}

impl Objective {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "very-short" | "very_short" | "veryshort" | "short" => Objective::VeryShort,
            "medium" | "mid" => Objective::Medium,
            "long" => Objective::Long,
            other => Objective::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
    Unknown(String),
}

impl RiskTolerance {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "low" => RiskTolerance::Low,
            "medium" | "mid" => RiskTolerance::Medium,
            "high" => RiskTolerance::High,
            other => RiskTolerance::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Experience {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Experience {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "intermediate" => Experience::Intermediate,
            "advanced" | "expert" => Experience::Advanced,
            _ => Experience::Beginner,
        }
    }
}

/// Amount brackets offered by the questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountBucket {
    #[serde(rename = "under-1k")]
    Under1k,
    #[serde(rename = "1k-10k")]
    From1kTo10k,
    #[serde(rename = "10k-50k")]
    From10kTo50k,
    #[serde(rename = "over-50k")]
    Over50k,
}

impl AmountBucket {
    /// Representative amount used for valuation context.
    pub fn representative(&self) -> f64 {
        match self {
            AmountBucket::Under1k => 500.0,
            AmountBucket::From1kTo10k => 5_000.0,
            AmountBucket::From10kTo50k => 25_000.0,
            AmountBucket::Over50k => 75_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InvestableAmount {
    #[default]
    None,
    Bucket(AmountBucket),
    Literal(f64),
}

impl InvestableAmount {
    /// Parse a bucket token (`1k-10k`) or a literal (`5000`, `$5,000`, `5k`, `2.5m`).
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim().to_lowercase();
        if s.is_empty() || s == "none" {
            return Ok(InvestableAmount::None);
        }

        let bucket = match s.as_str() {
            "under-1k" => Some(AmountBucket::Under1k),
            "1k-10k" => Some(AmountBucket::From1kTo10k),
            "10k-50k" => Some(AmountBucket::From10kTo50k),
            "over-50k" => Some(AmountBucket::Over50k),
            _ => None,
        };
        if let Some(b) = bucket {
            return Ok(InvestableAmount::Bucket(b));
        }

        let literal_re = Regex::new(r"^\$?\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s*([km])?$")
            .map_err(|e| EngineError::InvalidAmount(e.to_string()))?;
        let caps = literal_re
            .captures(&s)
            .ok_or_else(|| EngineError::InvalidAmount(input.to_string()))?;

        let digits = caps[1].replace(',', "");
        let base: f64 = digits
            .parse()
            .map_err(|_| EngineError::InvalidAmount(input.to_string()))?;
        let multiplier = match caps.get(2).map(|m| m.as_str()) {
            Some("k") => 1_000.0,
            Some("m") => 1_000_000.0,
            _ => 1.0,
        };

        Ok(InvestableAmount::Literal(base * multiplier))
    }

    /// Amount in reference currency, if one was given.
    pub fn value(&self) -> Option<f64> {
        match self {
            InvestableAmount::None => None,
            InvestableAmount::Bucket(b) => Some(b.representative()),
            InvestableAmount::Literal(v) => Some(*v),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.value().is_some_and(|v| v > 0.0)
    }
}

/// Immutable questionnaire submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorAnswers {
    pub objective: Objective,
    pub risk: RiskTolerance,
    #[serde(default)]
    pub amount: InvestableAmount,
    #[serde(default)]
    pub experience: Experience,
}

impl InvestorAnswers {
    pub fn new(objective: Objective, risk: RiskTolerance) -> Self {
        Self {
            objective,
            risk,
            amount: InvestableAmount::None,
            experience: Experience::Beginner,
        }
    }

    /// Build from raw form tokens.
    pub fn from_tokens(objective: &str, risk: &str) -> Self {
        Self::new(Objective::from_token(objective), RiskTolerance::from_token(risk))
    }

    pub fn with_amount(mut self, amount: InvestableAmount) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_experience(mut self, experience: Experience) -> Self {
        self.experience = experience;
        self
    }
}
