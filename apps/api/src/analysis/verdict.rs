//! Result Normalizer: turns the model's raw text into the response body.
//!
//! The parsed `serde_json::Value` is what the caller receives, unchanged.
//! `AnalysisVerdict` documents the expected shape and is used by strict validation.

use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::analysis::policy::ScoringPolicy;

#[derive(Debug, Error)]
pub enum VerdictError {
    #[error("Model returned invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned an invalid verdict: {0}")]
    Invalid(String),
}

/// How much the service checks the model's answer before relaying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerdictValidation {
    /// Any syntactically valid JSON passes through.
    #[default]
    Off,
    /// Field presence, types, score range, status label and list bounds.
    Strict,
}

impl FromStr for VerdictValidation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "strict" => Ok(Self::Strict),
            other => anyhow::bail!("VERDICT_VALIDATION must be 'off' or 'strict', got '{other}'"),
        }
    }
}

/// The verdict shape requested from the model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisVerdict {
    pub ats_score: f64,
    pub message: String,
    pub status: String,
    pub weaknesses: Vec<String>,
    pub improvements: Vec<String>,
}

/// Parses `raw` and, in strict mode, validates it against `policy`.
/// Never rewrites the value.
pub fn normalize(
    raw: &str,
    validation: VerdictValidation,
    policy: &ScoringPolicy,
) -> Result<Value, VerdictError> {
    let value: Value = serde_json::from_str(raw)?;

    if validation == VerdictValidation::Strict {
        validate(&value, policy)?;
    }

    Ok(value)
}

fn validate(value: &Value, policy: &ScoringPolicy) -> Result<(), VerdictError> {
    if !value.is_object() {
        return Err(VerdictError::Invalid("expected a JSON object".to_string()));
    }

    let verdict = AnalysisVerdict::deserialize(value)
        .map_err(|e| VerdictError::Invalid(e.to_string()))?;

    if !(0.0..=100.0).contains(&verdict.ats_score) {
        return Err(VerdictError::Invalid(format!(
            "ats_score {} is outside 0-100",
            verdict.ats_score
        )));
    }
    if !policy.is_known_status(&verdict.status) {
        return Err(VerdictError::Invalid(format!(
            "status '{}' is not one of '{}' or '{}'",
            verdict.status, policy.ready_status, policy.not_ready_status
        )));
    }
    if verdict.weaknesses.len() > policy.max_weaknesses {
        return Err(VerdictError::Invalid(format!(
            "{} weaknesses exceeds the limit of {}",
            verdict.weaknesses.len(),
            policy.max_weaknesses
        )));
    }
    if verdict.improvements.len() > policy.max_improvements {
        return Err(VerdictError::Invalid(format!(
            "{} improvements exceeds the limit of {}",
            verdict.improvements.len(),
            policy.max_improvements
        )));
    }

    Ok(())
}
