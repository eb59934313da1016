//! Scoring policy: everything the analysis prompt asks of the model.
//!
//! The model is the only place the threshold, status labels and list bounds are
//! applied; this service renders them into the prompt and (optionally) checks
//! the shape of the answer against them. Swapping a policy is a config change.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::prompts::{
    ANALYSIS_PROMPT, BALANCED_GUIDANCE, BALANCED_LIST_TONE, STRICT_GUIDANCE, STRICT_LIST_TONE,
};

const READY_MESSAGE: &str = "Ajoyib! Sizning resumeyiz ishga tayor.";
const NOT_READY_MESSAGE: &str = "Resumeyiz hali tayor emas.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub name: String,
    /// Free-text scoring guidance placed at the top of the prompt.
    pub guidance: String,
    #[serde(default = "default_list_tone")]
    pub list_tone: String,
    pub ready_threshold: u8,
    pub ready_status: String,
    pub not_ready_status: String,
    pub ready_message: String,
    pub not_ready_message: String,
    pub max_weaknesses: usize,
    pub max_improvements: usize,
}

fn default_list_tone() -> String {
    STRICT_LIST_TONE.to_string()
}

impl ScoringPolicy {
    /// Fair, slightly positive scoring with Uzbek status labels. The default.
    pub fn balanced() -> Self {
        Self {
            name: "balanced".to_string(),
            guidance: BALANCED_GUIDANCE.to_string(),
            list_tone: BALANCED_LIST_TONE.to_string(),
            ready_threshold: 70,
            ready_status: "Tayor".to_string(),
            not_ready_status: "Hali Tayor emas!".to_string(),
            ready_message: READY_MESSAGE.to_string(),
            not_ready_message: NOT_READY_MESSAGE.to_string(),
            max_weaknesses: 3,
            max_improvements: 4,
        }
    }

    /// Plain ATS scoring with no leniency bias.
    pub fn strict() -> Self {
        Self {
            name: "strict".to_string(),
            guidance: STRICT_GUIDANCE.to_string(),
            list_tone: STRICT_LIST_TONE.to_string(),
            ready_threshold: 70,
            ready_status: "ready".to_string(),
            not_ready_status: "not ready".to_string(),
            ready_message: READY_MESSAGE.to_string(),
            not_ready_message: NOT_READY_MESSAGE.to_string(),
            max_weaknesses: 4,
            max_improvements: 4,
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "balanced" => Some(Self::balanced()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }

    /// Reads a policy from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scoring policy '{}'", path.display()))?;
        let policy: ScoringPolicy = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid scoring policy JSON in '{}'", path.display()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Policy file wins over the built-in name.
    pub fn load(name: &str, file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::builtin(name).with_context(|| {
                format!("Unknown scoring policy '{name}' (expected 'balanced' or 'strict')")
            }),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.ready_threshold > 100 {
            bail!("ready_threshold must be between 0 and 100");
        }
        if self.ready_status.trim().is_empty() || self.not_ready_status.trim().is_empty() {
            bail!("status labels must not be empty");
        }
        if self.ready_status == self.not_ready_status {
            bail!("ready_status and not_ready_status must differ");
        }
        Ok(())
    }

    pub fn is_known_status(&self, status: &str) -> bool {
        status == self.ready_status || status == self.not_ready_status
    }

    /// The instruction text sent alongside the resume.
    ///
    /// Substitution is a single pass over the template, so braces inside
    /// policy-supplied text are emitted literally.
    pub fn render_prompt(&self) -> String {
        fill_placeholders(ANALYSIS_PROMPT, |name| match name {
            "guidance" => Some(self.guidance.clone()),
            "list_tone" => Some(self.list_tone.clone()),
            "threshold" => Some(self.ready_threshold.to_string()),
            "ready_status" => Some(self.ready_status.clone()),
            "not_ready_status" => Some(self.not_ready_status.clone()),
            "ready_message" => Some(self.ready_message.clone()),
            "not_ready_message" => Some(self.not_ready_message.clone()),
            "max_weaknesses" => Some(self.max_weaknesses.to_string()),
            "max_improvements" => Some(self.max_improvements.to_string()),
            _ => None,
        })
    }
}

/// Replaces `{name}` tokens whose name `lookup` knows; anything else is copied as-is.
fn fill_placeholders(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let value = tail
            .find('}')
            .and_then(|end| lookup(&tail[1..end]).map(|value| (value, end)));
        match value {
            Some((value, end)) => {
                out.push_str(&value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::balanced()
    }
}
