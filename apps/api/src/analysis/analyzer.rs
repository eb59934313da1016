//! Resume Analysis Client: a pluggable trait-based seam in front of the LLM.
//!
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`; tests swap in a stub.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::analysis::policy::ScoringPolicy;
use crate::analysis::storage::UploadedResume;
use crate::errors::AppError;
use crate::llm_client::{LlmClient, EMPTY_OUTPUT};

/// Produces the model's raw verdict text for a stored resume.
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, resume: &UploadedResume) -> Result<String, AppError>;
}

/// Two sequential OpenAI calls: Files upload, then a JSON-object response.
pub struct OpenAiResumeAnalyzer {
    llm: LlmClient,
    model: String,
    prompt: String,
}

impl OpenAiResumeAnalyzer {
    pub fn new(llm: LlmClient, model: String, policy: Arc<ScoringPolicy>) -> Self {
        Self {
            llm,
            model,
            prompt: policy.render_prompt(),
        }
    }
}

#[async_trait]
impl ResumeAnalyzer for OpenAiResumeAnalyzer {
    async fn analyze(&self, resume: &UploadedResume) -> Result<String, AppError> {
        let bytes = tokio::fs::read(resume.path()).await?;

        let stored = self
            .llm
            .upload_file(bytes, &resume.original_filename, &resume.media_type)
            .await?;
        info!(file_id = %stored.id, "Resume uploaded to provider");

        let response = self
            .llm
            .create_response(&self.model, &self.prompt, &stored.id)
            .await?;

        match response.text() {
            Some(text) => Ok(text.to_string()),
            None => {
                debug!("Model response carried no text; using empty object");
                Ok(EMPTY_OUTPUT.to_string())
            }
        }
    }
}
