use std::sync::Arc;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::analysis::policy::ScoringPolicy;
use crate::analysis::storage::TempFileStore;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable analysis backend. Default: OpenAiResumeAnalyzer.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    /// Scratch directory for in-flight uploads.
    pub store: TempFileStore,
    /// Active scoring policy; also consulted by strict verdict validation.
    pub policy: Arc<ScoringPolicy>,
    pub config: Config,
}
