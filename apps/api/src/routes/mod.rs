pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/analyze",
            post(handlers::handle_analyze).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::analyzer::ResumeAnalyzer;
    use crate::analysis::policy::ScoringPolicy;
    use crate::analysis::storage::{TempFileStore, UploadedResume};
    use crate::config::Config;
    use crate::errors::AppError;

    struct Unused;

    #[async_trait]
    impl ResumeAnalyzer for Unused {
        async fn analyze(&self, _resume: &UploadedResume) -> Result<String, AppError> {
            unreachable!("health routes never analyze")
        }
    }

    async fn router(dir: &tempfile::TempDir) -> Router {
        let config = Config::from_lookup(|key| (key == "OPENAI_API_KEY").then(|| "k".to_string()))
            .unwrap();
        build_router(AppState {
            analyzer: Arc::new(Unused),
            store: TempFileStore::new(dir.path()).await.unwrap(),
            policy: Arc::new(ScoringPolicy::default()),
            config,
        })
    }

    #[tokio::test]
    async fn test_root_liveness_message() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(&dir)
            .await
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], health::LIVENESS_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(&dir)
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_analyze_requires_post() {
        let dir = tempfile::tempdir().unwrap();
        let response = router(&dir)
            .await
            .oneshot(Request::get("/analyze").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
