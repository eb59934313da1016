/// LLM Client: the single point of entry for all OpenAI API calls.
///
/// Wraps two endpoints: the Files API (stores the resume on the provider side)
/// and the Responses API (structured JSON completion referencing that file).
/// No retries: a failed call is surfaced to the caller as-is.
use std::time::Duration;

use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Returned in place of model output when the response carries no text.
pub const EMPTY_OUTPUT: &str = "{}";
const FILE_PURPOSE: &str = "user_data";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from provider: {0}")]
    Malformed(String),
}

/// A file as stored by the provider's Files API.
#[derive(Debug, Deserialize)]
pub struct StoredFile {
    pub id: String,
    #[serde(default)]
    pub bytes: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    text: TextOptions,
    input: Vec<InputMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct TextOptions {
    format: TextFormat,
}

#[derive(Debug, Serialize)]
struct TextFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: Vec<InputContent<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputContent<'a> {
    InputText { text: &'a str },
    InputFile { file_id: &'a str },
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct OutputItem {
    /// Absent on reasoning items.
    #[serde(default)]
    pub content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Text of the first content block of the first output item that has content.
    pub fn text(&self) -> Option<&str> {
        self.output
            .iter()
            .find_map(|item| item.content.as_deref().filter(|c| !c.is_empty()))
            .and_then(|content| content.first())
            .and_then(|block| block.text.as_deref())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Thin OpenAI client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Uploads raw file bytes to the Files API tagged for user data.
    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        media_type: &str,
    ) -> Result<StoredFile, LlmError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(media_type)?;
        let form = multipart::Form::new()
            .text("purpose", FILE_PURPOSE)
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/files", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let stored: StoredFile = parse_response(response).await?;
        debug!(file_id = %stored.id, bytes = ?stored.bytes, "Uploaded file to provider");
        Ok(stored)
    }

    /// Calls the Responses API with JSON-object output, one text instruction and
    /// one file reference.
    pub async fn create_response(
        &self,
        model: &str,
        instructions: &str,
        file_id: &str,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = ResponsesRequest {
            model,
            text: TextOptions {
                format: TextFormat {
                    format_type: "json_object",
                },
            },
            input: vec![InputMessage {
                role: "user",
                content: vec![
                    InputContent::InputText { text: instructions },
                    InputContent::InputFile { file_id },
                ],
            }],
        };

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let llm_response: LlmResponse = parse_response(response).await?;

        if let Some(usage) = &llm_response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "LLM call succeeded"
            );
        }

        Ok(llm_response)
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, LlmError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(LlmError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| LlmError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Multipart, State},
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    use super::*;

    #[derive(Default)]
    struct Recorded {
        upload_fields: Vec<(String, Option<String>, Option<String>)>,
        upload_bytes: Vec<u8>,
        responses_body: Option<Value>,
        authorization: Option<String>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    async fn fake_files(
        State(rec): State<Shared>,
        headers: HeaderMap,
        mut multipart: Multipart,
    ) -> Json<Value> {
        let mut rec_fields = Vec::new();
        let mut file_bytes = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.unwrap();
            if name == "file" {
                file_bytes = data.to_vec();
            } else {
                assert_eq!(name, "purpose");
                assert_eq!(&data[..], b"user_data");
            }
            rec_fields.push((name, file_name, content_type));
        }
        let mut rec = rec.lock().unwrap();
        rec.upload_fields = rec_fields;
        rec.upload_bytes = file_bytes;
        rec.authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Json(json!({"id": "file-abc123", "object": "file", "bytes": 8, "filename": "cv.pdf"}))
    }

    async fn fake_responses(State(rec): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
        rec.lock().unwrap().responses_body = Some(body);
        Json(json!({
            "id": "resp_1",
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": "{\"ats_score\":75}"}
                ]}
            ],
            "usage": {"input_tokens": 1200, "output_tokens": 40}
        }))
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn client(base_url: String) -> LlmClient {
        LlmClient::new("sk-test".into(), base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_upload_file_sends_purpose_and_file() {
        let rec: Shared = Arc::default();
        let router = Router::new()
            .route("/v1/files", post(fake_files))
            .with_state(rec.clone());
        let llm = client(spawn(router).await);

        let stored = llm
            .upload_file(b"%PDF-1.4".to_vec(), "cv.pdf", "application/pdf")
            .await
            .unwrap();

        assert_eq!(stored.id, "file-abc123");
        let rec = rec.lock().unwrap();
        assert_eq!(rec.upload_bytes, b"%PDF-1.4");
        assert_eq!(rec.authorization.as_deref(), Some("Bearer sk-test"));
        assert!(rec.upload_fields.contains(&(
            "file".to_string(),
            Some("cv.pdf".to_string()),
            Some("application/pdf".to_string())
        )));
    }

    #[tokio::test]
    async fn test_create_response_wire_format_and_text() {
        let rec: Shared = Arc::default();
        let router = Router::new()
            .route("/v1/responses", post(fake_responses))
            .with_state(rec.clone());
        let llm = client(spawn(router).await);

        let response = llm
            .create_response("gpt-5.2", "Analyze this resume", "file-abc123")
            .await
            .unwrap();

        assert_eq!(response.text(), Some("{\"ats_score\":75}"));
        let body = rec.lock().unwrap().responses_body.take().unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-5.2",
                "text": {"format": {"type": "json_object"}},
                "input": [{
                    "role": "user",
                    "content": [
                        {"type": "input_text", "text": "Analyze this resume"},
                        {"type": "input_file", "file_id": "file-abc123"}
                    ]
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let router = Router::new().route(
            "/v1/files",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}})),
                )
            }),
        );
        let llm = client(spawn(router).await);

        let err = llm
            .upload_file(b"%PDF".to_vec(), "cv.pdf", "application/pdf")
            .await
            .unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_is_kept_verbatim() {
        let router = Router::new().route(
            "/v1/responses",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream unavailable") }),
        );
        let llm = client(spawn(router).await);

        let err = llm.create_response("m", "p", "f").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "API error (status 502): upstream unavailable"
        );
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let router = Router::new().route("/v1/files", post(|| async { "not json" }));
        let llm = client(spawn(router).await);

        let err = llm
            .upload_file(b"%PDF".to_vec(), "cv.pdf", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Malformed(_)));
    }

    #[test]
    fn test_text_none_without_content() {
        let response: LlmResponse =
            serde_json::from_value(json!({"output": [{"type": "reasoning"}]})).unwrap();
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_text_none_when_output_missing() {
        let response: LlmResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_text_ignores_empty_string() {
        let response: LlmResponse = serde_json::from_value(json!({
            "output": [{"type": "message", "content": [{"type": "output_text", "text": ""}]}]
        }))
        .unwrap();
        assert_eq!(response.text(), None);
    }
}
