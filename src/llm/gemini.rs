//! Gemini (Generative Language API) adapter for analysis and chat.

use crate::analysis::prompt::{analysis_prompt, session_instruction};
use crate::analysis::{Analyzer, ChatSession, FragmentStream};
use crate::domain::{AnalysisReport, ChatMessage, ChatRole, FileRecord, ModelSettings};
use crate::llm::sse::SseDecoder;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self { role: role.map(str::to_string), parts: vec![Part { text: Some(text.into()) }] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String> {
        if let Some(error) = self.error {
            bail!("Gemini error {}: {}", error.code.unwrap_or_default(), error.message);
        }
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            bail!("Gemini blocked the prompt: {reason}");
        }
        Ok(self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default())
    }
}

/// Response schema for the blueprint report shape.
fn report_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "mission": { "type": "STRING" },
            "architectureSimple": { "type": "STRING" },
            "technicalDecisions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "decision": { "type": "STRING" },
                        "rationale": { "type": "STRING" }
                    },
                    "required": ["decision", "rationale"]
                }
            },
            "importantFiles": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "path": { "type": "STRING" },
                        "role": { "type": "STRING" }
                    },
                    "required": ["path", "role"]
                }
            },
            "fileOrganizationLogic": { "type": "STRING" },
            "techStack": { "type": "ARRAY", "items": { "type": "STRING" } },
            "suggestedQuestions": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": [
            "mission",
            "architectureSimple",
            "technicalDecisions",
            "importantFiles",
            "fileOrganizationLogic",
            "techStack",
            "suggestedQuestions"
        ]
    })
}

fn chat_contents(history: &[ChatMessage]) -> Vec<Content> {
    history
        .iter()
        .filter(|m| !m.content.is_empty())
        .map(|m| {
            let role = match m.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "model",
            };
            Content::text(Some(role), m.content.clone())
        })
        .collect()
}

/// HTTP plumbing shared by the analyzer and its sessions.
#[derive(Clone)]
struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.api_base.trim_end_matches('/'), self.model, method)
    }

    async fn post(&self, url: &str, body: &GenerateRequest) -> Result<Response> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Gemini model {}", self.model))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        Err(anyhow!("Gemini API error {}: {}", status.as_u16(), message))
    }
}

/// [`Analyzer`] backed by the Gemini REST API.
pub struct GeminiAnalyzer {
    inner: GeminiClient,
}

impl GeminiAnalyzer {
    pub fn new(settings: &ModelSettings) -> Result<Self> {
        let api_key = settings.api_key.clone().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!("Gemini API key is required. Set GEMINI_API_KEY environment variable.")
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            inner: GeminiClient {
                client,
                api_base: settings.api_base.clone(),
                model: settings.model.clone(),
                api_key,
            },
        })
    }

    pub fn model_name(&self) -> &str {
        &self.inner.model
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, files: &[FileRecord]) -> Result<AnalysisReport> {
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content::text(Some("user"), analysis_prompt(files))],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: report_schema(),
            }),
        };

        let url = self.inner.endpoint("generateContent");
        tracing::debug!("Requesting analysis of {} files from {}", files.len(), self.inner.model);
        let response: GenerateResponse = self
            .inner
            .post(&url, &request)
            .await?
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let text = response.into_text()?;
        AnalysisReport::from_json(&text)
    }

    async fn open_session(
        &self,
        files: &[FileRecord],
        report: &AnalysisReport,
    ) -> Result<Box<dyn ChatSession>> {
        let instruction = session_instruction(files, report)?;
        Ok(Box::new(GeminiSession { inner: self.inner.clone(), instruction }))
    }
}

/// A conversation with its system instruction fixed at creation.
pub struct GeminiSession {
    inner: GeminiClient,
    instruction: String,
}

#[async_trait]
impl ChatSession for GeminiSession {
    async fn stream_reply(&self, history: &[ChatMessage]) -> Result<FragmentStream> {
        let request = GenerateRequest {
            system_instruction: Some(Content::text(None, self.instruction.clone())),
            contents: chat_contents(history),
            generation_config: None,
        };

        let url = format!("{}?alt=sse", self.inner.endpoint("streamGenerateContent"));
        let response = self.inner.post(&url, &request).await?;
        Ok(fragments_from_sse(response.bytes_stream()))
    }
}

struct SseState {
    body: BoxStream<'static, Result<Vec<u8>>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String>>,
    done: bool,
}

impl SseState {
    fn push_event(&mut self, data: &str) {
        match parse_event(data) {
            Ok(Some(text)) => self.pending.push_back(Ok(text)),
            Ok(None) => {}
            Err(e) => {
                self.pending.push_back(Err(e));
                self.done = true;
            }
        }
    }
}

/// Text carried by one streamed event, if any.
fn parse_event(data: &str) -> Result<Option<String>> {
    if data.trim() == "[DONE]" {
        return Ok(None);
    }
    let response: GenerateResponse =
        serde_json::from_str(data).context("Malformed Gemini stream event")?;
    let text = response.into_text()?;
    Ok(Some(text).filter(|t| !t.is_empty()))
}

/// Turn an SSE response body into a stream of text fragments.
pub fn fragments_from_sse<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    let body = body.map(|chunk| chunk.map(|b| b.as_ref().to_vec()).map_err(anyhow::Error::new));
    let state = SseState {
        body: body.boxed(),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.done {
                return None;
            }
            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for data in state.decoder.feed(&chunk) {
                        state.push_event(&data);
                    }
                }
                Some(Err(e)) => {
                    state.pending.push_back(Err(e.context("Gemini stream interrupted")));
                    state.done = true;
                }
                None => {
                    if let Some(data) = state.decoder.finish() {
                        state.push_event(&data);
                    }
                    state.done = true;
                }
            }
        }
    })
    .boxed()
}
