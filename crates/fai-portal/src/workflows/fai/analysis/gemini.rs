use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, ConfigError};

use super::super::domain::{AnalysisDetail, AnalysisReport, DocumentGrade, Verdict};
use super::super::registry::DocType;
use super::{AnalysisCollaborator, AnalysisError, AnalysisRequest, CHECKLIST_INSTRUCTION};

/// HTTP client for a Gemini-style `generateContent` endpoint. Readable
/// documents travel inline as base64; everything else is only described in
/// the prompt inventory.
pub struct GeminiAnalysisClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiAnalysisClient {
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.to_string();
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| ConfigError::AnalysisClient {
                message: err.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn wire_request(request: &AnalysisRequest) -> GenerateContentRequest {
        let mut parts = vec![Part {
            text: Some(request.prompt_text()),
            inline_data: None,
        }];
        parts.extend(request.media.iter().map(|media| Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: media.mime_type.clone(),
                data: STANDARD.encode(&media.data),
            }),
        }));

        GenerateContentRequest {
            contents: vec![Content { parts }],
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: CHECKLIST_INSTRUCTION.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        }
    }
}

impl std::fmt::Debug for GeminiAnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAnalysisClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl AnalysisCollaborator for GeminiAnalysisClient {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        let body = Self::wire_request(&request);

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AnalysisError::Timeout
                } else {
                    AnalysisError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Provider(format!("{status}: {detail}")));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| AnalysisError::MalformedResponse(err.to_string()))?;

        report_from_response(payload)
    }
}

/// Extract and strictly parse the structured report out of a provider
/// response. Any deviation from the expected shape is an analysis failure.
pub(crate) fn report_from_response(
    payload: GenerateContentResponse,
) -> Result<AnalysisReport, AnalysisError> {
    let text = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| AnalysisError::MalformedResponse("no text candidate".to_string()))?;

    report_from_payload(&text)
}

pub(crate) fn report_from_payload(text: &str) -> Result<AnalysisReport, AnalysisError> {
    let wire: WireReport = serde_json::from_str(text)
        .map_err(|err| AnalysisError::MalformedResponse(err.to_string()))?;

    Ok(AnalysisReport {
        overall_verdict: wire.overall_verdict,
        summary: wire.summary,
        details: wire
            .details
            .into_iter()
            .map(|detail| AnalysisDetail {
                doc_type: detail.doc_type,
                result: detail.result,
                notes: detail.notes,
            })
            .collect(),
    })
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: SystemInstruction,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub(crate) content: CandidateContent,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub(crate) parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidatePart {
    pub(crate) text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireReport {
    #[serde(rename = "overallVerdict")]
    overall_verdict: Verdict,
    summary: String,
    details: Vec<WireDetail>,
}

#[derive(Debug, Deserialize)]
struct WireDetail {
    #[serde(rename = "docType")]
    doc_type: DocType,
    result: DocumentGrade,
    notes: String,
}
