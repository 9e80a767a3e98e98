/*!
 * Google Cloud REST client.
 *
 * Wraps Cloud Translation v3, Vision, Speech-to-Text and Text-to-Speech.
 * Every call goes through one retry loop: server errors, rate limiting and
 * network failures are retried with exponential backoff, while other client
 * errors are returned immediately.
 */

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{debug, error, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::credentials::Credentials;
use super::{Provider, RecognitionRequest, SynthesisRequest, TranslateRequest};
use crate::app_config::GoogleCloudConfig;
use crate::errors::ProviderError;

/// Sample rate sent with every recognition request
const RECOGNITION_SAMPLE_RATE_HERTZ: u32 = 16_000;

/// Audio encodings accepted by Speech-to-Text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    Linear16,
    AmrWb,
}

impl AudioEncoding {
    /// Name used in the recognition config
    pub fn api_name(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::AmrWb => "AMR_WB",
        }
    }

    /// Map an upload's MIME type to an encoding
    ///
    /// Unknown or missing types fall back to LINEAR16.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let mime = content_type
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match mime.as_str() {
            "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/l16" | "audio/vnd.wave"
            | "audio/vnd.wav" => AudioEncoding::Linear16,
            "audio/awb" | "audio/amr-wb" | "audio/amr_wb" => AudioEncoding::AmrWb,
            other => {
                warn!("Unrecognized audio content type '{}', assuming LINEAR16", other);
                AudioEncoding::Linear16
            }
        }
    }
}

/// Whether a Text-to-Speech error message means no voice exists for the language
pub fn is_unsupported_voice_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    (lower.contains("voice")
        && (lower.contains("does not exist")
            || lower.contains("is not supported for the input language_code")))
        || lower.contains("unsupported language code")
        || (lower.contains("language code") && lower.contains("not supported"))
}

// ---- wire types ----

#[derive(Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorBody,
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTextBody<'a> {
    contents: [&'a str; 1],
    target_language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_language_code: Option<&'a str>,
    mime_type: &'static str,
}

#[derive(Deserialize)]
struct TranslateTextResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[derive(Serialize)]
struct AnnotateBody<'a> {
    requests: [AnnotateImageRequest<'a>; 1],
}

#[derive(Serialize)]
struct AnnotateImageRequest<'a> {
    image: InlineContent<'a>,
    features: [Feature; 1],
}

#[derive(Serialize)]
struct InlineContent<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    error: Option<AnnotateStatus>,
}

#[derive(Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct AnnotateStatus {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct RecognizeBody<'a> {
    config: RecognitionConfig<'a>,
    audio: InlineContent<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: &'a str,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    ssml_gender: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

/// Google Cloud client
#[derive(Debug)]
pub struct GoogleCloud {
    client: Client,
    credentials: Credentials,
    project_id: String,
    location: String,
    translation_endpoint: String,
    vision_endpoint: String,
    speech_endpoint: String,
    text_to_speech_endpoint: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl GoogleCloud {
    /// Build a client from configuration
    pub fn from_config(config: &GoogleCloudConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        let credentials = Credentials::from_config(config, client.clone())?;

        let project_id = if config.project_id.trim().is_empty() {
            credentials
                .project_id()
                .map(str::to_string)
                .ok_or_else(|| {
                    ProviderError::AuthenticationError("No Google Cloud project ID configured".to_string())
                })?
        } else {
            config.project_id.trim().to_string()
        };

        Ok(Self {
            client,
            credentials,
            project_id,
            location: config.location.clone(),
            translation_endpoint: trim_endpoint(&config.translation_endpoint),
            vision_endpoint: trim_endpoint(&config.vision_endpoint),
            speech_endpoint: trim_endpoint(&config.speech_endpoint),
            text_to_speech_endpoint: trim_endpoint(&config.text_to_speech_endpoint),
            max_retries: config.retry_count,
            backoff_base_ms: config.retry_backoff_ms,
        })
    }

    /// Project the client bills to
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn translate_url(&self) -> String {
        format!(
            "{}/v3/projects/{}/locations/{}:translateText",
            self.translation_endpoint, self.project_id, self.location
        )
    }

    /// Send a request with retry logic and decode the JSON response
    async fn execute<R, F>(&self, operation: &str, build: F) -> Result<R, ProviderError>
    where
        R: DeserializeOwned,
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut last_error = None;
        let mut attempt = 0;

        while attempt <= self.max_retries {
            let request = self.credentials.authorize(build()).await?;

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.text().await.map_err(|e| {
                            ProviderError::ParseError(format!("Failed to read {} response: {}", operation, e))
                        })?;
                        return serde_json::from_str(&body).map_err(|e| {
                            ProviderError::ParseError(format!("Invalid {} response: {}", operation, e))
                        });
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to get error response text".to_string());
                    let api_error = error_from_response(status, &error_text);

                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        error!(
                            "Google {} error ({}): {} - attempt {}/{}",
                            operation,
                            status,
                            api_error,
                            attempt + 1,
                            self.max_retries + 1
                        );
                        last_error = Some(api_error);
                    } else {
                        error!("Google {} error ({}): {}", operation, status, api_error);
                        return Err(api_error);
                    }
                }
                Err(e) => {
                    error!(
                        "Google {} network error: {} - attempt {}/{}",
                        operation,
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ProviderError::ConnectionError(e.to_string()));
                }
            }

            attempt += 1;

            if attempt <= self.max_retries {
                let backoff_ms = backoff_delay_ms(self.backoff_base_ms, attempt);
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!(
                "Google {} request failed after {} attempts",
                operation,
                self.max_retries + 1
            ))
        }))
    }
}

/// Exponential backoff before retry number `attempt` (1-based), saturating
fn backoff_delay_ms(base_ms: u64, attempt: u32) -> u64 {
    let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    base_ms.saturating_mul(factor)
}

fn trim_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

/// Turn a non-success response into a provider error
fn error_from_response(status: StatusCode, body: &str) -> ProviderError {
    let (message, api_status) = match serde_json::from_str::<GoogleErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (body.to_string(), None),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
        _ => {
            let message = match api_status {
                Some(api_status) => format!("{}: {}", api_status, message),
                None => message,
            };
            ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl Provider for GoogleCloud {
    fn name(&self) -> &str {
        "google-cloud"
    }

    async fn translate(&self, request: TranslateRequest) -> Result<String, ProviderError> {
        let url = self.translate_url();
        let body = TranslateTextBody {
            contents: [request.text.as_str()],
            target_language_code: &request.target_language,
            source_language_code: request.source_language.as_deref(),
            mime_type: "text/plain",
        };

        let response: TranslateTextResponse = self
            .execute("translate", || self.client.post(&url).json(&body))
            .await?;

        response
            .translations
            .into_iter()
            .next()
            .map(|translation| translation.translated_text)
            .ok_or_else(|| ProviderError::ParseError("Translation response had no translations".to_string()))
    }

    async fn detect_text(&self, image: Vec<u8>) -> Result<String, ProviderError> {
        let url = format!("{}/v1/images:annotate", self.vision_endpoint);
        let content = BASE64.encode(&image);
        let body = AnnotateBody {
            requests: [AnnotateImageRequest {
                image: InlineContent { content: &content },
                features: [Feature {
                    feature_type: "TEXT_DETECTION",
                }],
            }],
        };

        let response: AnnotateResponse = self
            .execute("vision", || self.client.post(&url).json(&body))
            .await?;

        let Some(first) = response.responses.into_iter().next() else {
            return Ok(String::new());
        };

        if let Some(status) = first.error {
            return Err(ProviderError::RequestFailed(format!(
                "Image annotation failed: {}",
                status.message
            )));
        }

        Ok(first
            .text_annotations
            .into_iter()
            .next()
            .map(|annotation| annotation.description)
            .unwrap_or_default())
    }

    async fn synthesize_speech(&self, request: SynthesisRequest) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}/v1/text:synthesize", self.text_to_speech_endpoint);
        let body = SynthesizeBody {
            input: SynthesisInput { text: &request.text },
            voice: VoiceSelection {
                language_code: &request.language_code,
                ssml_gender: "NEUTRAL",
            },
            audio_config: AudioConfig { audio_encoding: "MP3" },
        };

        let response: SynthesizeResponse = match self
            .execute("text-to-speech", || self.client.post(&url).json(&body))
            .await
        {
            Ok(response) => response,
            Err(ProviderError::ApiError { status_code: 400, message })
                if is_unsupported_voice_message(&message) =>
            {
                warn!("No voice available for language {}: {}", request.language_code, message);
                return Err(ProviderError::UnsupportedVoice(message));
            }
            Err(e) => return Err(e),
        };

        BASE64
            .decode(response.audio_content.as_bytes())
            .map_err(|e| ProviderError::ParseError(format!("Audio content is not valid base64: {}", e)))
    }

    async fn recognize_speech(&self, request: RecognitionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/v1/speech:recognize", self.speech_endpoint);
        let encoding = AudioEncoding::from_content_type(request.content_type.as_deref());
        debug!(
            "Recognizing {} bytes of {} audio in {}",
            request.audio.len(),
            encoding.api_name(),
            request.language_code
        );

        let content = BASE64.encode(&request.audio);
        let body = RecognizeBody {
            config: RecognitionConfig {
                encoding: encoding.api_name(),
                sample_rate_hertz: RECOGNITION_SAMPLE_RATE_HERTZ,
                language_code: &request.language_code,
            },
            audio: InlineContent { content: &content },
        };

        let response: RecognizeResponse = self
            .execute("speech", || self.client.post(&url).json(&body))
            .await?;

        let transcript: String = response
            .results
            .into_iter()
            .filter_map(|result| result.alternatives.into_iter().next())
            .map(|alternative| alternative.transcript)
            .collect();

        Ok(transcript.trim().to_string())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/v1/voices", self.text_to_speech_endpoint);
        let _: serde_json::Value = self
            .execute("voices", || self.client.get(&url).query(&[("languageCode", "en-US")]))
            .await?;
        Ok(())
    }
}
