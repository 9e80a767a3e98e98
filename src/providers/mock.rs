/*!
 * Mock provider implementation for testing.
 *
 * Outputs are derived from the inputs so tests can assert on them:
 * - `MockProvider::working()` - every operation succeeds
 * - `MockProvider::unsupported_voice()` - speech synthesis reports a missing voice
 * - `MockProvider::failing()` - every operation fails with a connection error
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{Provider, RecognitionRequest, SynthesisRequest, TranslateRequest};

/// Prefix put in front of synthesized audio
pub const MOCK_AUDIO_PREFIX: &[u8] = b"ID3";

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Speech synthesis fails with an unsupported voice, everything else works
    UnsupportedVoice,
    /// Always fails with an error
    Failing,
}

/// Mock provider for testing
#[derive(Debug)]
pub struct MockProvider {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock provider without speech synthesis voices
    pub fn unsupported_voice() -> Self {
        Self::new(MockBehavior::UnsupportedVoice)
    }

    /// Create a failing mock provider
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Number of requests served so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    async fn begin_request(&self) -> Result<(), ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated provider failure".to_string(),
            )),
            MockBehavior::Working | MockBehavior::UnsupportedVoice => Ok(()),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(&self, request: TranslateRequest) -> Result<String, ProviderError> {
        self.begin_request().await?;
        Ok(format!("[{}] {}", request.target_language, request.text))
    }

    async fn detect_text(&self, image: Vec<u8>) -> Result<String, ProviderError> {
        self.begin_request().await?;
        Ok(String::from_utf8_lossy(&image).trim().to_string())
    }

    async fn synthesize_speech(&self, request: SynthesisRequest) -> Result<Vec<u8>, ProviderError> {
        self.begin_request().await?;
        if self.behavior == MockBehavior::UnsupportedVoice {
            return Err(ProviderError::UnsupportedVoice(format!(
                "Voice for language {} does not exist",
                request.language_code
            )));
        }

        let mut audio = MOCK_AUDIO_PREFIX.to_vec();
        audio.extend_from_slice(request.text.as_bytes());
        Ok(audio)
    }

    async fn recognize_speech(&self, request: RecognitionRequest) -> Result<String, ProviderError> {
        self.begin_request().await?;
        Ok(String::from_utf8_lossy(&request.audio).trim().to_string())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.begin_request().await
    }
}
