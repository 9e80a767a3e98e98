/*!
 * Cloud AI provider implementations.
 *
 * This module contains the provider abstraction used by the service layer
 * and its implementations:
 * - Google Cloud: Translation v3, Vision, Speech-to-Text and Text-to-Speech over REST
 * - Mock: deterministic in-process provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Text translation request
#[derive(Debug, Clone)]
pub struct TranslateRequest {
    /// Text to translate
    pub text: String,
    /// Source language tag; `None` lets the provider detect it
    pub source_language: Option<String>,
    /// Target language tag
    pub target_language: String,
}

/// Speech synthesis request
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Text to speak
    pub text: String,
    /// Voice language tag
    pub language_code: String,
}

/// Speech recognition request
#[derive(Debug, Clone)]
pub struct RecognitionRequest {
    /// Raw audio bytes
    pub audio: Vec<u8>,
    /// Spoken language tag
    pub language_code: String,
    /// MIME type reported by the client, used to pick the audio encoding
    pub content_type: Option<String>,
}

/// Common trait for cloud AI providers
///
/// All translation, OCR and speech work is delegated through this trait,
/// so the service layer can run against a mock in tests.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Translate text
    async fn translate(&self, request: TranslateRequest) -> Result<String, ProviderError>;

    /// Extract text from an image; an image without text yields an empty string
    async fn detect_text(&self, image: Vec<u8>) -> Result<String, ProviderError>;

    /// Synthesize MP3 audio
    ///
    /// # Returns
    /// * `Err(ProviderError::UnsupportedVoice)` when no voice exists for the language
    async fn synthesize_speech(&self, request: SynthesisRequest) -> Result<Vec<u8>, ProviderError>;

    /// Transcribe audio
    async fn recognize_speech(&self, request: RecognitionRequest) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod credentials;
pub mod google;
pub mod mock;
