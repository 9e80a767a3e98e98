/*!
 * Thin orchestration over the cloud provider.
 */

use log::{debug, warn};
use std::sync::Arc;

use super::{language_code, required_text};
use crate::errors::{AppError, AppResult, ProviderError};
use crate::language_utils;
use crate::providers::{Provider, RecognitionRequest, SynthesisRequest, TranslateRequest};

/// Result of a speech synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TtsOutcome {
    /// MP3 audio
    Generated(Vec<u8>),
    /// No voice exists for the requested language
    Unavailable,
}

/// Cloud translation, OCR and speech service
#[derive(Debug, Clone)]
pub struct CloudService {
    provider: Arc<dyn Provider>,
}

impl CloudService {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Translate text; a missing or "auto" source lets the provider detect it
    pub async fn translate(&self, text: &str, source_lang: Option<&str>, target_lang: &str) -> AppResult<String> {
        let text = required_text(text, "Text")?;
        let target_language = language_code(target_lang, false)?;
        let source_language = match source_lang {
            Some(code) => language_utils::normalize_source_language(code)
                .map_err(|e| AppError::InvalidInput(e.to_string()))?,
            None => None,
        };

        debug!(
            "Translating {} chars {} -> {} via {}",
            text.chars().count(),
            source_language.as_deref().unwrap_or(language_utils::AUTO_DETECT),
            target_language,
            self.provider.name()
        );

        Ok(self
            .provider
            .translate(TranslateRequest {
                text,
                source_language,
                target_language,
            })
            .await?)
    }

    /// Synthesize speech
    pub async fn text_to_speech(&self, text: &str, language_code: &str) -> AppResult<TtsOutcome> {
        let text = required_text(text, "Text")?;
        let language_code = required_text(language_code, "Language code")?;

        match self
            .provider
            .synthesize_speech(SynthesisRequest {
                text,
                language_code: language_code.clone(),
            })
            .await
        {
            Ok(audio) => Ok(TtsOutcome::Generated(audio)),
            Err(ProviderError::UnsupportedVoice(message)) => {
                let language = language_utils::get_language_name(&language_code)
                    .unwrap_or_else(|_| language_code.clone());
                warn!("Text-to-speech unavailable for {}: {}", language, message);
                Ok(TtsOutcome::Unavailable)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Extract text from an image
    pub async fn ocr(&self, image: Vec<u8>) -> AppResult<String> {
        if image.is_empty() {
            return Err(AppError::InvalidInput("File is empty".to_string()));
        }
        Ok(self.provider.detect_text(image).await?)
    }

    /// Transcribe audio
    pub async fn speech_to_text(
        &self,
        audio: Vec<u8>,
        language_code: &str,
        content_type: Option<&str>,
    ) -> AppResult<String> {
        if audio.is_empty() {
            return Err(AppError::InvalidInput("Audio file is empty".to_string()));
        }
        let language_code = required_text(language_code, "Language code")?;

        Ok(self
            .provider
            .recognize_speech(RecognitionRequest {
                audio,
                language_code,
                content_type: content_type.map(str::to_string),
            })
            .await?)
    }
}
