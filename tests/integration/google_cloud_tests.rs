/*!
 * Google Cloud client against a local fake of the REST APIs
 */

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};

use rosetta::app_config::GoogleCloudConfig;
use rosetta::errors::ProviderError;
use rosetta::providers::google::GoogleCloud;
use rosetta::providers::{RecognitionRequest, SynthesisRequest, TranslateRequest};
use rosetta::services::{CloudService, TtsOutcome};
use rosetta::Provider;

use crate::common;

/// A request the fake received
#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path_and_query: String,
    api_key: Option<String>,
    body: Value,
}

/// Records requests and answers them from a script, then with `200 {}`
#[derive(Clone, Default)]
struct FakeGoogle {
    requests: Arc<Mutex<Vec<Recorded>>>,
    script: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
}

impl FakeGoogle {
    fn respond(&self, status: StatusCode, body: Value) -> &Self {
        self.script.lock().push_back((status, body));
        self
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().clone()
    }
}

async fn answer(State(fake): State<FakeGoogle>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    fake.requests.lock().push(Recorded {
        method: parts.method.to_string(),
        path_and_query: parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
        api_key: parts
            .headers
            .get("x-goog-api-key")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
    });

    let (status, body) = fake
        .script
        .lock()
        .pop_front()
        .unwrap_or((StatusCode::OK, json!({})));
    (status, Json(body)).into_response()
}

async fn start_fake() -> (FakeGoogle, String) {
    common::init_logging();
    let fake = FakeGoogle::default();
    let app = Router::new().fallback(answer).with_state(fake.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (fake, format!("http://{}", addr))
}

fn client_for(base_url: &str) -> GoogleCloud {
    let config = GoogleCloudConfig {
        project_id: "test-project".to_string(),
        api_key: "test-key".to_string(),
        translation_endpoint: base_url.to_string(),
        vision_endpoint: base_url.to_string(),
        speech_endpoint: base_url.to_string(),
        text_to_speech_endpoint: base_url.to_string(),
        timeout_secs: 5,
        retry_count: 2,
        retry_backoff_ms: 1,
        ..Default::default()
    };
    GoogleCloud::from_config(&config).unwrap()
}

fn translate_request(source_language: Option<&str>) -> TranslateRequest {
    TranslateRequest {
        text: "Hello".to_string(),
        source_language: source_language.map(str::to_string),
        target_language: "es".to_string(),
    }
}

#[tokio::test]
async fn test_translate_shouldCallV3WithApiKey() {
    let (fake, base_url) = start_fake().await;
    fake.respond(StatusCode::OK, json!({ "translations": [{ "translatedText": "Hola" }] }));
    let client = client_for(&base_url);

    let translated = client.translate(translate_request(None)).await.unwrap();

    assert_eq!(translated, "Hola");
    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(
        requests[0].path_and_query,
        "/v3/projects/test-project/locations/global:translateText"
    );
    assert_eq!(requests[0].api_key.as_deref(), Some("test-key"));
    assert_eq!(requests[0].body["contents"][0], "Hello");
    assert_eq!(requests[0].body["targetLanguageCode"], "es");
    assert_eq!(requests[0].body["mimeType"], "text/plain");
    assert!(requests[0].body.get("sourceLanguageCode").is_none());
}

#[tokio::test]
async fn test_translate_withSourceLanguage_shouldSendIt() {
    let (fake, base_url) = start_fake().await;
    fake.respond(StatusCode::OK, json!({ "translations": [{ "translatedText": "Hola" }] }));

    client_for(&base_url).translate(translate_request(Some("en"))).await.unwrap();

    assert_eq!(fake.requests()[0].body["sourceLanguageCode"], "en");
}

#[tokio::test]
async fn test_translate_afterServerErrorAndRateLimit_shouldRetryAndSucceed() {
    let (fake, base_url) = start_fake().await;
    fake.respond(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({ "error": { "message": "backend busy", "status": "UNAVAILABLE" } }),
    )
    .respond(StatusCode::TOO_MANY_REQUESTS, json!({ "error": { "message": "slow down" } }))
    .respond(StatusCode::OK, json!({ "translations": [{ "translatedText": "Hola" }] }));

    let translated = client_for(&base_url).translate(translate_request(None)).await.unwrap();

    assert_eq!(translated, "Hola");
    assert_eq!(fake.requests().len(), 3);
}

#[tokio::test]
async fn test_translate_withPersistentServerError_shouldGiveUpAfterRetries() {
    let (fake, base_url) = start_fake().await;
    for _ in 0..3 {
        fake.respond(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": { "message": "boom", "status": "INTERNAL" } }),
        );
    }

    let error = client_for(&base_url).translate(translate_request(None)).await.unwrap_err();

    match error {
        ProviderError::ApiError { status_code, message } => {
            assert_eq!(status_code, 500);
            assert_eq!(message, "INTERNAL: boom");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
    assert_eq!(fake.requests().len(), 3);
}

#[tokio::test]
async fn test_translate_withClientError_shouldNotRetry() {
    let (fake, base_url) = start_fake().await;
    fake.respond(
        StatusCode::BAD_REQUEST,
        json!({ "error": { "message": "Target language is invalid.", "status": "INVALID_ARGUMENT" } }),
    );

    let error = client_for(&base_url).translate(translate_request(None)).await.unwrap_err();

    assert!(matches!(error, ProviderError::ApiError { status_code: 400, .. }));
    assert_eq!(fake.requests().len(), 1);
}

#[tokio::test]
async fn test_translate_withRejectedKey_shouldBeAuthenticationError() {
    let (fake, base_url) = start_fake().await;
    fake.respond(
        StatusCode::FORBIDDEN,
        json!({ "error": { "message": "API key not valid.", "status": "PERMISSION_DENIED" } }),
    );

    let error = client_for(&base_url).translate(translate_request(None)).await.unwrap_err();

    assert!(matches!(error, ProviderError::AuthenticationError(_)));
    assert_eq!(fake.requests().len(), 1);
}

#[tokio::test]
async fn test_translate_withUnreachableEndpoint_shouldBeConnectionError() {
    common::init_logging();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let error = client_for(&format!("http://{}", addr))
        .translate(translate_request(None))
        .await
        .unwrap_err();

    assert!(matches!(error, ProviderError::ConnectionError(_)));
}

#[tokio::test]
async fn test_detectText_shouldSendBase64ImageAndReturnFirstAnnotation() {
    let (fake, base_url) = start_fake().await;
    fake.respond(
        StatusCode::OK,
        json!({ "responses": [{ "textAnnotations": [
            { "description": "EXIT\nSALIDA" },
            { "description": "EXIT" }
        ] }] }),
    );

    let text = client_for(&base_url).detect_text(b"png-bytes".to_vec()).await.unwrap();

    assert_eq!(text, "EXIT\nSALIDA");
    let request = &fake.requests()[0];
    assert_eq!(request.path_and_query, "/v1/images:annotate");
    assert_eq!(request.body["requests"][0]["image"]["content"], BASE64.encode(b"png-bytes"));
    assert_eq!(request.body["requests"][0]["features"][0]["type"], "TEXT_DETECTION");
}

#[tokio::test]
async fn test_detectText_withoutAnnotations_shouldBeEmpty() {
    let (fake, base_url) = start_fake().await;
    fake.respond(StatusCode::OK, json!({ "responses": [{}] }));

    let text = client_for(&base_url).detect_text(b"blank".to_vec()).await.unwrap();

    assert_eq!(text, "");
}

#[tokio::test]
async fn test_detectText_withImageError_shouldFail() {
    let (fake, base_url) = start_fake().await;
    fake.respond(
        StatusCode::OK,
        json!({ "responses": [{ "error": { "code": 3, "message": "Bad image data." } }] }),
    );

    let error = client_for(&base_url).detect_text(b"junk".to_vec()).await.unwrap_err();

    assert!(matches!(error, ProviderError::RequestFailed(message) if message.contains("Bad image data.")));
}

#[tokio::test]
async fn test_recognizeSpeech_shouldJoinResultsAndPickEncoding() {
    let (fake, base_url) = start_fake().await;
    fake.respond(
        StatusCode::OK,
        json!({ "results": [
            { "alternatives": [{ "transcript": "good morning" }, { "transcript": "could morning" }] },
            { "alternatives": [{ "transcript": " everyone " }] }
        ] }),
    );

    let transcript = client_for(&base_url)
        .recognize_speech(RecognitionRequest {
            audio: b"amr".to_vec(),
            language_code: "en-US".to_string(),
            content_type: Some("audio/AMR-WB; rate=16000".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(transcript, "good morning everyone");
    let request = &fake.requests()[0];
    assert_eq!(request.path_and_query, "/v1/speech:recognize");
    assert_eq!(request.body["config"]["encoding"], "AMR_WB");
    assert_eq!(request.body["config"]["sampleRateHertz"], 16000);
    assert_eq!(request.body["config"]["languageCode"], "en-US");
    assert_eq!(request.body["audio"]["content"], BASE64.encode(b"amr"));
}

#[tokio::test]
async fn test_recognizeSpeech_withNoResults_shouldBeEmpty() {
    let (fake, base_url) = start_fake().await;
    fake.respond(StatusCode::OK, json!({}));

    let transcript = client_for(&base_url)
        .recognize_speech(RecognitionRequest {
            audio: b"silence".to_vec(),
            language_code: "en-US".to_string(),
            content_type: None,
        })
        .await
        .unwrap();

    assert_eq!(transcript, "");
    assert_eq!(fake.requests()[0].body["config"]["encoding"], "LINEAR16");
}

#[tokio::test]
async fn test_synthesizeSpeech_shouldDecodeAudio() {
    let (fake, base_url) = start_fake().await;
    fake.respond(StatusCode::OK, json!({ "audioContent": BASE64.encode(b"ID3-audio") }));

    let audio = client_for(&base_url)
        .synthesize_speech(SynthesisRequest {
            text: "Hola".to_string(),
            language_code: "es-ES".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(audio, b"ID3-audio");
    let request = &fake.requests()[0];
    assert_eq!(request.path_and_query, "/v1/text:synthesize");
    assert_eq!(request.body["voice"]["languageCode"], "es-ES");
    assert_eq!(request.body["voice"]["ssmlGender"], "NEUTRAL");
    assert_eq!(request.body["audioConfig"]["audioEncoding"], "MP3");
}

#[tokio::test]
async fn test_synthesizeSpeech_withMissingVoice_shouldBeUnsupportedVoice() {
    let (fake, base_url) = start_fake().await;
    fake.respond(
        StatusCode::BAD_REQUEST,
        json!({ "error": {
            "code": 400,
            "message": "Voice 'la-XX-Standard-A' does not exist.",
            "status": "INVALID_ARGUMENT"
        } }),
    );

    let error = client_for(&base_url)
        .synthesize_speech(SynthesisRequest {
            text: "Salve".to_string(),
            language_code: "la".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(error, ProviderError::UnsupportedVoice(_)));
}

#[tokio::test]
async fn test_cloudService_withMissingVoice_shouldReportUnavailable() {
    let (fake, base_url) = start_fake().await;
    fake.respond(
        StatusCode::BAD_REQUEST,
        json!({ "error": {
            "message": "Requested language code la is not supported.",
            "status": "INVALID_ARGUMENT"
        } }),
    );
    let service = CloudService::new(Arc::new(client_for(&base_url)));

    let outcome = service.text_to_speech("Salve", "la").await.unwrap();

    assert_eq!(outcome, TtsOutcome::Unavailable);
}

#[tokio::test]
async fn test_testConnection_shouldListVoices() {
    let (fake, base_url) = start_fake().await;
    fake.respond(StatusCode::OK, json!({ "voices": [] }));

    client_for(&base_url).test_connection().await.unwrap();

    let request = &fake.requests()[0];
    assert_eq!(request.method, "GET");
    assert_eq!(request.path_and_query, "/v1/voices?languageCode=en-US");
}
