//! Outbound calls to the hosted generative-language API.
//!
//! [`ConversationBackend`] is the seam the controller talks to. The
//! production implementation, [`GeminiService`], issues exactly one HTTP
//! request per call: no caching, no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use vasstos_core::config::ApiConfig;
use vasstos_core::locale;
use vasstos_core::types::{ConversationConfig, ConversationResult, Language, Message, Role};

use crate::error::ChatError;
use crate::gemini::{
    ApiErrorBody, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    SpeechConfig, Tool,
};
use crate::parser::parse_reply;
use crate::persona::persona_instructions;

/// Longest slice of an upstream error body written to the log.
const MAX_LOGGED_BODY: usize = 500;

// =============================================================================
// Trait
// =============================================================================

/// A source of assistant replies and speech audio.
#[async_trait]
pub trait ConversationBackend: Send + Sync {
    /// Generate the next assistant reply for `history`.
    ///
    /// Fails with [`ChatError::Upstream`] when the call errors or times out.
    async fn generate_reply(
        &self,
        history: &[Message],
        config: &ConversationConfig,
    ) -> Result<ConversationResult, ChatError>;

    /// Synthesize `text` as raw 24 kHz 16-bit PCM.
    ///
    /// Failures are logged and reported as `None`.
    async fn synthesize_speech(&self, text: &str, language: Language) -> Option<Vec<u8>>;
}

// =============================================================================
// GeminiService
// =============================================================================

pub struct GeminiService {
    client: Client,
    base_url: String,
    api_key: String,
    text_model: String,
    tts_model: String,
    voice_name: String,
}

impl GeminiService {
    /// Build a service from the `[api]` config section and a resolved key.
    pub fn new(api: &ApiConfig, api_key: impl Into<String>) -> Result<Self, ChatError> {
        let mut builder = Client::builder();
        if let Some(secs) = api.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ChatError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            text_model: api.text_model.clone(),
            tts_model: api.tts_model.clone(),
            voice_name: api.voice_name.clone(),
        })
    }

    /// Request body for a reply call.
    pub fn build_reply_request(
        history: &[Message],
        config: &ConversationConfig,
    ) -> GenerateContentRequest {
        let contents = history
            .iter()
            .filter_map(|msg| {
                let role = match msg.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                    Role::System => return None,
                };
                Some(Content::text(Some(role), msg.content.clone()))
            })
            .collect();

        let tools = if config.use_search {
            vec![Tool::default()]
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            contents,
            system_instruction: Some(Content::text(
                None,
                persona_instructions(config.variant, config.language, config.use_search),
            )),
            tools,
            generation_config: Some(GenerationConfig {
                temperature: Some(config.variant.temperature()),
                ..GenerationConfig::default()
            }),
        }
    }

    /// Request body for a speech call.
    pub fn build_speech_request(&self, text: &str, language: Language) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::text(None, locale::speech_prompt(language, text))],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::prebuilt(&self.voice_name)),
                ..GenerationConfig::default()
            }),
            ..GenerateContentRequest::default()
        }
    }

    async fn post(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ChatError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        tracing::debug!(model, turns = body.contents.len(), "Sending generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() { "timed out" } else { "failed" };
                tracing::error!(model, error = %e, "Request {}", kind);
                ChatError::Upstream(format!("request {}", kind))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| truncate(&text, MAX_LOGGED_BODY).to_string());
            tracing::error!(model, status = status.as_u16(), detail = %detail, "API error");
            return Err(ChatError::Upstream(format!("API error {}", status.as_u16())));
        }

        response.json::<GenerateContentResponse>().await.map_err(|e| {
            tracing::error!(model, error = %e, "Malformed response body");
            ChatError::Upstream("malformed response body".to_string())
        })
    }

    async fn try_synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>, ChatError> {
        let body = self.build_speech_request(text, language);
        let response = self
            .post(&self.tts_model, &body)
            .await
            .map_err(|e| ChatError::Synthesis(e.to_string()))?;
        let data = response
            .inline_audio()
            .ok_or_else(|| ChatError::Synthesis("response carried no audio".to_string()))?;
        vasstos_audio::decode_base64(data).map_err(|e| ChatError::Synthesis(e.to_string()))
    }
}

#[async_trait]
impl ConversationBackend for GeminiService {
    async fn generate_reply(
        &self,
        history: &[Message],
        config: &ConversationConfig,
    ) -> Result<ConversationResult, ChatError> {
        let body = Self::build_reply_request(history, config);
        let response = self.post(&self.text_model, &body).await?;
        let result = parse_reply(&response, config.language);
        tracing::info!(
            sources = result.sources.len(),
            suggestions = result.suggestions.len(),
            "Reply received"
        );
        Ok(result)
    }

    async fn synthesize_speech(&self, text: &str, language: Language) -> Option<Vec<u8>> {
        match self.try_synthesize(text, language).await {
            Ok(bytes) => {
                tracing::debug!(bytes = bytes.len(), "Speech synthesized");
                Some(bytes)
            }
            Err(e) => {
                tracing::warn!(error = %e, "TTS failed");
                None
            }
        }
    }
}

/// Cut `s` to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vasstos_core::types::Variant;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: format!("{}/v1beta", base_url),
            text_model: "text-model".to_string(),
            tts_model: "tts-model".to_string(),
            ..ApiConfig::default()
        }
    }

    fn history() -> Vec<Message> {
        vec![
            Message::assistant("Bem-vindo"),
            Message::user("Quais serviços?"),
        ]
    }

    // ---- request building ----

    #[test]
    fn test_reply_request_maps_roles_in_order() {
        let mut msgs = history();
        msgs.push(Message::new(Role::System, "internal note"));
        msgs.push(Message::user("E preços?"));
        let req = GeminiService::build_reply_request(&msgs, &ConversationConfig::default());
        let roles: Vec<_> = req
            .contents
            .iter()
            .map(|c| c.role.as_deref().unwrap())
            .collect();
        assert_eq!(roles, vec!["model", "user", "user"]);
        assert_eq!(req.contents[2].parts[0].text.as_deref(), Some("E preços?"));
    }

    #[test]
    fn test_reply_request_search_toggle() {
        let on = ConversationConfig::default();
        let off = ConversationConfig {
            use_search: false,
            ..ConversationConfig::default()
        };
        let with = GeminiService::build_reply_request(&history(), &on);
        let without = GeminiService::build_reply_request(&history(), &off);
        assert_eq!(with.tools.len(), 1);
        assert!(without.tools.is_empty());

        let instruction = |r: &GenerateContentRequest| {
            r.system_instruction.as_ref().unwrap().parts[0]
                .text
                .clone()
                .unwrap()
        };
        assert!(instruction(&with).contains("site:vasstos.com"));
        assert!(!instruction(&without).contains("site:vasstos.com"));
    }

    #[test]
    fn test_reply_request_uses_variant_temperature() {
        for variant in [Variant::KnowledgeBase, Variant::Concierge, Variant::Support] {
            let config = ConversationConfig {
                variant,
                ..ConversationConfig::default()
            };
            let req = GeminiService::build_reply_request(&history(), &config);
            assert_eq!(
                req.generation_config.unwrap().temperature,
                Some(variant.temperature())
            );
        }
    }

    #[test]
    fn test_speech_request_shape() {
        let service = GeminiService::new(&ApiConfig::default(), "key").unwrap();
        let req = service.build_speech_request("Olá", Language::Pt);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"parts": [{"text": "Diga com clareza e autoridade: Olá"}]}],
                "generationConfig": {
                    "responseModalities": ["AUDIO"],
                    "speechConfig": {"voiceConfig": {"prebuiltVoiceConfig": {"voiceName": "Kore"}}}
                }
            })
        );
    }

    #[test]
    fn test_truncate_char_boundary() {
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("ação", 2), "a");
        assert_eq!(truncate("abcdef", 3), "abc");
    }

    // ---- HTTP ----

    #[tokio::test]
    async fn test_generate_reply_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/text-model:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .and(body_partial_json(json!({"tools": [{"googleSearch": {}}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Oferecemos IA. <suggestions>Preços|Cases</suggestions>"}]},
                    "groundingMetadata": {"groundingChunks": [
                        {"web": {"uri": "", "title": "Sem link"}},
                        {"web": {"uri": "https://vasstos.com/ia"}}
                    ]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = GeminiService::new(&api_config(&server.uri()), "secret").unwrap();
        let result = service
            .generate_reply(&history(), &ConversationConfig::default())
            .await
            .unwrap();

        assert_eq!(result.text, "Oferecemos IA.");
        assert_eq!(result.suggestions, vec!["Preços", "Cases"]);
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].title, "Base de Conhecimento");
    }

    #[tokio::test]
    async fn test_generate_reply_sends_history_and_persona() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "contents": [
                    {"role": "model", "parts": [{"text": "Bem-vindo"}]},
                    {"role": "user", "parts": [{"text": "Quais serviços?"}]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = GeminiService::new(&api_config(&server.uri()), "k").unwrap();
        let config = ConversationConfig {
            use_search: false,
            ..ConversationConfig::default()
        };
        let result = service.generate_reply(&history(), &config).await.unwrap();
        assert_eq!(result.text, "ok");
        assert!(result.sources.is_empty());
        assert!(result.suggestions.is_empty());

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("VASSTOS"));
    }

    #[tokio::test]
    async fn test_generate_reply_empty_text_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let service = GeminiService::new(&api_config(&server.uri()), "k").unwrap();
        let config = ConversationConfig {
            language: Language::En,
            ..ConversationConfig::default()
        };
        let result = service.generate_reply(&history(), &config).await.unwrap();
        assert_eq!(result.text, locale::empty_reply(Language::En));
    }

    #[tokio::test]
    async fn test_generate_reply_api_error_is_upstream_without_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"code": 500, "message": "internal secret detail", "status": "INTERNAL"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = GeminiService::new(&api_config(&server.uri()), "k").unwrap();
        let err = service
            .generate_reply(&history(), &ConversationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Upstream(_)));
        assert!(!err.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_generate_reply_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let service = GeminiService::new(&api_config(&server.uri()), "k").unwrap();
        let err = service
            .generate_reply(&history(), &ConversationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_generate_reply_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"candidates": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut api = api_config(&server.uri());
        api.request_timeout_secs = Some(1);
        let service = GeminiService::new(&api, "k").unwrap();
        let err = service
            .generate_reply(&history(), &ConversationConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "upstream error: request timed out");
    }

    #[tokio::test]
    async fn test_generate_reply_unreachable() {
        // Nothing listens on port 9 of localhost.
        let service = GeminiService::new(&api_config("http://127.0.0.1:9"), "k").unwrap();
        let err = service
            .generate_reply(&history(), &ConversationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_synthesize_speech_decodes_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/tts-model:generateContent"))
            .and(body_partial_json(json!({
                "generationConfig": {"responseModalities": ["AUDIO"]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "audio/L16", "data": "AIAAAA=="}}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = GeminiService::new(&api_config(&server.uri()), "k").unwrap();
        let bytes = service.synthesize_speech("Olá", Language::Pt).await;
        assert_eq!(bytes, Some(vec![0x00, 0x80, 0x00, 0x00]));
    }

    #[tokio::test]
    async fn test_synthesize_speech_failures_are_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/tts-model:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "no audio here"}]}}]
            })))
            .mount(&server)
            .await;

        let service = GeminiService::new(&api_config(&server.uri()), "k").unwrap();
        assert!(service.synthesize_speech("Hi", Language::En).await.is_none());

        let down = GeminiService::new(&api_config("http://127.0.0.1:9"), "k").unwrap();
        assert!(down.synthesize_speech("Hi", Language::En).await.is_none());
    }

    #[tokio::test]
    async fn test_synthesize_speech_bad_base64_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"inlineData": {"data": "%%%"}}]}}]
            })))
            .mount(&server)
            .await;

        let service = GeminiService::new(&api_config(&server.uri()), "k").unwrap();
        assert!(service.synthesize_speech("Hi", Language::En).await.is_none());
    }
}
