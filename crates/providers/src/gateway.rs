//! The Gateway: one entry point for chat, streamed chat and embeddings
//! across every supported provider.

use crate::adapter::adapter_for;
use crate::embedding::EmbeddingClient;
use crate::sse::DeltaStream;
use crate::transport::{HttpTransport, map_stream_error, read_body};
use futures::TryStreamExt;
use sydia_config::HttpConfig;
use sydia_core::error::GatewayError;
use sydia_core::message::ChatTurn;
use sydia_core::provider::{EmbeddingVector, ProviderConfig};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Gateway {
    transport: HttpTransport,
    embeddings: EmbeddingClient,
}

impl Gateway {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            embeddings: EmbeddingClient::new(transport.clone()),
            transport,
        }
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, GatewayError> {
        Ok(Self::new(HttpTransport::new(config)?))
    }

    /// Send the turns and wait for the complete reply.
    pub async fn chat(&self, config: &ProviderConfig, turns: &[ChatTurn]) -> Result<String, GatewayError> {
        let kind = config.kind()?;
        let adapter = adapter_for(kind);
        let request = adapter.build_chat_request(config, turns, false);

        debug!(
            provider = %kind,
            model = %config.model,
            url = %request.redacted_url(),
            turns = turns.len(),
            "Sending chat request"
        );

        let response = self.transport.send(&request).await?;
        let body = read_body(kind, response).await?;
        let text = adapter.parse_non_stream_body(&body)?;

        info!(provider = %kind, model = %config.model, chars = text.len(), "Chat reply received");
        Ok(text)
    }

    /// Send the turns and return the reply as a lazy stream of fragments.
    ///
    /// A non-2xx status fails here, before any fragment is yielded.
    pub async fn chat_stream(
        &self,
        config: &ProviderConfig,
        turns: &[ChatTurn],
    ) -> Result<DeltaStream, GatewayError> {
        let kind = config.kind()?;
        let request = adapter_for(kind).build_chat_request(config, turns, true);

        debug!(
            provider = %kind,
            model = %config.model,
            url = %request.redacted_url(),
            turns = turns.len(),
            "Sending streaming chat request"
        );

        let response = self.transport.send(&request).await?;
        let bytes = response.bytes_stream().map_err(map_stream_error);
        Ok(DeltaStream::new(kind, bytes))
    }

    pub async fn embed(&self, config: &ProviderConfig, text: &str) -> Result<EmbeddingVector, GatewayError> {
        self.embeddings.embed(config, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway() -> Gateway {
        Gateway::from_config(&HttpConfig::default()).unwrap()
    }

    fn config(provider: &str, model: &str, base_url: &str) -> ProviderConfig {
        ProviderConfig::new(provider, model, "test-key", base_url)
    }

    fn sse(events: &[serde_json::Value], done: bool) -> String {
        let mut body: String = events.iter().map(|e| format!("data: {e}\n\n")).collect();
        if done {
            body.push_str("data: [DONE]\n\n");
        }
        body
    }

    #[tokio::test]
    async fn openai_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"model": "gpt-4o-mini", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi from OpenAI"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config("OpenAI", "gpt-4o-mini", &format!("{}/v1/", server.uri()));
        let reply = gateway().chat(&cfg, &[ChatTurn::user("hello")]).await.unwrap();
        assert_eq!(reply, "Hi from OpenAI");
    }

    #[tokio::test]
    async fn gemini_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "Hi from Gemini"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config("gemini", "gemini-1.5-flash", &format!("{}/v1beta", server.uri()));
        let reply = gateway().chat(&cfg, &[ChatTurn::user("hello")]).await.unwrap();
        assert_eq!(reply, "Hi from Gemini");
    }

    #[tokio::test]
    async fn claude_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({"system": "Be brief", "max_tokens": 1024})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "Hi from Claude"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config("Claude", "claude-3-haiku-20240307", &format!("{}/v1/", server.uri()));
        let turns = [ChatTurn::system("Be brief"), ChatTurn::user("hello")];
        assert_eq!(gateway().chat(&cfg, &turns).await.unwrap(), "Hi from Claude");
    }

    #[tokio::test]
    async fn server_error_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let cfg = config("OpenAI", "gpt-4o-mini", &server.uri());
        let err = gateway().chat(&cfg, &[ChatTurn::user("hello")]).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Transport {
                status: 500,
                body: "upstream exploded".into()
            }
        );
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn empty_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let cfg = config("Claude", "claude-3-haiku-20240307", &server.uri());
        let err = gateway().chat(&cfg, &[ChatTurn::user("hello")]).await.unwrap_err();
        assert_eq!(err, GatewayError::EmptyBody { provider: "claude".into() });
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let cfg = config("OpenAI", "gpt-4o-mini", &server.uri());
        let err = gateway().chat(&cfg, &[ChatTurn::user("hello")]).await.unwrap_err();
        assert!(matches!(err, GatewayError::Parse(_)));
    }

    #[tokio::test]
    async fn trailing_slash_on_base_url_is_irrelevant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "same"}}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let gw = gateway();
        for base in [format!("{}/v1", server.uri()), format!("{}/v1/", server.uri())] {
            let cfg = config("openai", "gpt-4o-mini", &base);
            assert_eq!(gw.chat(&cfg, &[ChatTurn::user("x")]).await.unwrap(), "same");
        }
    }

    #[tokio::test]
    async fn openai_stream() {
        let server = MockServer::start().await;
        let body = sse(
            &[
                json!({"choices": [{"delta": {"role": "assistant"}}]}),
                json!({"choices": [{"delta": {"content": "Hel"}}]}),
                json!({"choices": [{"delta": {"content": "lo"}}]}),
            ],
            true,
        );
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("accept", "text/event-stream"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config("OpenAI", "gpt-4o-mini", &format!("{}/v1/", server.uri()));
        let stream = gateway().chat_stream(&cfg, &[ChatTurn::user("hello")]).await.unwrap();
        let deltas: Vec<String> = stream.map(|d| d.unwrap().into_string()).collect().await;
        assert_eq!(deltas, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn claude_stream() {
        let server = MockServer::start().await;
        let body = [
            "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n\n",
            "event: ping\ndata: {\"type\":\"ping\"}\n\n",
            "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Bon\"}}\n\n",
            "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"jour\"}}\n\n",
            "event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
        ]
        .concat();
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let cfg = config("claude", "claude-3-haiku-20240307", &server.uri());
        let text = gateway()
            .chat_stream(&cfg, &[ChatTurn::user("hello")])
            .await
            .unwrap()
            .collect_text()
            .await
            .unwrap();
        assert_eq!(text, "Bonjour");
    }

    #[tokio::test]
    async fn gemini_stream_uses_generate_content() {
        let server = MockServer::start().await;
        let body = sse(
            &[
                json!({"candidates": [{"content": {"parts": [{"text": "Ciao"}]}}]}),
                json!({"candidates": [{"content": {"parts": [{"text": "!"}]}}]}),
            ],
            false,
        );
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config("Gemini", "gemini-1.5-flash", &server.uri());
        let text = gateway()
            .chat_stream(&cfg, &[ChatTurn::user("hello")])
            .await
            .unwrap()
            .collect_text()
            .await
            .unwrap();
        assert_eq!(text, "Ciao!");
    }

    #[tokio::test]
    async fn stream_error_status_fails_before_first_delta() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let cfg = config("OpenAI", "gpt-4o-mini", &server.uri());
        let err = gateway()
            .chat_stream(&cfg, &[ChatTurn::user("hello")])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GatewayError::Transport {
                status: 429,
                body: "slow down".into()
            }
        );
    }

    #[tokio::test]
    async fn openai_embedding() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(body_partial_json(json!({"model": "text-embedding-3-small", "input": "remember me"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"index": 0, "embedding": [0.1, 0.2, 0.3]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config("OpenAI", "text-embedding-3-small", &format!("{}/v1", server.uri()));
        let vector = gateway().embed(&cfg, "remember me").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn gemini_embedding() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-embedding-004:embedContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embedding": {"values": [1.0, -1.0]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config("Gemini", "text-embedding-004", &server.uri());
        assert_eq!(gateway().embed(&cfg, "x").await.unwrap(), vec![1.0, -1.0]);
    }

    #[tokio::test]
    async fn unknown_provider_fails_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let gw = gateway();
        let cfg = config("foo", "m", &server.uri());
        let turns = [ChatTurn::user("hello")];

        let expected = GatewayError::Configuration("foo".into());
        assert_eq!(gw.chat(&cfg, &turns).await.unwrap_err(), expected);
        assert_eq!(gw.chat_stream(&cfg, &turns).await.unwrap_err(), expected);
        assert_eq!(gw.embed(&cfg, "x").await.unwrap_err(), expected);
    }

    #[tokio::test]
    async fn claude_embedding_is_unsupported_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cfg = config("Claude", "claude-3-haiku-20240307", &server.uri());
        let err = gateway().embed(&cfg, "x").await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::UnsupportedOperation {
                operation: "embedding".into(),
                provider: "claude".into(),
            }
        );
    }
}
