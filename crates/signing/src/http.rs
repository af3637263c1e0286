use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::{Envelope, EnvelopeRequest, SigningError, SigningService};

const USER_AGENT: &str = concat!("vaulted-signing/", env!("CARGO_PKG_VERSION"));

pub struct HttpSigningService {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct EnvelopeResponse {
    envelope_id: String,
    signing_url: String,
}

impl HttpSigningService {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, SigningError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| SigningError::Transport(format!("http client build: {error}")))?;

        Ok(Self { client, base_url: base_url.into(), api_key: api_key.into() })
    }
}

#[async_trait]
impl SigningService for HttpSigningService {
    async fn create_envelope(&self, request: &EnvelopeRequest) -> Result<Envelope, SigningError> {
        let url = format!("{}/envelopes", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|error| SigningError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SigningError::Status(status.as_u16()));
        }

        let payload: EnvelopeResponse =
            response.json().await.map_err(|error| SigningError::Decode(error.to_string()))?;

        info!(
            event_name = "signing.envelope.created",
            session_id = %request.session_id,
            quote_id = %request.quote_id.0,
            envelope_id = %payload.envelope_id,
            "signing envelope created"
        );

        Ok(Envelope { envelope_id: payload.envelope_id, signing_url: payload.signing_url })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use vaulted_core::domain::quote::QuoteId;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::{EnvelopeRequest, SigningError, SigningService};

    use super::HttpSigningService;

    fn request() -> EnvelopeRequest {
        EnvelopeRequest {
            session_id: "sess-sign-1".to_string(),
            quote_id: QuoteId("vq-123".to_string()),
            applicant_name: "Dana Seller".to_string(),
            applicant_email: "dana@example.com".to_string(),
            quote_amount: Decimal::new(1400, 0),
            buyback_amount: Decimal::new(1540, 0),
            terms_version: "2026-01".to_string(),
            return_url: "https://vaulted.example.com/agreements/complete".to_string(),
        }
    }

    #[tokio::test]
    async fn create_envelope_posts_the_request_and_decodes_the_envelope() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/envelopes"))
            .and(header("authorization", "Bearer test-signing-key"))
            .and(body_partial_json(json!({
                "session_id": "sess-sign-1",
                "quote_id": "vq-123",
                "applicant_email": "dana@example.com"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "envelope_id": "env-789",
                "signing_url": "https://sign.example.com/env-789"
            })))
            .mount(&server)
            .await;

        let service =
            HttpSigningService::new(server.uri(), "test-signing-key", 5).expect("build service");
        let envelope = service.create_envelope(&request()).await.expect("envelope created");

        assert_eq!(envelope.envelope_id, "env-789");
        assert_eq!(envelope.signing_url, "https://sign.example.com/env-789");
    }

    #[tokio::test]
    async fn upstream_failure_is_reported_with_its_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/envelopes"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let service =
            HttpSigningService::new(server.uri(), "test-signing-key", 5).expect("build service");
        let error = service.create_envelope(&request()).await.unwrap_err();

        assert!(matches!(error, SigningError::Status(502)));
    }

    #[tokio::test]
    async fn malformed_response_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/envelopes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
            .mount(&server)
            .await;

        let service =
            HttpSigningService::new(server.uri(), "test-signing-key", 5).expect("build service");
        let error = service.create_envelope(&request()).await.unwrap_err();

        assert!(matches!(error, SigningError::Decode(_)));
    }
}
