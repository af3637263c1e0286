//! Agreement endpoints: quote acceptance hands off to the signing provider,
//! and the provider's completion webhook closes the loop.
//!
//! - `POST /api/agreements`: accept a quote, create a signing envelope
//! - `POST /api/agreements/webhook`: HMAC-verified completion callback

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;
use vaulted_core::domain::agreement::{Agreement, AgreementId, AgreementStatus};
use vaulted_core::domain::quote::QuoteId;
use vaulted_db::RepositoryError;
use vaulted_signing::{verify_signature, EnvelopeRequest};

use crate::quotes::{bad_request, internal_error, ApiError, ApiResult, AppState};

/// Version label stamped on every agreement; bump when the legal terms
/// document changes.
pub const TERMS_VERSION: &str = "2026-01";

const SIGNATURE_HEADER: &str = "x-vaulted-signature";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementRequestBody {
    pub session_id: String,
    pub quote_id: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub terms_accepted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementResponse {
    pub agreement_id: String,
    pub envelope_id: String,
    pub signing_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookEvent {
    envelope_id: String,
    status: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

pub async fn create_agreement(
    State(state): State<AppState>,
    Json(body): Json<AgreementRequestBody>,
) -> ApiResult<AgreementResponse> {
    if !body.terms_accepted {
        return Err(bad_request("Terms must be accepted before signing"));
    }
    if body.applicant_name.trim().is_empty() || body.applicant_email.trim().is_empty() {
        return Err(bad_request("Applicant name and email are required"));
    }

    let quote_id = QuoteId(body.quote_id.clone());
    let stored = match state.quotes.find(&quote_id).await {
        Ok(stored) => stored,
        Err(RepositoryError::NotFound) => {
            return Err(bad_request("Quote not found"));
        }
        Err(db_error) => {
            error!(
                event_name = "intake.agreement.quote_lookup_failed",
                quote_id = %quote_id.0,
                error = %db_error,
                "quote lookup failed"
            );
            return Err(internal_error("Failed to load quote"));
        }
    };

    if stored.quote.session_id != body.session_id {
        return Err(bad_request("Quote does not belong to this session"));
    }

    let envelope_request = EnvelopeRequest {
        session_id: body.session_id.clone(),
        quote_id: quote_id.clone(),
        applicant_name: body.applicant_name.clone(),
        applicant_email: body.applicant_email.clone(),
        quote_amount: stored.quote.quote_amount,
        buyback_amount: stored.quote.buyback_amount,
        terms_version: TERMS_VERSION.to_string(),
        return_url: state.return_url.clone(),
    };

    // Envelope creation is user-blocking, so a provider outage surfaces as
    // 502 instead of degrading the way market research does.
    let envelope = state.signing.create_envelope(&envelope_request).await.map_err(|error| {
        error!(
            event_name = "intake.agreement.envelope_failed",
            session_id = %body.session_id,
            quote_id = %quote_id.0,
            error = %error,
            "signing envelope creation failed"
        );
        (
            StatusCode::BAD_GATEWAY,
            Json(ApiError { error: "Signing service is unavailable".to_string() }),
        )
    })?;

    let agreement = Agreement {
        id: AgreementId(format!("agr-{}", Uuid::new_v4())),
        session_id: body.session_id.clone(),
        quote_id,
        applicant_name: body.applicant_name,
        applicant_email: body.applicant_email,
        envelope_id: envelope.envelope_id.clone(),
        signing_url: envelope.signing_url.clone(),
        status: AgreementStatus::Sent,
        terms_version: TERMS_VERSION.to_string(),
        accepted_at: Utc::now(),
        signed_at: None,
    };

    state.agreements.insert(&agreement).await.map_err(|db_error| {
        error!(
            event_name = "intake.agreement.persist_failed",
            session_id = %body.session_id,
            error = %db_error,
            "agreement could not be persisted"
        );
        internal_error("Failed to save agreement")
    })?;

    info!(
        event_name = "intake.agreement.created",
        session_id = %agreement.session_id,
        agreement_id = %agreement.id.0,
        envelope_id = %agreement.envelope_id,
        "agreement handed off for signing"
    );

    Ok((
        StatusCode::CREATED,
        Json(AgreementResponse {
            agreement_id: agreement.id.0,
            envelope_id: agreement.envelope_id,
            signing_url: agreement.signing_url,
        }),
    ))
}

pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<WebhookAck> {
    let unauthorized = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiError { error: "Invalid webhook signature".to_string() }),
        )
    };

    let Some(secret) = state.webhook_secret.as_deref() else {
        warn!(
            event_name = "intake.webhook.no_secret",
            "signing webhook received but no webhook secret is configured"
        );
        return Err(unauthorized());
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(unauthorized)?;

    if !verify_signature(secret, &body, signature) {
        warn!(event_name = "intake.webhook.bad_signature", "webhook signature mismatch");
        return Err(unauthorized());
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|parse_error| bad_request(format!("Invalid webhook payload: {parse_error}")))?;

    match event.status.as_str() {
        "signed" | "completed" => {
            match state.agreements.mark_signed(&event.envelope_id, Utc::now()).await {
                Ok(()) => {
                    info!(
                        event_name = "intake.webhook.agreement_signed",
                        envelope_id = %event.envelope_id,
                        "agreement marked signed"
                    );
                    Ok((StatusCode::OK, Json(WebhookAck { received: true })))
                }
                Err(RepositoryError::NotFound) => Err((
                    StatusCode::NOT_FOUND,
                    Json(ApiError { error: "Unknown envelope".to_string() }),
                )),
                Err(db_error) => {
                    error!(
                        event_name = "intake.webhook.update_failed",
                        envelope_id = %event.envelope_id,
                        error = %db_error,
                        "agreement status update failed"
                    );
                    Err(internal_error("Failed to update agreement"))
                }
            }
        }
        "declined" => match state.agreements.mark_declined(&event.envelope_id).await {
            Ok(()) => {
                info!(
                    event_name = "intake.webhook.agreement_declined",
                    envelope_id = %event.envelope_id,
                    "agreement marked declined"
                );
                Ok((StatusCode::OK, Json(WebhookAck { received: true })))
            }
            Err(RepositoryError::NotFound) => Err((
                StatusCode::NOT_FOUND,
                Json(ApiError { error: "Unknown envelope".to_string() }),
            )),
            Err(db_error) => {
                error!(
                    event_name = "intake.webhook.update_failed",
                    envelope_id = %event.envelope_id,
                    error = %db_error,
                    "agreement status update failed"
                );
                Err(internal_error("Failed to update agreement"))
            }
        },
        other => {
            // Intermediate provider events (delivered, viewed) are
            // acknowledged but leave the stored agreement untouched.
            info!(
                event_name = "intake.webhook.ignored_status",
                envelope_id = %event.envelope_id,
                status = %other,
                "webhook event does not change agreement state"
            );
            Ok((StatusCode::OK, Json(WebhookAck { received: true })))
        }
    }
}
