//! Webhook endpoint handler.
//!
//! Verifies the delivery signature, parses the payload, and hands newly
//! created comments to the dispatcher before returning 202 Accepted. Nothing
//! talks to GitHub before the response is sent.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use super::dispatch::CommentJob;
use crate::context::CommentContext;
use crate::types::DeliveryId;
use crate::webhooks::{GitHubEvent, ParseError, SignatureError, parse_webhook, verify_delivery};

const HEADER_EVENT: &str = "x-github-event";
const HEADER_DELIVERY: &str = "x-github-delivery";
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that reject a delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid signature: {0}")]
    InvalidSignature(SignatureError),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),

    /// The dispatcher has shut down.
    #[error("not accepting deliveries")]
    Unavailable,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// - 202 Accepted: queued, or acknowledged and ignored
/// - 400 Bad Request: missing header or malformed payload
/// - 401 Unauthorized: signature mismatch
/// - 503 Service Unavailable: shutting down
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery = DeliveryId::new(get_header(&headers, HEADER_DELIVERY)?);
    let signature = get_header(&headers, HEADER_SIGNATURE)?;

    debug!(delivery_id = %delivery, event_type = %event_type, "Received webhook");

    // Verify before parsing anything.
    if let Err(e) = verify_delivery(&body, Some(&signature), app_state.webhook_secret()) {
        warn!(delivery_id = %delivery, error = %e, "Rejected webhook signature");
        return Err(WebhookError::InvalidSignature(e));
    }

    let event = match parse_webhook(&event_type, &body) {
        Ok(event) => event,
        Err(e) => {
            warn!(delivery_id = %delivery, error = %e, "Malformed webhook payload");
            return Err(e.into());
        }
    };

    match event {
        Some(GitHubEvent::IssueComment(comment)) if comment.triggers_rerun() => {
            info!(
                delivery_id = %delivery,
                repo = %comment.repo,
                pr = %comment.issue.number,
                author = %comment.author.login,
                "Accepted comment"
            );
            let job = CommentJob {
                delivery,
                context: CommentContext::from_event(comment),
            };
            app_state
                .jobs()
                .send(job)
                .map_err(|_| WebhookError::Unavailable)?;
            Ok((StatusCode::ACCEPTED, "Accepted"))
        }
        Some(GitHubEvent::Ping { hook_id }) => {
            info!(delivery_id = %delivery, ?hook_id, "Received ping");
            Ok((StatusCode::ACCEPTED, "Pong"))
        }
        other => {
            debug!(
                delivery_id = %delivery,
                event_type = %event_type,
                repo = ?other.as_ref().and_then(GitHubEvent::repo_id),
                "Ignoring delivery"
            );
            Ok((StatusCode::ACCEPTED, "Ignored"))
        }
    }
}

fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
