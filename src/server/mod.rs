//! HTTP server for webhook deployments.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries (returns 202 Accepted)
//! - `GET /health` - Returns 200 while the server is running
//!
//! Accepted comments are queued for the [`dispatch`] loop, which runs the
//! pipeline on a task per delivery.

use std::sync::Arc;

pub mod dispatch;
pub mod health;
pub mod webhook;

pub use dispatch::{CommentJob, JobReceiver, JobSender, dispatch_jobs, job_channel, run_dispatcher};
pub use health::health_handler;
pub use webhook::webhook_handler;

/// Shared application state, passed to handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Webhook secret for HMAC-SHA256 signature verification.
    webhook_secret: Vec<u8>,

    jobs: JobSender,
}

impl AppState {
    pub fn new(webhook_secret: impl Into<Vec<u8>>, jobs: JobSender) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                webhook_secret: webhook_secret.into(),
                jobs,
            }),
        }
    }

    pub fn webhook_secret(&self) -> &[u8] {
        &self.inner.webhook_secret
    }

    pub fn jobs(&self) -> &JobSender {
        &self.inner.jobs
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
