use crate::{form::SubmitOutcome, subscription_client::ErrorKind};
use anyhow::Context;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::StatusCode;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Counters for submissions of the newsletter form.
#[derive(Clone)]
pub struct SubscriptionMetrics {
    registry: Arc<Registry>,
    attempts: IntCounter,
    successes: IntCounter,
    failures: IntCounter,
}

impl SubscriptionMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();
        let attempts = register_counter(
            &registry,
            "subscription_attempts_total",
            "Number of subscriptions sent to the newsletter API",
        )?;
        let successes = register_counter(
            &registry,
            "subscription_successes_total",
            "Number of subscriptions accepted by the newsletter API",
        )?;
        let failures = register_counter(
            &registry,
            "subscription_failures_total",
            "Number of form submissions that failed",
        )?;

        Ok(Self {
            registry: Arc::new(registry),
            attempts,
            successes,
            failures,
        })
    }

    /// Count the outcome of a single submit. Ignored submits are not counted,
    /// and only failures that reached the newsletter API count as attempts.
    pub fn record(&self, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Confirmed => {
                self.attempts.inc();
                self.successes.inc();
            }
            SubmitOutcome::Failed(e) => {
                if e.kind() == ErrorKind::Request {
                    self.attempts.inc();
                }
                self.failures.inc();
            }
            SubmitOutcome::Ignored => {}
        }
    }
}

fn register_counter(registry: &Registry, name: &str, help: &str) -> anyhow::Result<IntCounter> {
    let counter =
        IntCounter::new(name, help).with_context(|| format!("Failed to create `{name}` counter"))?;
    registry
        .register(Box::new(counter.clone()))
        .with_context(|| format!("Failed to register `{name}` metric"))?;
    Ok(counter)
}

/// Create a router serving the registry on `/metrics`.
pub fn create_router(metrics: &SubscriptionMetrics) -> Router {
    Router::new().route(
        "/metrics",
        get(metrics_endpoint).with_state(metrics.registry.clone()),
    )
}

#[tracing::instrument(skip(registry))]
async fn metrics_endpoint(State(registry): State<Arc<Registry>>) -> Result<String, MetricsError> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")
        .map_err(MetricsError::UnexpectedError)?;

    String::from_utf8(buffer)
        .context("Failed to convert metrics to a valid string")
        .map_err(MetricsError::UnexpectedError)
}

#[derive(thiserror::Error)]
pub enum MetricsError {
    #[error("Unexpected error when generating metrics")]
    UnexpectedError(#[source] anyhow::Error),
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
