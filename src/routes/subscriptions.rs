use crate::{
    form::SubmitOutcome,
    metrics::SubscriptionMetrics,
    routes::home::NewsletterPage,
    state::{AppState, FormSession},
};
use axum::{extract::State, response::IntoResponse, routing::post, Form, Router};

#[derive(Debug, serde::Deserialize)]
struct FormData {
    #[serde(default)]
    email: String,
}

/// Create a router to serve endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(subscribe))
        .route("/reset", post(reset))
}

/// Submit the visitor's form with the given email.
#[tracing::instrument(
    name = "Subscribing to the newsletter",
    skip(form, session, metrics),
    fields(subscriber_email = %form.email)
)]
async fn subscribe(
    State(metrics): State<SubscriptionMetrics>,
    session: FormSession,
    Form(form): Form<FormData>,
) -> impl IntoResponse {
    let controller = session.controller();
    controller.set_email(form.email).await;

    let outcome = controller.submit().await;
    metrics.record(&outcome);
    if let SubmitOutcome::Ignored = outcome {
        tracing::info!("Submission ignored");
    }

    let page = NewsletterPage::from(controller.snapshot().await);
    (session, page)
}

/// Go back to the entry form to subscribe another email.
#[tracing::instrument(name = "Resetting the newsletter form", skip(session))]
async fn reset(session: FormSession) -> impl IntoResponse {
    session.controller().reset().await;

    let page = NewsletterPage::from(session.controller().snapshot().await);
    (session, page)
}
