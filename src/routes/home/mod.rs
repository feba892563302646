use crate::{
    form::FormState,
    state::{AppState, FormSession},
};
use askama::Template;
use axum::{response::IntoResponse, routing::get, Router};

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(newsletter_form))
}

/// Render the visitor's newsletter form.
#[tracing::instrument(name = "Newsletter form page", skip(session))]
async fn newsletter_form(session: FormSession) -> impl IntoResponse {
    let page = NewsletterPage::from(session.controller().snapshot().await);
    (session, page)
}

/// Either the entry form or the confirmation, depending on `submitted`.
#[derive(Template)]
#[template(path = "newsletter.html")]
pub struct NewsletterPage {
    email: String,
    error: String,
    submitted: bool,
    loading: bool,
    subscriber_count: String,
}

impl From<FormState> for NewsletterPage {
    fn from(state: FormState) -> Self {
        Self {
            subscriber_count: format_count(*state.subscriber_count()),
            submitted: *state.submitted(),
            loading: *state.loading(),
            email: state.email().clone(),
            error: state.error().clone(),
        }
    }
}

/// Format a count with `,` between each group of three digits.
fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}
