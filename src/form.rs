//! The newsletter form: its state and the submit/reset transitions.

use crate::{
    domain::SubscriberEmail,
    subscription_client::{SubscribeError, SubscriptionClient},
};
use derive_getters::Getters;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Snapshot of everything the form renders.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct FormState {
    email: String,
    submitted: bool,
    loading: bool,
    /// Empty when there is no error to show.
    error: String,
    subscriber_count: u64,
}

impl FormState {
    fn new(subscriber_count: u64) -> Self {
        Self {
            email: String::new(),
            submitted: false,
            loading: false,
            error: String::new(),
            subscriber_count,
        }
    }

    pub fn view(&self) -> FormView {
        if self.submitted {
            FormView::Confirmed
        } else {
            FormView::Entry
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormView {
    Entry,
    Confirmed,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Confirmed,
    Failed(SubscribeError),
    /// Nothing happened: the email was empty, a submission was already in
    /// flight, or the form was showing the confirmation.
    Ignored,
}

/// Owns the state of one form and drives it through submissions.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Debug, Clone)]
pub struct FormController {
    state: Arc<Mutex<FormState>>,
    client: Arc<SubscriptionClient>,
}

impl FormController {
    pub fn new(client: Arc<SubscriptionClient>, subscriber_count: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(FormState::new(subscriber_count))),
            client,
        }
    }

    pub async fn snapshot(&self) -> FormState {
        self.state.lock().await.clone()
    }

    /// Update the email text. There is no input while the confirmation is
    /// shown, so updates are dropped in that state.
    pub async fn set_email(&self, email: String) {
        let mut state = self.state.lock().await;
        if !state.submitted {
            state.email = email;
        }
    }

    /// Submit the current email to the newsletter API.
    ///
    /// The lock is released while the request is in flight, so a concurrent
    /// submit sees `loading` and is ignored.
    #[tracing::instrument(name = "Submitting the newsletter form", skip(self))]
    pub async fn submit(&self) -> SubmitOutcome {
        let email = {
            let mut state = self.state.lock().await;
            if state.loading || state.submitted || state.email.is_empty() {
                tracing::debug!(
                    loading = state.loading,
                    submitted = state.submitted,
                    "Ignoring submit"
                );
                return SubmitOutcome::Ignored;
            }
            state.loading = true;
            state.error.clear();
            state.email.clone()
        };

        let result = match SubscriberEmail::parse(email) {
            Ok(email) => self.client.subscribe(&email).await,
            Err(e) => Err(SubscribeError::InvalidEmail(e)),
        };

        let mut state = self.state.lock().await;
        state.loading = false;
        match result {
            Ok(response) => {
                tracing::info!(%response, "Newsletter subscription successful");
                state.submitted = true;
                state.email.clear();
                SubmitOutcome::Confirmed
            }
            Err(e) => {
                tracing::error!(
                    error.message = %e,
                    error.cause_chain = ?e,
                    "Newsletter subscription failed"
                );
                state.error = e.display_message();
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Go back to the entry form to subscribe another address.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.submitted = false;
        state.error.clear();
    }
}
