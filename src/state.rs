mod session;

pub use session::{FormSession, FormSessions};

use crate::{metrics::SubscriptionMetrics, subscription_client::SubscriptionClient};
use axum::extract::FromRef;
use derive_getters::Getters;
use duplicate::duplicate_item;
use std::{sync::Arc, time::Duration};

#[derive(Clone, Getters)]
pub struct AppState {
    sessions: Arc<FormSessions>,
    metrics: SubscriptionMetrics,
}

impl AppState {
    pub fn create(
        subscription_client: SubscriptionClient,
        subscriber_count: u64,
        session_idle_timeout: Duration,
        metrics: SubscriptionMetrics,
    ) -> Self {
        Self {
            sessions: Arc::new(FormSessions::new(
                Arc::new(subscription_client),
                subscriber_count,
                session_idle_timeout,
            )),
            metrics,
        }
    }
}

#[duplicate_item(
    service_type                field;
    [ Arc<FormSessions> ]       [ sessions ];
    [ SubscriptionMetrics ]     [ metrics ];
)]
impl FromRef<AppState> for service_type {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.field.clone()
    }
}
