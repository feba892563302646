use crate::{form::FormController, state::AppState, subscription_client::SubscriptionClient};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::{
    collections::HashMap,
    convert::Infallible,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use uuid::Uuid;

const SESSION_COOKIE: &str = "newsletter_form";

/// Every visitor gets their own form, identified by a cookie. Forms of
/// visitors not seen for `idle_timeout` are dropped.
#[derive(Debug)]
pub struct FormSessions {
    client: Arc<SubscriptionClient>,
    subscriber_count: u64,
    idle_timeout: Duration,
    forms: Mutex<HashMap<Uuid, SessionEntry>>,
}

#[derive(Debug)]
struct SessionEntry {
    form: FormController,
    last_seen: Instant,
}

impl FormSessions {
    pub fn new(
        client: Arc<SubscriptionClient>,
        subscriber_count: u64,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            client,
            subscriber_count,
            idle_timeout,
            forms: Mutex::new(HashMap::new()),
        }
    }

    /// Get the form of the given visitor, creating an empty one if this is
    /// the first time they are seen or their form has expired.
    pub async fn get_or_create(&self, id: Uuid) -> FormController {
        let now = Instant::now();
        let mut forms = self.forms.lock().await;

        if let Some(entry) = forms.get_mut(&id) {
            if now.duration_since(entry.last_seen) < self.idle_timeout {
                entry.last_seen = now;
                return entry.form.clone();
            }
        }

        let before = forms.len();
        forms.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_timeout);
        let evicted = before - forms.len();

        let form = FormController::new(self.client.clone(), self.subscriber_count);
        forms.insert(
            id,
            SessionEntry {
                form: form.clone(),
                last_seen: now,
            },
        );
        tracing::debug!(
            session_id = %id,
            active_forms = forms.len(),
            evicted_forms = evicted,
            "Created a new form session"
        );
        form
    }
}

/// The form belonging to the visitor of the current request.
/// Note that this **MUST** be returned as part of the response, so a newly
/// issued session cookie reaches the browser.
pub struct FormSession {
    controller: FormController,
    cookie_jar: CookieJar,
}

impl FormSession {
    pub fn controller(&self) -> &FormController {
        &self.controller
    }
}

impl IntoResponseParts for FormSession {
    type Error = <CookieJar as IntoResponseParts>::Error;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.cookie_jar.into_response_parts(res)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for FormSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        tracing::trace!("Extracting form session from request");
        let cookie_jar = CookieJar::from_headers(&parts.headers);
        let known_id = cookie_jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());

        let (id, cookie_jar) = match known_id {
            Some(id) => (id, cookie_jar),
            None => {
                let id = Uuid::new_v4();
                let cookie = Cookie::build(SESSION_COOKIE, id.to_string())
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .finish();
                (id, cookie_jar.add(cookie))
            }
        };

        let controller = state.sessions().get_or_create(id).await;
        Ok(Self {
            controller,
            cookie_jar,
        })
    }
}
