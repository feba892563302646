pub mod configuration;
pub mod domain;
mod error;
pub mod form;
pub mod metrics;
mod routes;
mod state;
pub mod subscription_client;
pub mod telemetry;

use axum::{routing::IntoMakeService, Router, Server};
use configuration::Settings;
use hyper::server::conn::AddrIncoming;
use metrics::SubscriptionMetrics;
use state::AppState;
use std::net::TcpListener;
use subscription_client::SubscriptionClient;

type AppServer = Server<AddrIncoming, IntoMakeService<Router>>;

/// The newsletter form served over HTTP.
pub struct App {
    port: u16,
    server: AppServer,
}

impl App {
    /// Bind the listener and wire up the application from the settings.
    pub fn build(settings: Settings) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(settings.application().address())?;
        let port = listener.local_addr()?.port();
        tracing::info!("Server running at {}", listener.local_addr()?);

        let subscription_client =
            SubscriptionClient::try_from(settings.newsletter()).map_err(anyhow::Error::msg)?;
        let subscription_metrics = SubscriptionMetrics::new()?;
        let app_state = AppState::create(
            subscription_client,
            *settings.newsletter().subscriber_count(),
            settings.application().session_idle_timeout(),
            subscription_metrics.clone(),
        );
        let router = Self::build_router(&app_state, &subscription_metrics);

        let server = Server::from_tcp(listener)?.serve(router.into_make_service());
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), hyper::Error> {
        self.server.await
    }

    /// Builder the router for the application.
    fn build_router(app_state: &AppState, subscription_metrics: &SubscriptionMetrics) -> Router {
        use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
        use tracing::Level;

        routes::build_router(app_state)
            .merge(metrics::create_router(subscription_metrics))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
    }
}
