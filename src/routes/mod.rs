use crate::state::AppState;
use axum::Router;

pub mod health;
pub mod home;
pub mod subscriptions;

pub fn build_router(app_state: &AppState) -> Router {
    let form_routes: Router<AppState> =
        home::create_router().nest("/subscriptions", subscriptions::create_router());

    form_routes
        .with_state(app_state.clone())
        .merge(health::create_router())
}
