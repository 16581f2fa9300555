pub mod health;
pub mod temperature;
pub mod version;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest(
            "/api/v1",
            Router::new()
                .merge(version::router())
                .merge(temperature::router()),
        )
        .with_state(state)
}
