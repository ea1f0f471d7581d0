pub mod api;
pub mod dev;
pub mod public;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::db::AppState;

/// Full application router. Dev seeding routes are only mounted when `dev_mode` is set.
pub fn app(state: AppState, dev_mode: bool) -> Router {
    let mut router = Router::new().merge(public::router()).merge(api::router());

    if dev_mode {
        tracing::warn!("Dev mode enabled: /dev routes are mounted");
        router = router.merge(dev::router());
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
