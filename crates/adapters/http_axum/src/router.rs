//! Axum router assembly.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use harmony_app::ports::{HubClient, MessagePublisher};

use crate::api;
use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Every route except `/_ping` sits behind the hub-availability gate and
/// responds 500 while no hub is registered. Includes a [`TraceLayer`] that
/// logs each HTTP request/response at the `DEBUG` level using the `tracing`
/// ecosystem.
pub fn build<C, P>(state: AppState<C, P>) -> Router
where
    C: HubClient + Send + Sync + 'static,
    P: MessagePublisher + Send + Sync + 'static,
{
    let gated = Router::new()
        .route("/hubs", get(api::list_hubs))
        .route("/hubs/{slug}/activities", get(api::list_activities))
        .route("/hubs/{slug}/status", get(api::status))
        .route("/hubs/{slug}/off", put(api::power_off))
        .route("/hubs/{slug}/start_activity", post(api::start_activity))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_hubs::<C, P>,
        ));

    Router::new()
        .route("/_ping", get(api::ping))
        .merge(gated)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Reject requests while the registry holds no hub at all.
async fn require_hubs<C, P>(
    State(state): State<AppState<C, P>>,
    request: Request,
    next: Next,
) -> Response
where
    C: HubClient + Send + Sync + 'static,
    P: MessagePublisher + Send + Sync + 'static,
{
    if state.registry.is_empty().await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"message": "No hubs available."})),
        )
            .into_response();
    }
    next.run(request).await
}
