//! JSON handlers for the hub read facade and action routes.
//!
//! Body shapes are part of the public wire format: `{"hubs": [...]}`,
//! `{"activities": [...]}`, `{"message": "ok"}`.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Serialize;

use harmony_app::ports::{HubClient, MessagePublisher};
use harmony_domain::activity::Activity;
use harmony_domain::error::NotFoundError;
use harmony_domain::slug::Slug;
use harmony_domain::snapshot::StateSnapshot;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for `GET /hubs`.
#[derive(Serialize)]
pub struct HubsBody {
    pub hubs: Vec<Slug>,
}

/// Response body for `GET /hubs/{slug}/activities`.
#[derive(Serialize)]
pub struct ActivitiesBody {
    pub activities: Vec<Activity>,
}

/// Acknowledgement body for action routes.
#[derive(Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

/// `GET /_ping`
pub async fn ping() -> &'static str {
    "OK"
}

/// `GET /hubs`
pub async fn list_hubs<C, P>(State(state): State<AppState<C, P>>) -> Json<HubsBody>
where
    C: HubClient + Send + Sync + 'static,
    P: MessagePublisher + Send + Sync + 'static,
{
    Json(HubsBody {
        hubs: state.registry.slugs().await,
    })
}

/// `GET /hubs/{slug}/activities`
pub async fn list_activities<C, P>(
    State(state): State<AppState<C, P>>,
    Path(slug): Path<String>,
) -> Result<Json<ActivitiesBody>, ApiError>
where
    C: HubClient + Send + Sync + 'static,
    P: MessagePublisher + Send + Sync + 'static,
{
    let activities = state.registry.activities(&Slug::from(slug)).await?;
    Ok(Json(ActivitiesBody { activities }))
}

/// `GET /hubs/{slug}/status`
pub async fn status<C, P>(
    State(state): State<AppState<C, P>>,
    Path(slug): Path<String>,
) -> Result<Json<Option<StateSnapshot>>, ApiError>
where
    C: HubClient + Send + Sync + 'static,
    P: MessagePublisher + Send + Sync + 'static,
{
    let snapshot = state.registry.status(&Slug::from(slug)).await?;
    Ok(Json(snapshot))
}

/// `PUT /hubs/{slug}/off`
pub async fn power_off<C, P>(
    State(state): State<AppState<C, P>>,
    Path(slug): Path<String>,
) -> Result<Json<MessageBody>, ApiError>
where
    C: HubClient + Send + Sync + 'static,
    P: MessagePublisher + Send + Sync + 'static,
{
    state.commands.power_off(&Slug::from(slug)).await?;
    Ok(Json(MessageBody { message: "ok" }))
}

/// `POST /hubs/{slug}/start_activity?activity={slug}`
///
/// A missing `activity` parameter can never resolve, so it maps to the same
/// 404 as an unknown activity slug.
pub async fn start_activity<C, P>(
    State(state): State<AppState<C, P>>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<MessageBody>, ApiError>
where
    C: HubClient + Send + Sync + 'static,
    P: MessagePublisher + Send + Sync + 'static,
{
    let Some(activity) = params.get("activity") else {
        return Err(NotFoundError {
            entity: "Activity",
            id: String::new(),
        }
        .into());
    };
    state
        .commands
        .start_activity(&Slug::from(slug), &Slug::from(activity.as_str()))
        .await?;
    Ok(Json(MessageBody { message: "ok" }))
}
