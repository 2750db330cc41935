use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{actor_from_headers, error_response, read_json, ApiResult, AppState};
use crate::api::models::MatchPatchRequest;
use crate::domain::MatchId;
use crate::matches::NewEvent;

pub async fn get_match(State(state): State<Arc<AppState>>, Path(id): Path<MatchId>) -> ApiResult {
    let m = state.matches().get(id).map_err(error_response)?;
    Ok(Json(state.match_view(m)).into_response())
}

pub async fn patch_match(
    State(state): State<Arc<AppState>>,
    Path(id): Path<MatchId>,
    headers: HeaderMap,
    payload: Result<Json<MatchPatchRequest>, JsonRejection>,
) -> ApiResult {
    let actor = actor_from_headers(&headers)?;
    let patch = read_json(payload)?.into_patch().map_err(error_response)?;

    let update = state.matches().patch(&actor, id, &patch).map_err(error_response)?;
    Ok(Json(state.update_response(update)).into_response())
}

pub async fn record_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<MatchId>,
    headers: HeaderMap,
    payload: Result<Json<NewEvent>, JsonRejection>,
) -> ApiResult {
    let actor = actor_from_headers(&headers)?;
    let event = read_json(payload)?;

    let m = state.matches().record_event(&actor, id, &event).map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(state.match_view(m))).into_response())
}

pub async fn promote_match(
    State(state): State<Arc<AppState>>,
    Path(id): Path<MatchId>,
    headers: HeaderMap,
) -> ApiResult {
    let actor = actor_from_headers(&headers)?;
    let outcome = state.matches().promote(&actor, id).map_err(error_response)?;
    Ok(Json(outcome).into_response())
}
