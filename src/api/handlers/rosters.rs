use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{actor_from_headers, error_response, read_json, ApiResult, AppState};
use crate::api::models::{AddPlayerRequest, RosterView, SwapRequest};
use crate::domain::Roster;

fn view(state: &AppState, roster: Roster) -> Json<RosterView> {
    Json(RosterView {
        roster,
        starter_target: state.config.roster.starters,
        substitute_target: state.config.roster.substitutes,
    })
}

pub async fn get_roster(
    State(state): State<Arc<AppState>>,
    Path((academy, category)): Path<(String, String)>,
) -> ApiResult {
    let roster = state.rosters().team_sheet(&academy, &category).map_err(error_response)?;
    Ok(view(&state, roster).into_response())
}

pub async fn swap_players(
    State(state): State<Arc<AppState>>,
    Path((academy, category)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<SwapRequest>, JsonRejection>,
) -> ApiResult {
    let actor = actor_from_headers(&headers)?;
    let request = read_json(payload)?;

    let roster = state
        .rosters()
        .swap(&actor, &academy, &category, &request.id_a, &request.id_b)
        .map_err(error_response)?;
    Ok(view(&state, roster).into_response())
}

pub async fn add_player(
    State(state): State<Arc<AppState>>,
    Path((academy, category)): Path<(String, String)>,
    headers: HeaderMap,
    payload: Result<Json<AddPlayerRequest>, JsonRejection>,
) -> ApiResult {
    let actor = actor_from_headers(&headers)?;
    let request = read_json(payload)?;

    let roster = state
        .rosters()
        .add_player(&actor, &academy, &category, &request.player_id)
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, view(&state, roster)).into_response())
}

pub async fn remove_player(
    State(state): State<Arc<AppState>>,
    Path((academy, category, player)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> ApiResult {
    let actor = actor_from_headers(&headers)?;
    let roster = state
        .rosters()
        .remove_player(&actor, &academy, &category, &player)
        .map_err(error_response)?;
    Ok(view(&state, roster).into_response())
}
