use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{actor_from_headers, error_response, read_json, ApiResult, AppState};
use crate::api::models::{StandingsResponse, StandingsRow, TournamentMatchesResponse};
use crate::bracket::{BracketPlan, RoundGroup};
use crate::domain::TournamentId;

pub async fn create_tournament(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<BracketPlan>, JsonRejection>,
) -> ApiResult {
    let actor = actor_from_headers(&headers)?;
    let plan = read_json(payload)?;

    let tournament = state.tournaments().create(&actor, &plan).map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(tournament)).into_response())
}

pub async fn get_tournament(State(state): State<Arc<AppState>>, Path(id): Path<TournamentId>) -> ApiResult {
    let tournament = state.tournaments().get(id).map_err(error_response)?;
    Ok(Json(tournament).into_response())
}

pub async fn get_tournament_matches(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TournamentId>,
) -> ApiResult {
    let (tournament, groups) = state.tournaments().matches_by_round(id).map_err(error_response)?;

    let rounds = groups
        .into_iter()
        .map(|group| RoundGroup {
            round: group.round,
            label: group.label,
            matches: state.match_views(group.matches),
        })
        .collect();
    Ok(Json(TournamentMatchesResponse { tournament, rounds }).into_response())
}

pub async fn get_standings(State(state): State<Arc<AppState>>, Path(id): Path<TournamentId>) -> ApiResult {
    let entries = state.tournaments().standings(id).map_err(error_response)?;
    let names = state.names.lookup(entries.iter().map(|e| &e.team_id));

    let rows = entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| StandingsRow {
            rank: idx + 1,
            team_name: names.get(&entry.team_id).cloned(),
            entry,
        })
        .collect();
    Ok(Json(StandingsResponse { tournament_id: id, rows }).into_response())
}
