use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{matches, rosters, tournaments, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/matches/:id", get(matches::get_match).patch(matches::patch_match))
        .route("/api/matches/:id/events", post(matches::record_event))
        .route("/api/matches/:id/promote", post(matches::promote_match))
        .route("/api/rosters/:academy/:category", get(rosters::get_roster))
        .route("/api/rosters/:academy/:category/swap", post(rosters::swap_players))
        .route("/api/rosters/:academy/:category/players", post(rosters::add_player))
        .route(
            "/api/rosters/:academy/:category/players/:player",
            delete(rosters::remove_player),
        )
        .route("/api/tournaments", post(tournaments::create_tournament))
        .route("/api/tournaments/:id", get(tournaments::get_tournament))
        .route("/api/tournaments/:id/matches", get(tournaments::get_tournament_matches))
        .route("/api/tournaments/:id/standings", get(tournaments::get_standings))
        .with_state(state)
}
