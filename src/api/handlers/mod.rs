use std::collections::BTreeSet;

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use log::error;

use crate::api::models::{ErrorBody, MatchUpdateResponse, MatchView};
use crate::config::AppConfig;
use crate::database::DbPool;
use crate::domain::{Actor, Match, Role, TeamId};
use crate::errors::EngineError;
use crate::services::{MatchService, MatchUpdate, NameResolver, RosterService, TournamentService};

pub mod matches;
pub mod rosters;
pub mod tournaments;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Both arms are ready-made responses, so handlers can use `?` throughout.
pub type ApiResult = Result<Response, Response>;

pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
    pub names: NameResolver,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        let names = NameResolver::new(pool.clone(), config.directory.clone());
        Self { pool, config, names }
    }

    pub fn matches(&self) -> MatchService<'_> {
        MatchService::new(&self.pool, self.config.bracket.tie_policy)
    }

    pub fn rosters(&self) -> RosterService<'_> {
        RosterService::new(&self.pool, self.config.roster)
    }

    pub fn tournaments(&self) -> TournamentService<'_> {
        TournamentService::new(&self.pool, self.config.bracket.tie_policy)
    }

    pub fn match_views(&self, matches: Vec<Match>) -> Vec<MatchView> {
        let teams: BTreeSet<TeamId> = matches.iter().flat_map(|m| m.teams().cloned()).collect();
        let names = self.names.lookup(&teams);
        matches.into_iter().map(|m| MatchView::new(m, &names)).collect()
    }

    pub fn match_view(&self, m: Match) -> MatchView {
        let names = self.names.lookup(m.teams());
        MatchView::new(m, &names)
    }

    pub fn update_response(&self, update: MatchUpdate) -> MatchUpdateResponse {
        MatchUpdateResponse {
            view: self.match_view(update.current),
            promotion: update.promotion,
        }
    }
}

pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, Response> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let (Some(id), Some(role)) = (header(ACTOR_ID_HEADER), header(ACTOR_ROLE_HEADER)) else {
        return Err(unauthenticated("X-Actor-Id and X-Actor-Role headers are required".into()));
    };
    let role: Role = role.parse().map_err(unauthenticated)?;
    Ok(Actor::new(id, role))
}

fn unauthenticated(message: String) -> Response {
    let body = ErrorBody {
        error: "Unauthenticated",
        message,
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

pub fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::InvalidTransition { .. }
        | EngineError::MatchClosed { .. }
        | EngineError::InvalidSwap(_)
        | EngineError::Conflict { .. } => StatusCode::CONFLICT,
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Forbidden { .. } => StatusCode::FORBIDDEN,
        EngineError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub fn error_response(err: EngineError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    let body = ErrorBody {
        error: err.kind(),
        message: err.to_string(),
    };
    (status, Json(body)).into_response()
}

pub fn read_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| error_response(EngineError::Validation(rejection.body_text())))
}
