use log::{info, warn};
use rusqlite::Connection;

use crate::bracket::{BracketPlan, PromotionOutcome, RoundGroup, RoundIndex, TiePolicy};
use crate::database::{self, begin_write, DbPool};
use crate::domain::{Actor, Match, MatchId, MatchStatus, Tournament, TournamentId};
use crate::errors::{EngineError, EngineResult};
use crate::services::match_service::MatchService;
use crate::standings::{compute_standings, StandingsEntry};

pub struct TournamentService<'a> {
    pool: &'a DbPool,
    tie_policy: TiePolicy,
}

impl<'a> TournamentService<'a> {
    pub fn new(pool: &'a DbPool, tie_policy: TiePolicy) -> Self {
        Self { pool, tie_policy }
    }

    /// Stores a tournament and its whole bracket atomically.
    pub fn create(&self, actor: &Actor, plan: &BracketPlan) -> EngineResult<Tournament> {
        actor.require_admin("create a tournament")?;

        let mut conn = self.pool.get()?;
        let tx = begin_write(&mut conn)?;
        let id = plan.materialize(&tx)?;
        let (tournament, _) = load(&tx, id)?;
        tx.commit()?;
        Ok(tournament)
    }

    pub fn get(&self, id: TournamentId) -> EngineResult<Tournament> {
        self.matches(id).map(|(tournament, _)| tournament)
    }

    pub fn matches(&self, id: TournamentId) -> EngineResult<(Tournament, Vec<Match>)> {
        let conn = self.pool.get()?;
        load(&conn, id)
    }

    pub fn matches_by_round(&self, id: TournamentId) -> EngineResult<(Tournament, Vec<RoundGroup<Match>>)> {
        let (tournament, matches) = self.matches(id)?;
        let index = RoundIndex::from_matches(&matches);
        let groups = index.group(matches, tournament.kind, |m| (m.round, m.id));
        Ok((tournament, groups))
    }

    /// Recomputed from the stored results on every call.
    pub fn standings(&self, id: TournamentId) -> EngineResult<Vec<StandingsEntry>> {
        let (_, matches) = self.matches(id)?;
        Ok(compute_standings(&matches))
    }

    /// Replays promotion for every completed match that routes a winner,
    /// in round order. Catches up after promotions that failed to write.
    pub fn reconcile(&self, actor: &Actor, id: TournamentId) -> EngineResult<Vec<(MatchId, PromotionOutcome)>> {
        actor.require_official("reconcile a bracket")?;

        let (tournament, matches) = self.matches(id)?;
        let service = MatchService::new(self.pool, self.tie_policy);
        let mut outcomes = Vec::new();

        for m in matches
            .iter()
            .filter(|m| m.status == MatchStatus::Completed && m.next_match_id.is_some())
        {
            let outcome = match service.promote(actor, m.id) {
                Ok(outcome) => outcome,
                Err(err) if err.is_retriable() => {
                    warn!("Promotion of match {} still failing: {}", m.id, err);
                    PromotionOutcome::Pending {
                        reason: err.to_string(),
                    }
                }
                Err(err) => return Err(err),
            };
            outcomes.push((m.id, outcome));
        }

        let promoted = outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, PromotionOutcome::Promoted { .. }))
            .count();
        info!(
            "Reconciled tournament {} ({}): {} completed matches checked, {} winners promoted",
            id,
            tournament.name,
            outcomes.len(),
            promoted
        );
        Ok(outcomes)
    }
}

/// Reads the tournament and its matches; `rounds` is filled from the matches.
fn load(conn: &Connection, id: TournamentId) -> EngineResult<(Tournament, Vec<Match>)> {
    let mut tournament =
        database::tournaments::find_by_id(conn, id)?.ok_or_else(|| EngineError::not_found("tournament", id))?;
    let matches = database::matches::list_by_tournament(conn, id)?;
    tournament.rounds = RoundIndex::from_matches(&matches).round_numbers();
    Ok((tournament, matches))
}
