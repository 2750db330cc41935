use chrono::Utc;
use log::{error, info};
use rusqlite::Connection;

use crate::bracket::{self, PromotionOutcome, TiePolicy};
use crate::database::{self, begin_write, DbPool};
use crate::domain::{Actor, Match, MatchId, MatchStatus, Side, TeamId};
use crate::errors::{EngineError, EngineResult};
use crate::matches::{self, MatchCompleted, MatchPatch, NewEvent};

/// Result of a mutation that may have completed the match.
#[derive(Debug, Clone)]
pub struct MatchUpdate {
    pub current: Match,
    /// Set only when this call moved the match into COMPLETED.
    pub promotion: Option<PromotionOutcome>,
}

pub struct MatchService<'a> {
    pool: &'a DbPool,
    tie_policy: TiePolicy,
}

impl<'a> MatchService<'a> {
    pub fn new(pool: &'a DbPool, tie_policy: TiePolicy) -> Self {
        Self { pool, tie_policy }
    }

    pub fn get(&self, id: MatchId) -> EngineResult<Match> {
        let conn = self.pool.get()?;
        load(&conn, id)
    }

    pub fn transition(&self, actor: &Actor, id: MatchId, target: MatchStatus) -> EngineResult<MatchUpdate> {
        let patch = MatchPatch {
            status: Some(target),
            ..Default::default()
        };
        self.patch(actor, id, &patch)
    }

    /// Appends the event and its counter bump in one transaction.
    pub fn record_event(&self, actor: &Actor, id: MatchId, event: &NewEvent) -> EngineResult<Match> {
        actor.require_official("record match events")?;

        let mut conn = self.pool.get()?;
        let tx = begin_write(&mut conn)?;
        let mut m = load(&tx, id)?;
        let recorded = matches::record_event(&mut m, event, actor, Utc::now())?;
        database::events::insert_event(&tx, m.id, &recorded)?;
        save(&tx, &mut m)?;
        tx.commit()?;

        info!(
            "{} recorded {} #{} for {} ({}) in match {}",
            actor.id,
            recorded.kind.as_str(),
            recorded.seq,
            recorded.slot,
            recorded.player_id,
            id
        );
        Ok(m)
    }

    /// Applies a partial update. If it completes the match, the winner is
    /// promoted after the match itself has been committed.
    pub fn patch(&self, actor: &Actor, id: MatchId, patch: &MatchPatch) -> EngineResult<MatchUpdate> {
        actor.require_official("update a match")?;
        if patch.is_empty() {
            return Err(EngineError::Validation("nothing to update".into()));
        }

        let mut conn = self.pool.get()?;
        let tx = begin_write(&mut conn)?;
        let mut m = load(&tx, id)?;
        let from = m.status;
        let completed = matches::apply_patch(&mut m, patch)?;
        for side in [Side::A, Side::B] {
            if let Some(team) = patch.slot(side) {
                check_slot_edit(&tx, &m, side, team.as_ref())?;
            }
        }
        save(&tx, &mut m)?;
        tx.commit()?;

        if from != m.status {
            info!("{} moved match {} from {} to {}", actor.id, id, from, m.status);
        } else {
            info!("{} updated match {}", actor.id, id);
        }

        let promotion = completed.map(|event| self.promote_after_completion(event));
        Ok(MatchUpdate {
            current: m,
            promotion,
        })
    }

    /// Re-runs winner promotion for a completed match. Safe to repeat.
    pub fn promote(&self, actor: &Actor, id: MatchId) -> EngineResult<PromotionOutcome> {
        actor.require_official("promote a match winner")?;
        self.promote_completed(id)
    }

    fn promote_after_completion(&self, event: MatchCompleted) -> PromotionOutcome {
        match self.promote_completed(event.match_id) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    "Match {} of tournament {} completed but promotion failed: {}",
                    event.match_id, event.tournament_id, err
                );
                PromotionOutcome::Pending {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn promote_completed(&self, id: MatchId) -> EngineResult<PromotionOutcome> {
        let mut conn = self.pool.get()?;
        let tx = begin_write(&mut conn)?;
        let source = load(&tx, id)?;
        if source.status != MatchStatus::Completed {
            return Err(EngineError::Validation(format!(
                "match {} is {}; only completed matches promote a winner",
                id, source.status
            )));
        }
        let outcome = bracket::promote_winner(&tx, &source, self.tie_policy)?;
        tx.commit()?;
        Ok(outcome)
    }
}

fn load(conn: &Connection, id: MatchId) -> EngineResult<Match> {
    database::matches::find_by_id(conn, id)?.ok_or_else(|| EngineError::not_found("match", id))
}

fn save(conn: &Connection, m: &mut Match) -> EngineResult<()> {
    if !database::matches::update_match(conn, m)? {
        let found = load(conn, m.id)?.version;
        return Err(EngineError::Conflict {
            entity: "match",
            id: m.id.to_string(),
            expected: m.version,
            found,
        });
    }
    m.version += 1;
    Ok(())
}

/// A slot fed by a still-running match is owned by the bracket, and a team
/// may only appear once per round.
fn check_slot_edit(conn: &Connection, m: &Match, side: Side, team: Option<&TeamId>) -> EngineResult<()> {
    let pending_feeder = database::matches::list_feeders(conn, m.id)?
        .into_iter()
        .find(|(_, fed, status)| *fed == side && !status.is_terminal());
    if let Some((feeder, _, _)) = pending_feeder {
        return Err(EngineError::Validation(format!(
            "{} of match {} is decided by match {}, which has not finished",
            side, m.id, feeder
        )));
    }

    if let Some(team) = team {
        let taken = database::matches::teams_in_round(conn, m.tournament_id, m.round, m.id)?;
        if taken.contains(team) {
            return Err(EngineError::Validation(format!(
                "team {} already plays in round {}",
                team, m.round
            )));
        }
    }
    Ok(())
}
