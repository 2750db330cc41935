use std::cmp::Ordering;
use std::str::FromStr;

use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;

use crate::database;
use crate::domain::{Match, MatchId, MatchStatus, Side, TeamId};
use crate::errors::{EngineError, EngineResult};

/// How a drawn match is resolved when its winner must advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TiePolicy {
    /// No winner; the successor slot stays TBD until an official intervenes.
    #[default]
    Hold,
    /// Slot A advances on a draw.
    FavorSlotA,
}

impl FromStr for TiePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hold" => Ok(TiePolicy::Hold),
            "favor-slot-a" => Ok(TiePolicy::FavorSlotA),
            other => Err(format!("unknown tie policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PromotionOutcome {
    Promoted {
        next_match_id: MatchId,
        slot: Side,
        team_id: TeamId,
    },
    /// The slot was already filled by an earlier run; nothing was written.
    AlreadyPromoted {
        next_match_id: MatchId,
        slot: Side,
        occupant: TeamId,
    },
    NoSuccessor,
    NoWinner,
    SuccessorClosed { next_match_id: MatchId },
    /// The winner already plays in the successor's round; nothing was written.
    AlreadyInRound {
        next_match_id: MatchId,
        round: u32,
        team_id: TeamId,
    },
    /// The successor could not be written; retry promotion for this match.
    Pending { reason: String },
}

pub fn winner_side(m: &Match, policy: TiePolicy) -> Option<Side> {
    if m.status != MatchStatus::Completed {
        return None;
    }
    match m.score_a.cmp(&m.score_b) {
        Ordering::Greater => Some(Side::A),
        Ordering::Less => Some(Side::B),
        Ordering::Equal => match policy {
            TiePolicy::Hold => None,
            TiePolicy::FavorSlotA => Some(Side::A),
        },
    }
}

pub fn winner_of(m: &Match, policy: TiePolicy) -> Option<TeamId> {
    winner_side(m, policy).and_then(|side| m.slot(side).cloned())
}

/// Writes the winner of `completed` into its successor slot.
///
/// Must run inside a write transaction: the occupancy check and the write
/// then happen under the same lock, which makes repeated or concurrent runs
/// for feeders of the same successor safe.
pub fn promote_winner(conn: &Connection, completed: &Match, policy: TiePolicy) -> EngineResult<PromotionOutcome> {
    let (Some(next_match_id), Some(slot)) = (completed.next_match_id, completed.position_in_next) else {
        return Ok(PromotionOutcome::NoSuccessor);
    };

    let Some(winner) = winner_of(completed, policy) else {
        warn!(
            "Match {} ended {}-{} without a winner; match {} {} stays TBD",
            completed.id, completed.score_a, completed.score_b, next_match_id, slot
        );
        return Ok(PromotionOutcome::NoWinner);
    };

    let next = database::matches::find_by_id(conn, next_match_id)?
        .ok_or_else(|| EngineError::not_found("match", next_match_id))?;

    if let Some(occupant) = next.slot(slot) {
        if occupant != &winner {
            warn!(
                "Match {} {} already holds {}, not promoting winner {} of match {}",
                next_match_id, slot, occupant, winner, completed.id
            );
        }
        return Ok(PromotionOutcome::AlreadyPromoted {
            next_match_id,
            slot,
            occupant: occupant.clone(),
        });
    }

    if next.is_terminal() {
        warn!(
            "Successor match {} is {}, winner {} of match {} cannot advance",
            next_match_id, next.status, winner, completed.id
        );
        return Ok(PromotionOutcome::SuccessorClosed { next_match_id });
    }

    let opponent = next.slot(slot.opposite());
    if opponent == Some(&winner)
        || database::matches::teams_in_round(conn, next.tournament_id, next.round, next.id)?.contains(&winner)
    {
        warn!(
            "Winner {} of match {} already plays in round {}, match {} {} stays TBD",
            winner, completed.id, next.round, next_match_id, slot
        );
        return Ok(PromotionOutcome::AlreadyInRound {
            next_match_id,
            round: next.round,
            team_id: winner,
        });
    }

    if !database::matches::fill_empty_slot(conn, next_match_id, slot, &winner)? {
        return Err(EngineError::Storage(anyhow::anyhow!(
            "Slot {} of match {} changed during promotion",
            slot,
            next_match_id
        )));
    }

    info!(
        "Promoted {} from match {} into match {} {}",
        winner, completed.id, next_match_id, slot
    );
    Ok(PromotionOutcome::Promoted {
        next_match_id,
        slot,
        team_id: winner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::machine::tests::sample_match;

    fn completed(score_a: u32, score_b: u32) -> Match {
        let mut m = sample_match(1);
        m.score_a = score_a;
        m.score_b = score_b;
        m.status = MatchStatus::Completed;
        m
    }

    #[test]
    fn test_highest_score_wins() {
        assert_eq!(winner_of(&completed(2, 1), TiePolicy::Hold).as_deref(), Some("team-x"));
        assert_eq!(winner_of(&completed(0, 3), TiePolicy::Hold).as_deref(), Some("team-y"));
    }

    #[test]
    fn test_tie_follows_policy() {
        let drawn = completed(1, 1);

        assert_eq!(winner_of(&drawn, TiePolicy::Hold), None);
        assert_eq!(winner_of(&drawn, TiePolicy::FavorSlotA).as_deref(), Some("team-x"));
    }

    #[test]
    fn test_unfinished_or_empty_slot_has_no_winner() {
        let mut running = completed(3, 0);
        running.status = MatchStatus::InProgress;
        assert_eq!(winner_of(&running, TiePolicy::FavorSlotA), None);

        let mut walkover = completed(3, 0);
        walkover.slot_a = None;
        assert_eq!(winner_of(&walkover, TiePolicy::Hold), None);
    }

    #[test]
    fn test_tie_policy_parsing() {
        assert_eq!("hold".parse::<TiePolicy>().unwrap(), TiePolicy::Hold);
        assert_eq!("favor-slot-a".parse::<TiePolicy>().unwrap(), TiePolicy::FavorSlotA);
        assert!("coin-toss".parse::<TiePolicy>().is_err());
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = PromotionOutcome::Promoted {
            next_match_id: 9,
            slot: Side::A,
            team_id: "team-x".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["outcome"], "promoted");
        assert_eq!(json["nextMatchId"], 9);
        assert_eq!(json["slot"], "A");
    }
}
