use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{
    Actor, EventKind, Match, MatchEvent, MatchId, MatchStatus, PlayerId, Side, TeamId, TournamentId,
};
use crate::errors::{EngineError, EngineResult};

/// Emitted exactly when a match enters COMPLETED; the bracket consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCompleted {
    pub match_id: MatchId,
    pub tournament_id: TournamentId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub kind: EventKind,
    pub slot: Side,
    pub player_id: PlayerId,
}

/// Partial update of a match. `slot_a: Some(None)` clears the slot back to TBD.
#[derive(Debug, Clone, Default)]
pub struct MatchPatch {
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub status: Option<MatchStatus>,
    pub slot_a: Option<Option<TeamId>>,
    pub slot_b: Option<Option<TeamId>>,
    pub corners_a: Option<u32>,
    pub corners_b: Option<u32>,
    pub penalties_a: Option<u32>,
    pub penalties_b: Option<u32>,
    pub expected_version: Option<i64>,
}

impl MatchPatch {
    pub fn slot(&self, side: Side) -> Option<&Option<TeamId>> {
        match side {
            Side::A => self.slot_a.as_ref(),
            Side::B => self.slot_b.as_ref(),
        }
    }

    /// Whether anything besides the status is being changed.
    fn edits_fields(&self) -> bool {
        self.score_a.is_some()
            || self.score_b.is_some()
            || self.slot_a.is_some()
            || self.slot_b.is_some()
            || self.corners_a.is_some()
            || self.corners_b.is_some()
            || self.penalties_a.is_some()
            || self.penalties_b.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.edits_fields() && self.status.is_none()
    }
}

pub fn ensure_open(m: &Match) -> EngineResult<()> {
    if m.is_terminal() {
        return Err(EngineError::MatchClosed {
            match_id: m.id,
            status: m.status,
        });
    }
    Ok(())
}

pub fn transition(m: &mut Match, target: MatchStatus) -> EngineResult<Option<MatchCompleted>> {
    if !m.status.can_transition_to(target) {
        return Err(EngineError::InvalidTransition {
            match_id: m.id,
            from: m.status,
            to: target,
        });
    }

    if target != MatchStatus::Completed {
        m.status = target;
        return Ok(None);
    }
    if let Some(side) = [Side::A, Side::B].into_iter().find(|side| m.slot(*side).is_none()) {
        return Err(EngineError::Validation(format!(
            "match {} cannot complete while {} is TBD",
            m.id, side
        )));
    }

    m.status = target;

    Ok(Some(MatchCompleted {
        match_id: m.id,
        tournament_id: m.tournament_id,
    }))
}

/// Appends the event and bumps the matching counter. Nothing is touched on error.
pub fn record_event(
    m: &mut Match,
    event: &NewEvent,
    actor: &Actor,
    recorded_at: DateTime<Utc>,
) -> EngineResult<MatchEvent> {
    ensure_open(m)?;

    let player_id = event.player_id.trim();
    if player_id.is_empty() {
        return Err(EngineError::Validation("playerId must not be empty".into()));
    }
    if m.slot(event.slot).is_none() {
        return Err(EngineError::Validation(format!(
            "{} of match {} has no team yet",
            event.slot, m.id
        )));
    }

    let seq = m.events.last().map(|e| e.seq + 1).unwrap_or(1);
    let counter = match event.kind {
        EventKind::Goal => Some(m.score_mut(event.slot)),
        EventKind::Assist => Some(&mut m.stats_mut(event.slot).assists),
        EventKind::Offside => Some(&mut m.stats_mut(event.slot).offsides),
        EventKind::YellowCard | EventKind::RedCard => None,
    };
    if let Some(counter) = counter {
        *counter = counter
            .checked_add(1)
            .ok_or_else(|| EngineError::Validation("counter overflow".into()))?;
    }

    let recorded = MatchEvent {
        seq,
        kind: event.kind,
        slot: event.slot,
        player_id: player_id.to_string(),
        recorded_by: actor.id.clone(),
        recorded_at,
    };
    m.events.push(recorded.clone());
    Ok(recorded)
}

/// Manual correction of the tally. The event log is left as it is.
pub fn set_score(m: &mut Match, score_a: u32, score_b: u32) -> EngineResult<()> {
    ensure_open(m)?;
    m.score_a = score_a;
    m.score_b = score_b;
    Ok(())
}

/// Applies field edits first and the status change last, so a single patch can
/// enter the final score and complete the match.
pub fn apply_patch(m: &mut Match, patch: &MatchPatch) -> EngineResult<Option<MatchCompleted>> {
    if let Some(expected) = patch.expected_version {
        if expected != m.version {
            return Err(EngineError::Conflict {
                entity: "match",
                id: m.id.to_string(),
                expected,
                found: m.version,
            });
        }
    }

    if patch.edits_fields() {
        ensure_open(m)?;
    }

    for side in [Side::A, Side::B] {
        if let Some(team) = patch.slot(side) {
            if team.as_deref().is_some_and(|t| t.trim().is_empty()) {
                return Err(EngineError::Validation(format!("{} team id must not be empty", side)));
            }
            *m.slot_mut(side) = team.clone();
        }
    }
    if m.slot_a.is_some() && m.slot_a == m.slot_b {
        return Err(EngineError::Validation("a team cannot be drawn against itself".into()));
    }

    if patch.score_a.is_some() || patch.score_b.is_some() {
        let (score_a, score_b) = (patch.score_a.unwrap_or(m.score_a), patch.score_b.unwrap_or(m.score_b));
        set_score(m, score_a, score_b)?;
    }
    m.stats_a.corners = patch.corners_a.unwrap_or(m.stats_a.corners);
    m.stats_b.corners = patch.corners_b.unwrap_or(m.stats_b.corners);
    m.stats_a.penalties = patch.penalties_a.unwrap_or(m.stats_a.penalties);
    m.stats_b.penalties = patch.penalties_b.unwrap_or(m.stats_b.penalties);

    match patch.status {
        Some(target) => transition(m, target),
        None => Ok(None),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{Role, SideStats};

    pub(crate) fn sample_match(id: MatchId) -> Match {
        Match {
            id,
            tournament_id: 1,
            round: 1,
            slot_a: Some("team-x".to_string()),
            slot_b: Some("team-y".to_string()),
            score_a: 0,
            score_b: 0,
            status: MatchStatus::Scheduled,
            next_match_id: None,
            position_in_next: None,
            stats_a: SideStats::default(),
            stats_b: SideStats::default(),
            events: Vec::new(),
            version: 0,
        }
    }

    fn official() -> Actor {
        Actor::new("ref-1", Role::Official)
    }

    fn goal(slot: Side, player: &str) -> NewEvent {
        NewEvent {
            kind: EventKind::Goal,
            slot,
            player_id: player.to_string(),
        }
    }

    #[test]
    fn test_completion_emits_event_once() {
        let mut m = sample_match(5);

        assert_eq!(transition(&mut m, MatchStatus::InProgress).unwrap(), None);
        let completed = transition(&mut m, MatchStatus::Completed).unwrap();
        assert_eq!(
            completed,
            Some(MatchCompleted {
                match_id: 5,
                tournament_id: 1
            })
        );

        let again = transition(&mut m, MatchStatus::Completed).unwrap_err();
        assert!(matches!(again, EngineError::InvalidTransition { .. }));
    }

    #[test]
    fn test_no_sequence_reopens_a_terminal_match() {
        for terminal in [MatchStatus::Completed, MatchStatus::Cancelled] {
            let mut m = sample_match(1);
            transition(&mut m, terminal).unwrap();

            for target in MatchStatus::ALL {
                assert!(transition(&mut m, target).is_err());
                assert_eq!(m.status, terminal);
            }
        }
    }

    #[test]
    fn test_goal_moves_score_and_log_together() {
        let mut m = sample_match(1);
        let now = Utc::now();

        record_event(&mut m, &goal(Side::A, "p9"), &official(), now).unwrap();
        record_event(&mut m, &goal(Side::B, "p4"), &official(), now).unwrap();
        let third = record_event(&mut m, &goal(Side::A, "p9"), &official(), now).unwrap();

        assert_eq!((m.score_a, m.score_b), (2, 1));
        assert_eq!(m.events.len(), 3);
        assert_eq!(third.seq, 3);
        assert_eq!(third.recorded_by, "ref-1");
    }

    #[test]
    fn test_assist_and_offside_bump_side_counters() {
        let mut m = sample_match(1);
        let now = Utc::now();
        let assist = NewEvent {
            kind: EventKind::Assist,
            slot: Side::B,
            player_id: "p2".into(),
        };
        let offside = NewEvent {
            kind: EventKind::Offside,
            slot: Side::B,
            player_id: "p7".into(),
        };
        let card = NewEvent {
            kind: EventKind::YellowCard,
            slot: Side::A,
            player_id: "p3".into(),
        };

        record_event(&mut m, &assist, &official(), now).unwrap();
        record_event(&mut m, &offside, &official(), now).unwrap();
        record_event(&mut m, &card, &official(), now).unwrap();

        assert_eq!(m.stats_b.assists, 1);
        assert_eq!(m.stats_b.offsides, 1);
        assert_eq!(m.stats_a, SideStats::default());
        assert_eq!((m.score_a, m.score_b), (0, 0));
        assert_eq!(m.events.len(), 3);
    }

    #[test]
    fn test_rejected_event_leaves_match_untouched() {
        let mut m = sample_match(1);
        m.slot_b = None;
        let before = m.clone();

        let err = record_event(&mut m, &goal(Side::B, "p1"), &official(), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = record_event(&mut m, &goal(Side::A, "  "), &official(), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(m, before);
    }

    #[test]
    fn test_events_rejected_after_completion() {
        let mut m = sample_match(1);
        transition(&mut m, MatchStatus::Completed).unwrap();

        let err = record_event(&mut m, &goal(Side::A, "p1"), &official(), Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::MatchClosed { .. }));
        assert!(matches!(set_score(&mut m, 1, 0), Err(EngineError::MatchClosed { .. })));
    }

    #[test]
    fn test_set_score_keeps_event_log() {
        let mut m = sample_match(1);
        record_event(&mut m, &goal(Side::A, "p1"), &official(), Utc::now()).unwrap();

        set_score(&mut m, 0, 3).unwrap();

        assert_eq!((m.score_a, m.score_b), (0, 3));
        assert_eq!(m.events.len(), 1);
    }

    #[test]
    fn test_patch_sets_score_then_completes() {
        let mut m = sample_match(1);
        let patch = MatchPatch {
            score_a: Some(2),
            score_b: Some(1),
            corners_a: Some(4),
            status: Some(MatchStatus::Completed),
            ..Default::default()
        };

        let completed = apply_patch(&mut m, &patch).unwrap();

        assert!(completed.is_some());
        assert_eq!((m.score_a, m.score_b), (2, 1));
        assert_eq!(m.stats_a.corners, 4);
        assert_eq!(m.status, MatchStatus::Completed);
    }

    #[test]
    fn test_patch_with_stale_version_conflicts() {
        let mut m = sample_match(1);
        m.version = 3;
        let patch = MatchPatch {
            score_a: Some(1),
            expected_version: Some(2),
            ..Default::default()
        };

        let err = apply_patch(&mut m, &patch).unwrap_err();
        assert!(matches!(err, EngineError::Conflict { expected: 2, found: 3, .. }));
        assert_eq!(m.score_a, 0);
    }

    #[test]
    fn test_patch_on_closed_match() {
        let mut m = sample_match(1);
        transition(&mut m, MatchStatus::Cancelled).unwrap();

        let edit = MatchPatch {
            score_a: Some(1),
            ..Default::default()
        };
        assert!(matches!(apply_patch(&mut m, &edit), Err(EngineError::MatchClosed { .. })));

        let reopen = MatchPatch {
            status: Some(MatchStatus::Scheduled),
            ..Default::default()
        };
        assert!(matches!(apply_patch(&mut m, &reopen), Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn test_completion_needs_both_teams() {
        let mut m = sample_match(1);
        m.slot_b = None;
        let finish = MatchPatch {
            score_a: Some(3),
            status: Some(MatchStatus::Completed),
            ..Default::default()
        };

        let err = apply_patch(&mut m, &finish).unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(m.status, MatchStatus::Scheduled);
        assert!(transition(&mut m, MatchStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_patch_rejects_team_against_itself() {
        let mut m = sample_match(1);
        let patch = MatchPatch {
            slot_b: Some(Some("team-x".into())),
            ..Default::default()
        };

        assert!(matches!(apply_patch(&mut m, &patch), Err(EngineError::Validation(_))));
    }
}
