use std::cmp::Ordering;
use std::collections::BTreeMap;

use log::warn;

use super::types::StandingsEntry;
use crate::domain::{Match, MatchStatus, TeamId};

/// Folds every completed match into a fresh table and ranks it.
///
/// Entries are accumulated in a map ordered by team id and ranked with a
/// stable sort, so the same set of results always yields the same list.
pub fn compute_standings(matches: &[Match]) -> Vec<StandingsEntry> {
    let mut table: BTreeMap<TeamId, StandingsEntry> = BTreeMap::new();

    for m in matches.iter().filter(|m| m.status == MatchStatus::Completed) {
        let (Some(team_a), Some(team_b)) = (&m.slot_a, &m.slot_b) else {
            warn!("Completed match {} has an empty slot, left out of standings", m.id);
            continue;
        };

        table
            .entry(team_a.clone())
            .or_insert_with(|| StandingsEntry::new(team_a.clone()))
            .record(m.score_a, m.score_b);
        table
            .entry(team_b.clone())
            .or_insert_with(|| StandingsEntry::new(team_b.clone()))
            .record(m.score_b, m.score_a);
    }

    let mut entries: Vec<StandingsEntry> = table.into_values().collect();
    entries.sort_by(compare_entries);
    entries
}

/// Points first, then goal difference. Nothing further is compared.
pub fn compare_entries(a: &StandingsEntry, b: &StandingsEntry) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::machine::tests::sample_match;

    fn result(id: i64, a: &str, b: &str, score_a: u32, score_b: u32) -> Match {
        let mut m = sample_match(id);
        m.slot_a = Some(a.to_string());
        m.slot_b = Some(b.to_string());
        m.score_a = score_a;
        m.score_b = score_b;
        m.status = MatchStatus::Completed;
        m
    }

    #[test]
    fn test_three_team_league_table() {
        let matches = vec![
            result(1, "A", "B", 2, 0),
            result(2, "A", "C", 1, 1),
            result(3, "B", "C", 3, 0),
        ];

        let table = compute_standings(&matches);
        let order: Vec<&str> = table.iter().map(|e| e.team_id.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);

        let a = &table[0];
        assert_eq!((a.played, a.won, a.drawn, a.lost, a.points, a.goal_difference), (2, 1, 1, 0, 4, 2));
        let b = &table[1];
        assert_eq!((b.played, b.won, b.drawn, b.lost, b.points, b.goal_difference), (2, 1, 0, 1, 3, 1));
        let c = &table[2];
        assert_eq!((c.played, c.won, c.drawn, c.lost, c.points, c.goal_difference), (2, 0, 1, 1, 1, -3));
        assert_eq!((c.goals_for, c.goals_against), (1, 4));
    }

    #[test]
    fn test_only_completed_matches_count() {
        let mut running = result(1, "A", "B", 5, 0);
        running.status = MatchStatus::InProgress;
        let mut cancelled = result(2, "A", "C", 5, 0);
        cancelled.status = MatchStatus::Cancelled;
        let mut half_drawn = result(3, "A", "D", 1, 0);
        half_drawn.slot_b = None;

        let table = compute_standings(&[running, cancelled, half_drawn, result(4, "B", "C", 0, 0)]);

        let teams: Vec<&str> = table.iter().map(|e| e.team_id.as_str()).collect();
        assert_eq!(teams, vec!["B", "C"]);
        assert!(table.iter().all(|e| e.played == 1 && e.points == 1));
    }

    #[test]
    fn test_goal_difference_breaks_points_tie() {
        let matches = vec![
            result(1, "X", "Z", 1, 0),
            result(2, "Y", "Z", 4, 0),
        ];

        let table = compute_standings(&matches);

        assert_eq!(table[0].team_id, "Y");
        assert_eq!(table[1].team_id, "X");
    }

    #[test]
    fn test_recomputation_is_deterministic() {
        let mut matches = vec![
            result(1, "m", "k", 1, 1),
            result(2, "q", "b", 1, 1),
            result(3, "k", "b", 2, 2),
            result(4, "q", "m", 0, 0),
        ];

        let first = compute_standings(&matches);
        matches.reverse();
        let second = compute_standings(&matches);

        assert_eq!(first, second);
        let order: Vec<&str> = first.iter().map(|e| e.team_id.as_str()).collect();
        assert_eq!(order, vec!["b", "k", "m", "q"]);
    }
}
