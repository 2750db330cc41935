use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Match, MatchId, TournamentKind};

/// Display label for a round; knockout labels count back from the last round.
pub fn round_label(round: u32, total_rounds: u32, kind: TournamentKind) -> String {
    if kind == TournamentKind::Knockout && round <= total_rounds {
        match total_rounds - round {
            0 => return "Final".to_string(),
            1 => return "Semi Finals".to_string(),
            2 => return "Quarter Finals".to_string(),
            _ => {}
        }
    }
    format!("Round {}", round)
}

/// round -> match ids, kept in round order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundIndex {
    rounds: BTreeMap<u32, Vec<MatchId>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundGroup<T> {
    pub round: u32,
    pub label: String,
    pub matches: Vec<T>,
}

impl RoundIndex {
    pub fn from_matches(matches: &[Match]) -> Self {
        let mut index = Self::default();
        for m in matches {
            index.insert(m.round, m.id);
        }
        index
    }

    pub fn insert(&mut self, round: u32, match_id: MatchId) {
        let ids = self.rounds.entry(round).or_default();
        if let Err(pos) = ids.binary_search(&match_id) {
            ids.insert(pos, match_id);
        }
    }

    pub fn round_numbers(&self) -> Vec<u32> {
        self.rounds.keys().copied().collect()
    }

    /// Highest round present, which for a knockout is the final.
    pub fn total_rounds(&self) -> u32 {
        self.rounds.keys().next_back().copied().unwrap_or(0)
    }

    pub fn label(&self, round: u32, kind: TournamentKind) -> String {
        round_label(round, self.total_rounds(), kind)
    }

    /// Splits `items` into labelled rounds following this index.
    pub fn group<T>(&self, items: Vec<T>, kind: TournamentKind, key: impl Fn(&T) -> (u32, MatchId)) -> Vec<RoundGroup<T>> {
        let mut buckets: BTreeMap<u32, Vec<T>> = BTreeMap::new();
        for item in items {
            let (round, _) = key(&item);
            buckets.entry(round).or_default().push(item);
        }

        buckets
            .into_iter()
            .map(|(round, mut matches)| {
                matches.sort_by_key(|item| key(item).1);
                RoundGroup {
                    round,
                    label: self.label(round, kind),
                    matches,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::machine::tests::sample_match;

    #[test]
    fn test_labels_count_back_from_final() {
        let kind = TournamentKind::Knockout;

        assert_eq!(round_label(4, 4, kind), "Final");
        assert_eq!(round_label(3, 4, kind), "Semi Finals");
        assert_eq!(round_label(2, 4, kind), "Quarter Finals");
        assert_eq!(round_label(1, 4, kind), "Round 1");
        assert_eq!(round_label(1, 1, kind), "Final");
        assert_eq!(round_label(1, 2, kind), "Semi Finals");
    }

    #[test]
    fn test_league_rounds_are_numbered() {
        assert_eq!(round_label(3, 3, TournamentKind::League), "Round 3");
    }

    #[test]
    fn test_index_groups_matches_by_round() {
        let mut matches = Vec::new();
        for (id, round) in [(4, 2), (1, 1), (3, 1), (2, 1), (5, 3)] {
            let mut m = sample_match(id);
            m.round = round;
            matches.push(m);
        }

        let index = RoundIndex::from_matches(&matches);
        assert_eq!(index.round_numbers(), vec![1, 2, 3]);
        assert_eq!(index.total_rounds(), 3);

        let groups = index.group(matches, TournamentKind::Knockout, |m| (m.round, m.id));
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Quarter Finals", "Semi Finals", "Final"]);
        let first_round: Vec<MatchId> = groups[0].matches.iter().map(|m| m.id).collect();
        assert_eq!(first_round, vec![1, 2, 3]);
    }
}
