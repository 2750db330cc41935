use crate::domain::{PlayerId, Roster, SquadRole};
use crate::errors::{EngineError, EngineResult};

impl Roster {
    pub fn empty(academy_id: &str, category: &str) -> Self {
        Self {
            academy_id: academy_id.to_string(),
            category: category.to_string(),
            starters: Vec::new(),
            substitutes: Vec::new(),
            version: 0,
        }
    }

    pub fn role_of(&self, player_id: &str) -> Option<SquadRole> {
        self.locate(player_id).map(|(role, _)| role)
    }

    fn locate(&self, player_id: &str) -> Option<(SquadRole, usize)> {
        position(&self.starters, player_id)
            .map(|idx| (SquadRole::Starter, idx))
            .or_else(|| position(&self.substitutes, player_id).map(|idx| (SquadRole::Substitute, idx)))
    }

    pub fn len(&self) -> usize {
        self.starters.len() + self.substitutes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Restores the starter count to `target`. Substitutes are promoted in list
    /// order; surplus starters are demoted from the tail and placed at the head
    /// of the bench, keeping their relative order. Returns whether anything moved.
    pub fn enforce_sizes(&mut self, target: usize) -> bool {
        if self.starters.len() < target {
            let missing = target - self.starters.len();
            let promoted = missing.min(self.substitutes.len());
            self.starters.extend(self.substitutes.drain(..promoted));
            return promoted > 0;
        }

        if self.starters.len() > target {
            let demoted = self.starters.split_off(target);
            self.substitutes.splice(0..0, demoted);
            return true;
        }

        false
    }

    /// Exchanges one starter with one substitute; they trade list positions.
    /// Validation happens before any mutation, so a failed swap changes nothing.
    pub fn swap(&mut self, id_a: &str, id_b: &str) -> EngineResult<()> {
        if id_a == id_b {
            return Err(EngineError::InvalidSwap(format!("{} cannot be swapped with itself", id_a)));
        }

        let (starter_idx, substitute_idx) = match (self.locate(id_a), self.locate(id_b)) {
            (Some((SquadRole::Starter, i)), Some((SquadRole::Substitute, j))) => (i, j),
            (Some((SquadRole::Substitute, j)), Some((SquadRole::Starter, i))) => (i, j),
            (Some((SquadRole::Starter, _)), Some((SquadRole::Starter, _))) => {
                return Err(EngineError::InvalidSwap(format!("{} and {} are both starters", id_a, id_b)));
            }
            (Some((SquadRole::Substitute, _)), Some((SquadRole::Substitute, _))) => {
                return Err(EngineError::InvalidSwap(format!("{} and {} are both substitutes", id_a, id_b)));
            }
            (None, _) => return Err(absent(id_a, self)),
            (_, None) => return Err(absent(id_b, self)),
        };

        std::mem::swap(&mut self.starters[starter_idx], &mut self.substitutes[substitute_idx]);
        Ok(())
    }

    /// Adds a new member to the end of the bench.
    pub fn add_member(&mut self, player_id: &str) -> EngineResult<()> {
        let player_id = player_id.trim();
        if player_id.is_empty() {
            return Err(EngineError::Validation("playerId must not be empty".into()));
        }
        if self.role_of(player_id).is_some() {
            return Err(EngineError::Validation(format!(
                "{} is already on the {} {} roster",
                player_id, self.academy_id, self.category
            )));
        }
        self.substitutes.push(player_id.to_string());
        Ok(())
    }

    pub fn remove_member(&mut self, player_id: &str) -> EngineResult<SquadRole> {
        let role = self
            .role_of(player_id)
            .ok_or_else(|| EngineError::not_found("roster member", player_id))?;
        match role {
            SquadRole::Starter => self.starters.retain(|id| id != player_id),
            SquadRole::Substitute => self.substitutes.retain(|id| id != player_id),
        }
        Ok(role)
    }
}

fn position(ids: &[PlayerId], wanted: &str) -> Option<usize> {
    ids.iter().position(|id| id == wanted)
}

fn absent(player_id: &str, roster: &Roster) -> EngineError {
    EngineError::InvalidSwap(format!(
        "{} is not on the {} {} roster",
        player_id, roster.academy_id, roster.category
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn roster(starters: &[&str], substitutes: &[&str]) -> Roster {
        Roster {
            academy_id: "acad-1".into(),
            category: "U12".into(),
            starters: starters.iter().map(|s| s.to_string()).collect(),
            substitutes: substitutes.iter().map(|s| s.to_string()).collect(),
            version: 0,
        }
    }

    fn members(r: &Roster) -> BTreeSet<String> {
        r.starters.iter().chain(r.substitutes.iter()).cloned().collect()
    }

    #[test]
    fn test_enforce_promotes_in_list_order() {
        let mut r = roster(&["P1"], &["P2", "P3"]);

        assert!(r.enforce_sizes(2));

        assert_eq!(r.starters, vec!["P1", "P2"]);
        assert_eq!(r.substitutes, vec!["P3"]);
    }

    #[test]
    fn test_enforce_demotes_tail_to_bench_head() {
        let mut r = roster(&["P1", "P2", "P3", "P4"], &["P5"]);
        let before = members(&r);

        assert!(r.enforce_sizes(2));

        assert_eq!(r.starters, vec!["P1", "P2"]);
        assert_eq!(r.substitutes, vec!["P3", "P4", "P5"]);
        assert_eq!(members(&r), before);
    }

    #[test]
    fn test_enforce_with_short_bench_and_idempotence() {
        let mut r = roster(&[], &["P1", "P2"]);

        assert!(r.enforce_sizes(11));
        assert_eq!(r.starters, vec!["P1", "P2"]);
        assert!(r.substitutes.is_empty());

        let settled = r.clone();
        assert!(!r.enforce_sizes(11));
        assert_eq!(r, settled);
    }

    #[test]
    fn test_swap_exchanges_positions_either_order() {
        let mut r = roster(&["P1", "P2"], &["P3", "P4"]);
        let before = members(&r);

        r.swap("P2", "P3").unwrap();
        assert_eq!(r.starters, vec!["P1", "P3"]);
        assert_eq!(r.substitutes, vec!["P2", "P4"]);

        r.swap("P4", "P1").unwrap();
        assert_eq!(r.starters, vec!["P4", "P3"]);
        assert_eq!(r.substitutes, vec!["P2", "P1"]);
        assert_eq!(members(&r), before);
    }

    #[test]
    fn test_invalid_swaps_leave_roster_unchanged() {
        let original = roster(&["P1", "P2"], &["P3", "P4"]);

        for (a, b) in [("P1", "P2"), ("P3", "P4"), ("P1", "P9"), ("P9", "P3"), ("P1", "P1")] {
            let mut r = original.clone();
            let err = r.swap(a, b).unwrap_err();
            assert!(matches!(err, EngineError::InvalidSwap(_)), "{} <-> {}", a, b);
            assert_eq!(r, original);
        }
    }

    #[test]
    fn test_membership_edits() {
        let mut r = roster(&["P1"], &[]);

        r.add_member("P2").unwrap();
        assert!(matches!(r.add_member("P1"), Err(EngineError::Validation(_))));
        assert_eq!(r.substitutes, vec!["P2"]);

        assert_eq!(r.remove_member("P1").unwrap(), SquadRole::Starter);
        assert!(matches!(r.remove_member("P1"), Err(EngineError::NotFound { .. })));
        assert_eq!(r.len(), 1);
    }
}
