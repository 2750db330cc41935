use std::collections::{BTreeMap, HashMap, HashSet};

use log::info;
use rusqlite::Connection;
use serde::Deserialize;

use crate::database::{self, FeedLink, NewMatch};
use crate::domain::{MatchId, Side, TeamId, TournamentId, TournamentKind};
use crate::errors::{EngineError, EngineResult};

/// A tournament together with its full match tree, as handed over by the
/// organiser. Pairings are taken as given.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketPlan {
    pub name: String,
    pub category: String,
    pub kind: TournamentKind,
    pub matches: Vec<PlannedMatch>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedMatch {
    /// Caller-chosen key, only meaningful inside the plan.
    pub key: String,
    pub round: u32,
    #[serde(default)]
    pub slot_a: Option<TeamId>,
    #[serde(default)]
    pub slot_b: Option<TeamId>,
    #[serde(default)]
    pub feeds: Option<FeedTarget>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedTarget {
    pub key: String,
    pub position: Side,
}

impl PlannedMatch {
    fn slot(&self, side: Side) -> Option<&TeamId> {
        match side {
            Side::A => self.slot_a.as_ref(),
            Side::B => self.slot_b.as_ref(),
        }
    }
}

fn invalid(message: String) -> EngineError {
    EngineError::Validation(message)
}

impl BracketPlan {
    pub fn validate(&self) -> EngineResult<()> {
        if self.name.trim().is_empty() || self.category.trim().is_empty() {
            return Err(invalid("tournament name and category are required".into()));
        }
        if self.matches.is_empty() {
            return Err(invalid("a bracket needs at least one match".into()));
        }

        let mut by_key: HashMap<&str, &PlannedMatch> = HashMap::new();
        for m in &self.matches {
            if m.round == 0 {
                return Err(invalid(format!("match {}: rounds start at 1", m.key)));
            }
            if by_key.insert(m.key.as_str(), m).is_some() {
                return Err(invalid(format!("duplicate match key {}", m.key)));
            }
        }

        self.validate_pairings()?;
        self.validate_feeds(&by_key)
    }

    fn validate_pairings(&self) -> EngineResult<()> {
        let mut seen: BTreeMap<u32, HashSet<&str>> = BTreeMap::new();

        for m in &self.matches {
            if m.slot_a.is_some() && m.slot_a == m.slot_b {
                return Err(invalid(format!("match {}: a team cannot face itself", m.key)));
            }
            for team in m.slot_a.iter().chain(m.slot_b.iter()) {
                if team.trim().is_empty() {
                    return Err(invalid(format!("match {}: empty team id", m.key)));
                }
                if !seen.entry(m.round).or_default().insert(team.as_str()) {
                    return Err(invalid(format!(
                        "team {} appears more than once in round {}",
                        team, m.round
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_feeds(&self, by_key: &HashMap<&str, &PlannedMatch>) -> EngineResult<()> {
        let mut fed_slots: HashSet<(&str, Side)> = HashSet::new();

        for m in &self.matches {
            let Some(feed) = &m.feeds else { continue };

            if self.kind == TournamentKind::League {
                return Err(invalid(format!("match {}: league matches do not feed successors", m.key)));
            }
            let target = by_key
                .get(feed.key.as_str())
                .ok_or_else(|| invalid(format!("match {} feeds unknown match {}", m.key, feed.key)))?;
            if target.round <= m.round {
                return Err(invalid(format!(
                    "match {} (round {}) must feed a later round, not {} (round {})",
                    m.key, m.round, target.key, target.round
                )));
            }
            if !fed_slots.insert((feed.key.as_str(), feed.position)) {
                return Err(invalid(format!(
                    "{} of match {} is fed by more than one match",
                    feed.position, feed.key
                )));
            }
            if target.slot(feed.position).is_some() {
                return Err(invalid(format!(
                    "{} of match {} is fed by match {} and must start TBD",
                    feed.position, feed.key, m.key
                )));
            }
        }
        Ok(())
    }

    /// Inserts the tournament and its matches, then wires the feed links.
    /// Run it inside a write transaction so a failure leaves nothing behind.
    pub fn materialize(&self, conn: &Connection) -> EngineResult<TournamentId> {
        self.validate()?;

        let tournament_id = database::tournaments::insert_tournament(conn, &self.name, &self.category, self.kind)?;

        let mut ids: HashMap<&str, MatchId> = HashMap::new();
        for m in &self.matches {
            let new_match = NewMatch {
                tournament_id,
                round: m.round,
                slot_a: m.slot_a.clone(),
                slot_b: m.slot_b.clone(),
            };
            ids.insert(m.key.as_str(), database::matches::insert_match(conn, &new_match)?);
        }

        for m in &self.matches {
            let Some(feed) = &m.feeds else { continue };
            let link = FeedLink {
                match_id: ids[m.key.as_str()],
                next_match_id: ids[feed.key.as_str()],
                position: feed.position,
            };
            database::matches::set_feed(conn, &link)?;
        }

        database::tournaments::mark_bracket_generated(conn, tournament_id)?;
        info!(
            "Created {} tournament {} ({}) with {} matches",
            self.kind.as_str(),
            tournament_id,
            self.name,
            self.matches.len()
        );
        Ok(tournament_id)
    }
}
