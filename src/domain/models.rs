use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::MatchStatus;

pub type TournamentId = i64;
pub type MatchId = i64;
pub type TeamId = String;
pub type PlayerId = String;

/// One of the two team slots of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    #[serde(alias = "slotA", alias = "a")]
    A,
    #[serde(alias = "slotB", alias = "b")]
    B,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot{}", self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Side::A),
            "B" => Ok(Side::B),
            other => Err(format!("unknown slot: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TournamentKind {
    Knockout,
    League,
}

impl TournamentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentKind::Knockout => "knockout",
            TournamentKind::League => "league",
        }
    }
}

impl FromStr for TournamentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "knockout" => Ok(TournamentKind::Knockout),
            "league" => Ok(TournamentKind::League),
            other => Err(format!("unknown tournament kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub category: String,
    pub kind: TournamentKind,
    pub rounds: Vec<u32>,
    pub bracket_generated: bool,
}

/// Scoring event kinds an official can record against a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Goal,
    Assist,
    Offside,
    YellowCard,
    RedCard,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Goal => "goal",
            EventKind::Assist => "assist",
            EventKind::Offside => "offside",
            EventKind::YellowCard => "yellowCard",
            EventKind::RedCard => "redCard",
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "goal" => Ok(EventKind::Goal),
            "assist" => Ok(EventKind::Assist),
            "offside" => Ok(EventKind::Offside),
            "yellowCard" => Ok(EventKind::YellowCard),
            "redCard" => Ok(EventKind::RedCard),
            other => Err(format!("unknown event kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    pub seq: u32,
    pub kind: EventKind,
    pub slot: Side,
    pub player_id: PlayerId,
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}

/// Per-side counters kept next to the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideStats {
    pub assists: u32,
    pub offsides: u32,
    pub corners: u32,
    pub penalties: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round: u32,
    pub slot_a: Option<TeamId>,
    pub slot_b: Option<TeamId>,
    pub score_a: u32,
    pub score_b: u32,
    pub status: MatchStatus,
    pub next_match_id: Option<MatchId>,
    pub position_in_next: Option<Side>,
    pub stats_a: SideStats,
    pub stats_b: SideStats,
    pub events: Vec<MatchEvent>,
    pub version: i64,
}

impl Match {
    pub fn slot(&self, side: Side) -> Option<&TeamId> {
        match side {
            Side::A => self.slot_a.as_ref(),
            Side::B => self.slot_b.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut Option<TeamId> {
        match side {
            Side::A => &mut self.slot_a,
            Side::B => &mut self.slot_b,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::A => self.score_a,
            Side::B => self.score_b,
        }
    }

    pub fn score_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::A => &mut self.score_a,
            Side::B => &mut self.score_b,
        }
    }

    pub fn stats_mut(&mut self, side: Side) -> &mut SideStats {
        match side {
            Side::A => &mut self.stats_a,
            Side::B => &mut self.stats_b,
        }
    }

    pub fn teams(&self) -> impl Iterator<Item = &TeamId> {
        self.slot_a.iter().chain(self.slot_b.iter())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Starter/substitute partition of one academy's squad in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub academy_id: String,
    pub category: String,
    pub starters: Vec<PlayerId>,
    pub substitutes: Vec<PlayerId>,
    pub version: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquadRole {
    Starter,
    Substitute,
}

impl SquadRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SquadRole::Starter => "starter",
            SquadRole::Substitute => "substitute",
        }
    }
}

impl FromStr for SquadRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(SquadRole::Starter),
            "substitute" => Ok(SquadRole::Substitute),
            other => Err(format!("unknown squad role: {}", other)),
        }
    }
}
