use std::str::FromStr;

use crate::domain::{MatchId, Side, TeamId, TournamentId};

/// Row data for a match created during bracket setup.
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub tournament_id: TournamentId,
    pub round: u32,
    pub slot_a: Option<TeamId>,
    pub slot_b: Option<TeamId>,
}

#[derive(Debug, Clone, Copy)]
pub struct FeedLink {
    pub match_id: MatchId,
    pub next_match_id: MatchId,
    pub position: Side,
}

/// Reads a TEXT column holding one of our string-encoded enums.
pub fn parse_text_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

pub fn parse_optional_text_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|value| {
        value.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
        })
    })
    .transpose()
}
