use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::events;
use super::models::{parse_optional_text_column, parse_text_column, FeedLink, NewMatch};
use crate::domain::{Match, MatchId, MatchStatus, Side, SideStats, TeamId, TournamentId};

const MATCH_COLUMNS: &str = "id, tournament_id, round, slot_a, slot_b, score_a, score_b, status, next_match_id, position_in_next, assists_a, assists_b, offsides_a, offsides_b, corners_a, corners_b, penalties_a, penalties_b, version";

pub fn insert_match(conn: &Connection, new_match: &NewMatch) -> Result<MatchId> {
    let sql = "INSERT INTO matches (tournament_id, round, slot_a, slot_b) VALUES (?1, ?2, ?3, ?4) RETURNING id";

    conn.query_row(
        sql,
        params![
            new_match.tournament_id,
            new_match.round,
            new_match.slot_a,
            new_match.slot_b
        ],
        |row| row.get(0),
    )
    .context("Failed to insert match")
}

pub fn set_feed(conn: &Connection, link: &FeedLink) -> Result<()> {
    let sql = "UPDATE matches SET next_match_id = ?2, position_in_next = ?3 WHERE id = ?1";

    conn.execute(
        sql,
        params![link.match_id, link.next_match_id, link.position.as_str()],
    )
    .context("Failed to link match to its successor")
    .map(|_| ())
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        round: row.get(2)?,
        slot_a: row.get(3)?,
        slot_b: row.get(4)?,
        score_a: row.get(5)?,
        score_b: row.get(6)?,
        status: parse_text_column(row, 7)?,
        next_match_id: row.get(8)?,
        position_in_next: parse_optional_text_column(row, 9)?,
        stats_a: SideStats {
            assists: row.get(10)?,
            offsides: row.get(12)?,
            corners: row.get(14)?,
            penalties: row.get(16)?,
        },
        stats_b: SideStats {
            assists: row.get(11)?,
            offsides: row.get(13)?,
            corners: row.get(15)?,
            penalties: row.get(17)?,
        },
        events: Vec::new(),
        version: row.get(18)?,
    })
}

pub fn find_by_id(conn: &Connection, id: MatchId) -> Result<Option<Match>> {
    let sql = format!("SELECT {} FROM matches WHERE id = ?1", MATCH_COLUMNS);

    let found = conn
        .query_row(&sql, params![id], parse_match_row)
        .optional()
        .context("Failed to query match by id")?;

    match found {
        Some(mut m) => {
            m.events = events::list_for_match(conn, m.id)?;
            Ok(Some(m))
        }
        None => Ok(None),
    }
}

/// All matches of a tournament ordered by round, then id.
pub fn list_by_tournament(conn: &Connection, tournament_id: TournamentId) -> Result<Vec<Match>> {
    let sql = format!(
        "SELECT {} FROM matches WHERE tournament_id = ?1 ORDER BY round, id",
        MATCH_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt
        .query_map(params![tournament_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for m in rows.iter_mut() {
        m.events = events::list_for_match(conn, m.id)?;
    }

    Ok(rows)
}

/// Writes every mutable column, guarded by the version the caller read.
/// Returns false when the row moved on in the meantime.
pub fn update_match(conn: &Connection, m: &Match) -> Result<bool> {
    let sql = "UPDATE matches SET
            slot_a = ?3, slot_b = ?4, score_a = ?5, score_b = ?6, status = ?7,
            assists_a = ?8, assists_b = ?9, offsides_a = ?10, offsides_b = ?11,
            corners_a = ?12, corners_b = ?13, penalties_a = ?14, penalties_b = ?15,
            version = version + 1
        WHERE id = ?1 AND version = ?2";

    let changed = conn
        .execute(
            sql,
            params![
                m.id,
                m.version,
                m.slot_a,
                m.slot_b,
                m.score_a,
                m.score_b,
                m.status.as_str(),
                m.stats_a.assists,
                m.stats_b.assists,
                m.stats_a.offsides,
                m.stats_b.offsides,
                m.stats_a.corners,
                m.stats_b.corners,
                m.stats_a.penalties,
                m.stats_b.penalties,
            ],
        )
        .context("Failed to update match")?;

    Ok(changed == 1)
}

/// Binds `team` to the slot only while it is still TBD.
pub fn fill_empty_slot(conn: &Connection, id: MatchId, side: Side, team: &TeamId) -> Result<bool> {
    let sql = match side {
        Side::A => "UPDATE matches SET slot_a = ?2, version = version + 1 WHERE id = ?1 AND slot_a IS NULL",
        Side::B => "UPDATE matches SET slot_b = ?2, version = version + 1 WHERE id = ?1 AND slot_b IS NULL",
    };

    let changed = conn
        .execute(sql, params![id, team])
        .context("Failed to fill successor slot")?;

    Ok(changed == 1)
}

/// Matches whose winner is routed into `id`, with the slot each one feeds.
pub fn list_feeders(conn: &Connection, id: MatchId) -> Result<Vec<(MatchId, Side, MatchStatus)>> {
    let sql = "SELECT id, position_in_next, status FROM matches WHERE next_match_id = ?1 ORDER BY id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![id], |row| {
            Ok((
                row.get(0)?,
                parse_text_column(row, 1)?,
                parse_text_column(row, 2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Teams bound to non-cancelled matches of a round, other than `exclude`.
pub fn teams_in_round(
    conn: &Connection,
    tournament_id: TournamentId,
    round: u32,
    exclude: MatchId,
) -> Result<Vec<TeamId>> {
    let sql = "SELECT slot_a, slot_b FROM matches
        WHERE tournament_id = ?1 AND round = ?2 AND id != ?3 AND status != 'CANCELLED'";

    let mut stmt = conn.prepare(sql)?;
    let pairs = stmt
        .query_map(params![tournament_id, round, exclude], |row| {
            Ok((row.get::<_, Option<TeamId>>(0)?, row.get::<_, Option<TeamId>>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(pairs
        .into_iter()
        .flat_map(|(a, b)| a.into_iter().chain(b))
        .collect())
}
