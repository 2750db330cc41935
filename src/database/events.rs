use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::parse_text_column;
use crate::domain::{MatchEvent, MatchId};

pub fn insert_event(conn: &Connection, match_id: MatchId, event: &MatchEvent) -> Result<()> {
    let sql = "INSERT INTO match_events (match_id, seq, kind, side, player_id, recorded_by, recorded_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

    conn.execute(
        sql,
        params![
            match_id,
            event.seq,
            event.kind.as_str(),
            event.slot.as_str(),
            event.player_id,
            event.recorded_by,
            event.recorded_at
        ],
    )
    .context("Failed to insert match event")
    .map(|_| ())
}

fn parse_event_row(row: &rusqlite::Row) -> rusqlite::Result<MatchEvent> {
    Ok(MatchEvent {
        seq: row.get(0)?,
        kind: parse_text_column(row, 1)?,
        slot: parse_text_column(row, 2)?,
        player_id: row.get(3)?,
        recorded_by: row.get(4)?,
        recorded_at: row.get(5)?,
    })
}

pub fn list_for_match(conn: &Connection, match_id: MatchId) -> Result<Vec<MatchEvent>> {
    let sql = "SELECT seq, kind, side, player_id, recorded_by, recorded_at FROM match_events WHERE match_id = ?1 ORDER BY seq";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![match_id], parse_event_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
