use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::parse_text_column;
use crate::domain::{Tournament, TournamentId, TournamentKind};

pub fn insert_tournament(
    conn: &Connection,
    name: &str,
    category: &str,
    kind: TournamentKind,
) -> Result<TournamentId> {
    let sql = "INSERT INTO tournaments (name, category, kind) VALUES (?1, ?2, ?3) RETURNING id";

    conn.query_row(sql, params![name, category, kind.as_str()], |row| row.get(0))
        .context("Failed to insert tournament")
}

pub fn mark_bracket_generated(conn: &Connection, id: TournamentId) -> Result<()> {
    conn.execute(
        "UPDATE tournaments SET bracket_generated = 1 WHERE id = ?1",
        params![id],
    )
    .context("Failed to mark bracket as generated")
    .map(|_| ())
}

pub fn find_by_id(conn: &Connection, id: TournamentId) -> Result<Option<Tournament>> {
    let sql = "SELECT id, name, category, kind, bracket_generated FROM tournaments WHERE id = ?1";

    conn.query_row(sql, params![id], parse_tournament_row)
        .optional()
        .context("Failed to query tournament by id")
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    Ok(Tournament {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        kind: parse_text_column(row, 3)?,
        rounds: Vec::new(),
        bracket_generated: row.get(4)?,
    })
}
