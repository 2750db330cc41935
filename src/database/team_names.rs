use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::TeamId;

pub fn upsert_name(conn: &Connection, team_id: &str, name: &str, resolved_at: DateTime<Utc>) -> Result<()> {
    let sql = "INSERT INTO team_names (team_id, name, resolved_at) VALUES (?1, ?2, ?3)
        ON CONFLICT (team_id) DO UPDATE SET name = excluded.name, resolved_at = excluded.resolved_at";

    conn.execute(sql, params![team_id, name, resolved_at])
        .context("Failed to store team name")
        .map(|_| ())
}

pub fn find_name(conn: &Connection, team_id: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT name FROM team_names WHERE team_id = ?1",
        params![team_id],
        |row| row.get(0),
    )
    .optional()
    .context("Failed to query team name")
}

/// Stored names for the given ids; ids without a row are simply absent.
pub fn find_names<'a>(
    conn: &Connection,
    team_ids: impl IntoIterator<Item = &'a TeamId>,
) -> Result<BTreeMap<TeamId, String>> {
    let mut names = BTreeMap::new();
    for team_id in team_ids {
        if names.contains_key(team_id) {
            continue;
        }
        if let Some(name) = find_name(conn, team_id)? {
            names.insert(team_id.clone(), name);
        }
    }
    Ok(names)
}
