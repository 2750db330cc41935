use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::parse_text_column;
use crate::domain::{PlayerId, Roster, SquadRole};

pub fn find_roster(conn: &Connection, academy_id: &str, category: &str) -> Result<Option<Roster>> {
    let sql = "SELECT version FROM rosters WHERE academy_id = ?1 AND category = ?2";

    let version: Option<i64> = conn
        .query_row(sql, params![academy_id, category], |row| row.get(0))
        .optional()
        .context("Failed to query roster")?;

    let Some(version) = version else {
        return Ok(None);
    };

    let mut roster = Roster {
        academy_id: academy_id.to_string(),
        category: category.to_string(),
        starters: Vec::new(),
        substitutes: Vec::new(),
        version,
    };

    for (player_id, role) in list_members(conn, academy_id, category)? {
        match role {
            SquadRole::Starter => roster.starters.push(player_id),
            SquadRole::Substitute => roster.substitutes.push(player_id),
        }
    }

    Ok(Some(roster))
}

fn list_members(conn: &Connection, academy_id: &str, category: &str) -> Result<Vec<(PlayerId, SquadRole)>> {
    let sql = "SELECT player_id, role FROM roster_members WHERE academy_id = ?1 AND category = ?2 ORDER BY role, position";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![academy_id, category], |row| {
            Ok((row.get(0)?, parse_text_column(row, 1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn create_roster(conn: &Connection, academy_id: &str, category: &str) -> Result<Roster> {
    conn.execute(
        "INSERT INTO rosters (academy_id, category) VALUES (?1, ?2) ON CONFLICT DO NOTHING",
        params![academy_id, category],
    )
    .context("Failed to create roster")?;

    find_roster(conn, academy_id, category)?
        .ok_or_else(|| anyhow::anyhow!("Roster {}/{} vanished after insert", academy_id, category))
}

/// Replaces the stored partition with `roster` in one go.
/// Returns false if the stored version no longer matches `roster.version`.
pub fn save_partition(conn: &Connection, roster: &Roster) -> Result<bool> {
    let bumped = conn
        .execute(
            "UPDATE rosters SET version = version + 1 WHERE academy_id = ?1 AND category = ?2 AND version = ?3",
            params![roster.academy_id, roster.category, roster.version],
        )
        .context("Failed to bump roster version")?;
    if bumped != 1 {
        return Ok(false);
    }

    conn.execute(
        "DELETE FROM roster_members WHERE academy_id = ?1 AND category = ?2",
        params![roster.academy_id, roster.category],
    )
    .context("Failed to clear roster members")?;

    let mut stmt = conn.prepare(
        "INSERT INTO roster_members (academy_id, category, player_id, role, position) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    let partitions = [
        (SquadRole::Starter, &roster.starters),
        (SquadRole::Substitute, &roster.substitutes),
    ];

    for (role, members) in partitions {
        for (position, player_id) in members.iter().enumerate() {
            stmt.execute(params![
                roster.academy_id,
                roster.category,
                player_id,
                role.as_str(),
                position
            ])
            .with_context(|| format!("Failed to store roster member {}", player_id))?;
        }
    }

    Ok(true)
}
