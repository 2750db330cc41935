use log::info;
use rusqlite::Connection;

use crate::config::RosterSettings;
use crate::database::{self, begin_write, DbPool};
use crate::domain::{Actor, Roster, SquadRole};
use crate::errors::{EngineError, EngineResult};

pub struct RosterService<'a> {
    pool: &'a DbPool,
    settings: RosterSettings,
}

impl<'a> RosterService<'a> {
    pub fn new(pool: &'a DbPool, settings: RosterSettings) -> Self {
        Self { pool, settings }
    }

    /// Loads the team sheet, repairing the starter count first if it drifted.
    pub fn team_sheet(&self, academy_id: &str, category: &str) -> EngineResult<Roster> {
        let mut conn = self.pool.get()?;
        let tx = begin_write(&mut conn)?;
        let mut roster = load(&tx, academy_id, category)?;
        if roster.enforce_sizes(self.settings.starters) {
            save(&tx, &mut roster)?;
            info!(
                "Rebalanced roster {}/{} to {} starters",
                academy_id,
                category,
                roster.starters.len()
            );
        }
        tx.commit()?;
        Ok(roster)
    }

    /// Exchanges a starter and a substitute. On error nothing is stored.
    pub fn swap(&self, actor: &Actor, academy_id: &str, category: &str, id_a: &str, id_b: &str) -> EngineResult<Roster> {
        actor.require_coach("edit a roster")?;

        let mut conn = self.pool.get()?;
        let tx = begin_write(&mut conn)?;
        let mut roster = load(&tx, academy_id, category)?;
        roster.enforce_sizes(self.settings.starters);
        roster.swap(id_a, id_b)?;
        save(&tx, &mut roster)?;
        tx.commit()?;

        info!("{} swapped {} and {} in roster {}/{}", actor.id, id_a, id_b, academy_id, category);
        Ok(roster)
    }

    /// Signs a player onto the bench, creating the roster on first use.
    pub fn add_player(&self, actor: &Actor, academy_id: &str, category: &str, player_id: &str) -> EngineResult<Roster> {
        actor.require_coach("edit a roster")?;
        check_key(academy_id, category)?;

        let mut conn = self.pool.get()?;
        let tx = begin_write(&mut conn)?;
        let mut roster = match database::rosters::find_roster(&tx, academy_id, category)? {
            Some(roster) => roster,
            None => database::rosters::create_roster(&tx, academy_id, category)?,
        };
        roster.add_member(player_id)?;
        roster.enforce_sizes(self.settings.starters);
        save(&tx, &mut roster)?;
        tx.commit()?;

        info!("{} added {} to roster {}/{}", actor.id, player_id.trim(), academy_id, category);
        Ok(roster)
    }

    pub fn remove_player(&self, actor: &Actor, academy_id: &str, category: &str, player_id: &str) -> EngineResult<Roster> {
        actor.require_coach("edit a roster")?;

        let mut conn = self.pool.get()?;
        let tx = begin_write(&mut conn)?;
        let mut roster = load(&tx, academy_id, category)?;
        let role = roster.remove_member(player_id)?;
        if role == SquadRole::Starter {
            roster.enforce_sizes(self.settings.starters);
        }
        save(&tx, &mut roster)?;
        tx.commit()?;

        info!(
            "{} removed {} ({}) from roster {}/{}",
            actor.id,
            player_id,
            role.as_str(),
            academy_id,
            category
        );
        Ok(roster)
    }
}

fn check_key(academy_id: &str, category: &str) -> EngineResult<()> {
    if academy_id.trim().is_empty() || category.trim().is_empty() {
        return Err(EngineError::Validation("academy and category are required".into()));
    }
    Ok(())
}

fn load(conn: &Connection, academy_id: &str, category: &str) -> EngineResult<Roster> {
    database::rosters::find_roster(conn, academy_id, category)?
        .ok_or_else(|| EngineError::not_found("roster", format!("{}/{}", academy_id, category)))
}

fn save(conn: &Connection, roster: &mut Roster) -> EngineResult<()> {
    if !database::rosters::save_partition(conn, roster)? {
        let found = load(conn, &roster.academy_id, &roster.category)?.version;
        return Err(EngineError::Conflict {
            entity: "roster",
            id: format!("{}/{}", roster.academy_id, roster.category),
            expected: roster.version,
            found,
        });
    }
    roster.version += 1;
    Ok(())
}
