use std::collections::HashMap;

use tempfile::TempDir;

use crate::bracket::BracketPlan;
use crate::database::{self, begin_write, DbPool};
use crate::domain::{MatchId, TournamentId};

/// A throwaway on-disk database with the schema applied.
pub(crate) struct TestStore {
    pub pool: DbPool,
    _dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.db");
        let pool = database::create_pool(path.to_str().unwrap()).unwrap();
        database::setup::ensure_schema(&pool.get().unwrap()).unwrap();
        Self { pool, _dir: dir }
    }

    /// Stores the plan and returns its match ids keyed by plan key.
    pub fn create(&self, plan: &BracketPlan) -> HashMap<String, MatchId> {
        let (_, ids) = self.create_with_id(plan);
        ids
    }

    pub fn create_with_id(&self, plan: &BracketPlan) -> (TournamentId, HashMap<String, MatchId>) {
        let mut conn = self.pool.get().unwrap();
        let tx = begin_write(&mut conn).unwrap();
        let tournament_id = plan.materialize(&tx).unwrap();
        tx.commit().unwrap();

        let mut stored = database::matches::list_by_tournament(&conn, tournament_id).unwrap();
        stored.sort_by_key(|m| m.id);
        let ids = plan
            .matches
            .iter()
            .zip(stored)
            .map(|(planned, m)| (planned.key.clone(), m.id))
            .collect();
        (tournament_id, ids)
    }

    pub fn execute(&self, sql: &str) {
        self.pool.get().unwrap().execute_batch(sql).unwrap();
    }
}
