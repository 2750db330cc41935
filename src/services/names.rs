use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::{debug, info, warn};

use crate::config::DirectorySettings;
use crate::database::{self, DbPool};
use crate::domain::TeamId;
use crate::http::directory::is_placeholder;
use crate::http::TeamDirectoryClient;

/// Display names for team ids. Reads come from the local table; ids that
/// have no usable name yet are looked up in the background.
#[derive(Clone)]
pub struct NameResolver {
    pool: DbPool,
    settings: Arc<DirectorySettings>,
    in_flight: Arc<Mutex<HashSet<TeamId>>>,
}

impl NameResolver {
    pub fn new(pool: DbPool, settings: DirectorySettings) -> Self {
        Self {
            pool,
            settings: Arc::new(settings),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.base_url.is_some()
    }

    /// Best effort: a storage error yields no names rather than failing the caller.
    pub fn lookup<'a>(&self, team_ids: impl IntoIterator<Item = &'a TeamId>) -> BTreeMap<TeamId, String> {
        let wanted: Vec<&TeamId> = team_ids.into_iter().collect();
        let stored = match self.pool.get() {
            Ok(conn) => database::team_names::find_names(&conn, wanted.iter().copied()),
            Err(err) => Err(err.into()),
        };
        let mut names = match stored {
            Ok(names) => names,
            Err(err) => {
                warn!("Could not read team names: {:#}", err);
                return BTreeMap::new();
            }
        };
        names.retain(|team_id, name| !is_placeholder(name, team_id));

        let missing: Vec<TeamId> = wanted
            .into_iter()
            .filter(|team_id| !names.contains_key(*team_id))
            .cloned()
            .collect();
        self.schedule(missing);
        names
    }

    /// Fire-and-forget fetch of the given ids. Ids already being fetched are skipped.
    pub fn schedule(&self, team_ids: Vec<TeamId>) {
        let Some(base_url) = self.settings.base_url.clone() else {
            return;
        };
        if tokio::runtime::Handle::try_current().is_err() {
            debug!("No runtime available, skipping name resolution");
            return;
        }

        let fresh: Vec<TeamId> = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            team_ids.into_iter().filter(|id| in_flight.insert(id.clone())).collect()
        };
        if fresh.is_empty() {
            return;
        }

        let resolver = self.clone();
        tokio::spawn(async move {
            resolver.resolve(&base_url, fresh).await;
        });
    }

    async fn resolve(&self, base_url: &str, team_ids: Vec<TeamId>) {
        let mut client = match TeamDirectoryClient::new(base_url, &self.settings) {
            Ok(client) => client,
            Err(err) => {
                warn!("Team directory client unavailable: {:#}", err);
                self.release(&team_ids);
                return;
            }
        };

        for team_id in &team_ids {
            match client.fetch_team_name(team_id).await {
                Ok(Some(name)) => self.store(team_id, &name),
                Ok(None) => debug!("No display name for team {}", team_id),
                Err(err) => warn!("Failed to resolve name of team {}: {:#}", team_id, err),
            }
        }
        self.release(&team_ids);
    }

    fn store(&self, team_id: &str, name: &str) {
        let result = self
            .pool
            .get()
            .map_err(anyhow::Error::from)
            .and_then(|conn| database::team_names::upsert_name(&conn, team_id, name, Utc::now()));
        match result {
            Ok(()) => info!("Resolved team {} as {}", team_id, name),
            Err(err) => warn!("Failed to store name of team {}: {:#}", team_id, err),
        }
    }

    fn release(&self, team_ids: &[TeamId]) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for team_id in team_ids {
            in_flight.remove(team_id);
        }
    }
}
