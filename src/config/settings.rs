use crate::bracket::TiePolicy;

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub database_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_path: "tournament_engine.db".to_string(),
        }
    }
}

/// Target squad sizes used when repairing a roster partition.
#[derive(Debug, Clone, Copy)]
pub struct RosterSettings {
    pub starters: usize,
    pub substitutes: usize,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            starters: 11,
            substitutes: 7,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BracketSettings {
    pub tie_policy: TiePolicy,
}

#[derive(Debug, Clone)]
pub struct DirectorySettings {
    pub base_url: Option<String>,
    pub user_agent: &'static str,
    pub timeout_secs: u64,
    pub rate_limit_ms: u64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            base_url: None, // name resolution disabled
            user_agent: "TournamentEngine/1.0",
            timeout_secs: 10,
            rate_limit_ms: 100, // 10 req/sec
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub store: StoreSettings,
    pub roster: RosterSettings,
    pub bracket: BracketSettings,
    pub directory: DirectorySettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by whatever the environment provides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        if let Some(path) = lookup("DATABASE_PATH") {
            config.store.database_path = path;
        }
        if let Some(starters) = parse_var(&lookup, "ROSTER_STARTERS") {
            config.roster.starters = starters;
        }
        if let Some(substitutes) = parse_var(&lookup, "ROSTER_SUBSTITUTES") {
            config.roster.substitutes = substitutes;
        }
        if let Some(policy) = parse_var(&lookup, "TIE_POLICY") {
            config.bracket.tie_policy = policy;
        }
        config.directory.base_url = lookup("TEAM_DIRECTORY_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        config
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring unparsable {}={}", key, raw);
            None
        }
    }
}
