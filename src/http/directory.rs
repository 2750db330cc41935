use anyhow::{Context, Result};
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;

use super::RateLimitedClient;
use crate::config::DirectorySettings;

#[derive(Debug, Deserialize)]
struct TeamRecord {
    name: Option<String>,
}

/// Client for the external team directory (`GET {base}/teams/{id}`).
pub struct TeamDirectoryClient {
    client: RateLimitedClient,
    base_url: String,
}

impl TeamDirectoryClient {
    pub fn new(base_url: &str, settings: &DirectorySettings) -> Result<Self> {
        let client = RateLimitedClient::from_settings(settings)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The directory's display name for `team_id`, or None if it has no usable one.
    pub async fn fetch_team_name(&mut self, team_id: &str) -> Result<Option<String>> {
        let url = self.team_url(team_id);
        let response = self.client.get(&url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Team {} is not in the directory", team_id);
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .with_context(|| format!("Directory lookup for team {} failed", team_id))?;
        let record: TeamRecord = response
            .json()
            .await
            .with_context(|| format!("Malformed directory record for team {}", team_id))?;

        Ok(record.name.map(|name| name.trim().to_string()).filter(|name| !is_placeholder(name, team_id)))
    }

    fn team_url(&self, team_id: &str) -> String {
        format!("{}/teams/{}", self.base_url, urlencoding::encode(team_id))
    }
}

/// Names that carry no information beyond the id itself.
pub fn is_placeholder(name: &str, team_id: &str) -> bool {
    let name = name.trim();
    name.is_empty()
        || name == team_id
        || name.eq_ignore_ascii_case("tbd")
        || name.eq_ignore_ascii_case("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_ids_are_escaped_in_urls() {
        let client = TeamDirectoryClient::new("https://teams.example.org/", &DirectorySettings::default()).unwrap();

        assert_eq!(
            client.team_url("north fc/u10"),
            "https://teams.example.org/teams/north%20fc%2Fu10"
        );
    }

    #[test]
    fn test_placeholder_names() {
        assert!(is_placeholder("  ", "t1"));
        assert!(is_placeholder("t1", "t1"));
        assert!(is_placeholder("TBD", "t1"));
        assert!(!is_placeholder("Northside Juniors", "t1"));
    }
}
