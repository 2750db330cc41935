use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    Official,
    Coach,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Official => "official",
            Role::Coach => "coach",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "official" | "referee" => Ok(Role::Official),
            "coach" => Ok(Role::Coach),
            "viewer" | "player" => Ok(Role::Viewer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Authenticated caller, handed in by the identity layer on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    pub fn require(&self, allowed: &[Role], action: &'static str) -> EngineResult<()> {
        if allowed.contains(&self.role) {
            return Ok(());
        }
        Err(EngineError::Forbidden {
            actor: self.id.clone(),
            role: self.role,
            action,
        })
    }

    pub fn require_official(&self, action: &'static str) -> EngineResult<()> {
        self.require(&[Role::Official, Role::Admin], action)
    }

    pub fn require_coach(&self, action: &'static str) -> EngineResult<()> {
        self.require(&[Role::Coach, Role::Admin], action)
    }

    pub fn require_admin(&self, action: &'static str) -> EngineResult<()> {
        self.require(&[Role::Admin], action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_official_may_score_but_coach_may_not() {
        let official = Actor::new("ref-1", Role::Official);
        let coach = Actor::new("coach-1", Role::Coach);

        assert!(official.require_official("score a match").is_ok());
        let err = coach.require_official("score a match").unwrap_err();
        assert!(matches!(err, EngineError::Forbidden { role: Role::Coach, .. }));
    }

    #[test]
    fn test_admin_passes_every_gate() {
        let admin = Actor::new("root", Role::Admin);
        assert!(admin.require_official("x").is_ok());
        assert!(admin.require_coach("x").is_ok());
        assert!(admin.require_admin("x").is_ok());
    }

    #[test]
    fn test_role_parsing_accepts_aliases() {
        assert_eq!("Referee".parse::<Role>().unwrap(), Role::Official);
        assert_eq!("player".parse::<Role>().unwrap(), Role::Viewer);
        assert!("owner".parse::<Role>().is_err());
    }
}
