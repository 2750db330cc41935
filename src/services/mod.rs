pub mod match_service;
pub mod names;
pub mod roster_service;
pub mod server;
pub mod tournament_service;

#[cfg(test)]
pub(crate) mod testing;

pub use match_service::{MatchService, MatchUpdate};
pub use names::NameResolver;
pub use roster_service::RosterService;
pub use tournament_service::TournamentService;
