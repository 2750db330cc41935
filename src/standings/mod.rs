pub mod table;
pub mod types;

pub use table::{compare_entries, compute_standings};
pub use types::{MatchOutcome, StandingsEntry};
