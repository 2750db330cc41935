pub mod actor;
pub mod models;
pub mod status;

pub use actor::{Actor, Role};
pub use models::*;
pub use status::MatchStatus;
