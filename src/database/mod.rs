pub mod connection;
pub mod events;
pub mod matches;
pub mod models;
pub mod rosters;
pub mod setup;
pub mod team_names;
pub mod tournaments;

pub use connection::{begin_write, create_pool, get_connection, DbConn, DbPool};
pub use models::*;
