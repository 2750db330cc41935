pub mod settings;

pub use settings::{AppConfig, BracketSettings, DirectorySettings, RosterSettings, StoreSettings};
