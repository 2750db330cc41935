pub mod client;
pub mod directory;

pub use client::RateLimitedClient;
pub use directory::TeamDirectoryClient;
