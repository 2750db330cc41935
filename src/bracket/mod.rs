pub mod progression;
pub mod rounds;
pub mod setup;

pub use progression::{promote_winner, winner_of, PromotionOutcome, TiePolicy};
pub use rounds::{round_label, RoundGroup, RoundIndex};
pub use setup::{BracketPlan, FeedTarget, PlannedMatch};
