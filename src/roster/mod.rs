pub mod partition;
pub mod selection;

pub use selection::{SelectionOutcome, SwapSelection};
