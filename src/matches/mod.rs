pub mod machine;

pub use machine::{apply_patch, ensure_open, record_event, set_score, transition, MatchCompleted, MatchPatch, NewEvent};
