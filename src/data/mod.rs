//! Dataset loading: historical rounds and team histories

pub mod history;
pub mod rounds;

// Re-export commonly used types
pub use history::{
    load_team_histories, normalize_team_name, MatchResult, Streak, TeamForm, TeamFormLookup,
    TeamHistoryIndex, TeamMatch,
};
pub use rounds::{extract_date, load_round_file, load_rounds_dir, RoundDataset, RoundRecord};
