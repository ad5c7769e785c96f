//! Grid-search optimizer over strategy parameters

pub mod search;
pub mod space;

pub use search::{rank_trials, select_diverse, GridSearch, OptimizationReport, SearchConfig, Trial};
pub use space::{ParameterAxis, ParameterPoint, ParameterSpace};
