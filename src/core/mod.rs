//! Core engine building blocks: constants, probability model, grid and PRNG

pub mod constants;
pub mod grid;
pub mod probability;
pub mod rng;

// Re-export commonly used types
pub use constants::{GRID_SIZE, LINE_COUNT, PRICE_PER_BET};
pub use grid::{lines, select_grid, GridPolicy, GridSelection, Line};
pub use probability::{implied_probabilities, Probability};
pub use rng::{date_seed, DrawStreams, SeededStream};
