//! Fixed game constants shared by the generator, evaluator and optimizer

/// Number of grid positions (and predictions per bet)
pub const GRID_SIZE: usize = 9;

/// Number of scoring lines over the grid
pub const LINE_COUNT: usize = 27;

/// Outcomes per match: home, draw, away
pub const OUTCOME_COUNT: usize = 3;

/// Price of a single bet in currency units (one unit per line)
pub const PRICE_PER_BET: f64 = 27.0;

/// Default number of distinct bets generated per round
pub const DEFAULT_TARGET_BETS: usize = 50;

/// Attempt budget = target count × this multiplier
pub const DEFAULT_ATTEMPT_MULTIPLIER: usize = 25;

/// Offset added to the date seed for the upset-decision stream
pub const UPSET_SEED_OFFSET: u64 = 1000;

// Linear congruential generator parameters
pub const PRNG_MULTIPLIER: u64 = 1_103_515_245;
pub const PRNG_INCREMENT: u64 = 12_345;
pub const PRNG_MODULUS: u64 = 1 << 31;
