//! # Generation Module
//!
//! Procedural construction of a dungeon: the room graph first, then the
//! encounters that populate it.
//!
//! Both stages take the same seeded [`StdRng`] so a whole dungeon is
//! reproducible from a single seed.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::{config, DelveResult, Map};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// An inclusive percentage range of the rooms available for content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentBand {
    pub min: f64,
    pub max: f64,
}

impl PercentBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `[ceil(min * n), floor(max * n)]`, widened to a single value when the
    /// rounded bounds cross.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::PercentBand;
    ///
    /// assert_eq!(PercentBand::new(0.20, 0.30).count_range(11), (3, 3));
    /// assert_eq!(PercentBand::new(0.05, 0.10).count_range(11), (1, 1));
    /// assert_eq!(PercentBand::new(0.20, 0.30).count_range(20), (4, 6));
    /// ```
    pub fn count_range(&self, n: usize) -> (usize, usize) {
        let low = (self.min * n as f64).ceil() as usize;
        let high = (self.max * n as f64).floor() as usize;
        (low, high.max(low))
    }
}

/// Configuration for procedural generation.
///
/// Controls grid size, room count, graph density and encounter density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Grid width in cells
    pub width: u32,
    /// Grid height in cells
    pub height: u32,
    /// Exact number of rooms to place
    pub room_count: i64,
    /// Probability of linking a new room to all its placed neighbors (0.0 to 1.0)
    pub extra_connection_chance: f64,
    /// Frontier rebuilds before falling back to direct placement
    pub max_repopulate_attempts: u32,
    /// Share of non-spawn rooms holding monsters
    pub monster_band: PercentBand,
    /// Share of non-spawn rooms holding treasure
    pub treasure_band: PercentBand,
    /// Share of non-spawn rooms holding events
    pub event_band: PercentBand,
    /// Whether portals explore the room they land in
    pub auto_explore_portals: bool,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.room_count, 12);
    /// assert!(config.room_count <= (config.width * config.height) as i64);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: config::DEFAULT_GRID_WIDTH,
            height: config::DEFAULT_GRID_HEIGHT,
            room_count: config::DEFAULT_ROOM_COUNT as i64,
            extra_connection_chance: config::EXTRA_CONNECTION_CHANCE,
            max_repopulate_attempts: config::MAX_REPOPULATE_ATTEMPTS,
            monster_band: PercentBand::new(0.20, 0.30),
            treasure_band: PercentBand::new(0.15, 0.25),
            event_band: PercentBand::new(0.05, 0.10),
            auto_explore_portals: false,
        }
    }

    /// Creates a configuration for testing with a small, fully packed grid.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            width: 4,
            height: 4,
            room_count: 16,
            ..Self::new(seed)
        }
    }

    /// Sets the grid and room count, builder style.
    pub fn with_size(mut self, width: u32, height: u32, room_count: i64) -> Self {
        self.width = width;
        self.height = height;
        self.room_count = room_count;
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Builds a connected map of exactly `count` rooms on a `width` x `height` grid.
///
/// # Examples
///
/// ```
/// let map = delve::generate(8, 6, 12, 42).unwrap();
/// assert_eq!(map.room_count(), 12);
/// assert!(map.is_fully_reachable());
/// ```
pub fn generate(width: u32, height: u32, count: i64, seed: u64) -> DelveResult<Map> {
    let config = GenerationConfig::new(seed).with_size(width, height, count);
    let mut rng = utils::create_rng(&config);
    GridTopologyBuilder::new().generate(&config, &mut rng)
}

/// Places content on `map` from its own seeded stream.
pub fn distribute(map: &mut Map, seed: u64) -> AllocationSummary {
    let mut rng = utils::rng_from_seed(seed);
    ContentAllocator::default().distribute(map, &mut rng)
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        rng_from_seed(config.seed)
    }

    pub fn rng_from_seed(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }
}
