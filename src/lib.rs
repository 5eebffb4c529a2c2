//! # Delve
//!
//! A seeded procedural dungeon simulation core.
//!
//! ## Architecture Overview
//!
//! Delve builds a connected grid of rooms, populates it with encounters and
//! resolves an explorer's interaction with that grid. Every random decision is
//! drawn from a single seeded stream, so a whole run is reproducible from one
//! seed.
//!
//! - **Generation**: [`GridTopologyBuilder`] grows the room graph and
//!   [`ContentAllocator`] places treasures, monsters, a boss and events.
//! - **Game**: [`ExplorerEngine`] owns the [`Map`] and the [`Explorer`] and is
//!   the only way to mutate them during play.
//! - **Snapshots**: [`Snapshot`] is the plain data shape of a running session,
//!   encoded with serde.

pub mod game;
pub mod generation;

pub use game::*;
pub use generation::*;

/// Core error type for the Delve engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Requested room count does not fit the grid
    #[error("Invalid size: cannot place {requested} rooms on a grid of {capacity} cells")]
    InvalidSize { requested: i64, capacity: i64 },

    /// Topology construction could not satisfy its invariants
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("There is no room at {0}")]
    NoRoom(Position),

    #[error("There is no passage to the {0}")]
    NoConnection(Direction),

    #[error("'{0}' is not in the inventory")]
    NotInInventory(String),

    #[error("'{0}' cannot be equipped")]
    NotEquipable(String),

    #[error("'{0}' cannot be used")]
    NotConsumable(String),

    #[error("No path leads to {0}")]
    Unreachable(Position),

    #[error("The explorer has been defeated")]
    ExplorerDefeated,
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine configuration constants.
pub mod config {
    /// Default grid width in cells
    pub const DEFAULT_GRID_WIDTH: u32 = 8;

    /// Default grid height in cells
    pub const DEFAULT_GRID_HEIGHT: u32 = 6;

    /// Default number of rooms to generate
    pub const DEFAULT_ROOM_COUNT: u32 = 12;

    /// Default explorer starting health
    pub const DEFAULT_EXPLORER_HP: u32 = 20;

    /// Default explorer base attack
    pub const DEFAULT_BASE_ATTACK: i32 = 2;

    /// Maximum nesting of auto-explored teleports
    pub const MAX_CHAIN_DEPTH: u32 = 3;

    /// Probability of redundant links when a room is placed
    pub const EXTRA_CONNECTION_CHANCE: f64 = 0.25;

    /// Frontier rebuilds allowed before falling back to direct placement
    pub const MAX_REPOPULATE_ATTEMPTS: u32 = 3;

    /// Slot used by equipable items that do not name one
    pub const DEFAULT_EQUIP_SLOT: &str = "hand";
}
