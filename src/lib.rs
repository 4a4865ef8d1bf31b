//! # Overworld Encounters
//!
//! Random encounter engine for overworld travel.
//!
//! ## Architecture Overview
//!
//! While the player travels the world map a recurring timer asks the engine
//! whether something hostile shows up. Answering that question takes a few
//! independent pieces:
//!
//! - **Charts**: radius-sorted zones answering "what value applies here?"
//!   for encounter frequency, power tier and table overrides
//! - **Terrain**: classification of a map sector into an encounter terrain
//! - **Tables**: weighted encounter entries gated by level, story flags and
//!   per-entry trigger caps
//! - **Spawning**: a pure placement plan followed by object creation through
//!   the host's services
//! - **Engine**: the state machine tying it together, plus trigger-count
//!   persistence and the self-rescheduling timer
//!
//! The host game is reached only through the traits in [`world`], so the
//! engine can run against the in-memory [`SimWorld`] as easily as against a
//! real game.

pub mod chart;
pub mod engine;
pub mod rules;
pub mod spawn;
pub mod table;
pub mod terrain;
pub mod world;

pub use chart::*;
pub use engine::*;
pub use rules::*;
pub use spawn::*;
pub use table::*;
pub use terrain::*;
pub use world::*;

/// Core error type for the encounter engine.
#[derive(thiserror::Error, Debug)]
pub enum EncounterError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Rules resource could not be parsed
    #[error("Rules error: {0}")]
    Config(#[from] ConfigError),

    /// Resolved table index does not name a loaded table
    #[error("Encounter table {index} out of bounds ({count} tables loaded)")]
    TableOutOfBounds { index: i32, count: usize },

    /// The host has no creature prototype for a configured species
    #[error("No creature prototype for species {species}")]
    MissingCreaturePrototype { species: SpeciesId },

    /// Save data is truncated or inconsistent
    #[error("Invalid save data: {0}")]
    SaveData(String),
}

/// Result type used throughout the encounter engine.
pub type EncounterResult<T> = Result<T, EncounterError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed layout constants of the rules resource.
pub mod config {
    /// First row of the frequency chart
    pub const FREQUENCY_CHART_BASE: i32 = 10_000;

    /// First row of the power chart
    pub const POWER_CHART_BASE: i32 = 20_000;

    /// First row of the table override chart
    pub const OVERRIDE_CHART_BASE: i32 = 30_000;

    /// Number of row ids reserved for each chart
    pub const CHART_WINDOW: i32 = 10_000;

    /// Row holding the number of extra tables beyond the base set
    pub const TABLE_COUNT_ROW: i32 = 49_999;

    /// First row of table 0
    pub const FIRST_TABLE_ROW: i32 = 50_000;

    /// Row ids reserved per table
    pub const TABLE_STRIDE: i32 = 100;

    /// Tables addressed by the (night, power, terrain) formula
    pub const BASE_TABLE_COUNT: usize = 54;

    /// Subtracted from the table formula so the first table is index 0
    pub const TABLE_INDEX_OFFSET: i32 = 8;

    /// Upper bound for `MinLevel:` and `MaxLevel:`
    pub const MAX_LEVEL: i32 = 32_000;

    /// Upper bound for `GlobalFlag:`
    pub const MAX_GLOBAL_FLAG: i32 = 3_200;

    /// Creature slot labels, in the order they must appear
    pub const CREATURE_SLOT_LABELS: [&str; 5] = ["First:", "Second:", "Third:", "Fourth:", "Fifth:"];

    /// Symbolic values accepted by the power chart
    pub const POWER_TOKENS: [&str; 4] = ["none", "easy", "average", "powerful"];
}
