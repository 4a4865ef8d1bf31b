//! # Table Resolution
//!
//! Which encounter table applies at a location.

use crate::{config, PowerTier, TerrainCategory};
use serde::{Deserialize, Serialize};

/// The conditions that pick a base encounter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableKey {
    /// Whether it is night
    pub night: bool,
    /// Power tier at the location
    pub power: PowerTier,
    /// Encounter terrain at the location
    pub terrain: TerrainCategory,
}

impl TableKey {
    /// Table index for these conditions.
    ///
    /// Night toggles the lowest step, power moves by two and terrain by six,
    /// so the 2 × 3 × 9 combinations with an easy-to-powerful tier fill
    /// indices 0..54.
    ///
    /// # Examples
    ///
    /// ```
    /// use overworld_encounters::{PowerTier, TableKey, TerrainCategory};
    ///
    /// let key = TableKey {
    ///     night: false,
    ///     power: PowerTier::Easy,
    ///     terrain: TerrainCategory::GreenGrasslands,
    /// };
    /// assert_eq!(key.index(), 0);
    /// ```
    pub fn index(&self) -> i32 {
        self.night as i32 + 2 * self.power.index() + 6 * self.terrain.index() - config::TABLE_INDEX_OFFSET
    }
}

/// Final table index: an override chart value wins outright, otherwise the
/// index follows from the key.
pub fn resolve_table_index(key: TableKey, override_index: Option<i32>) -> i32 {
    override_index.unwrap_or_else(|| key.index())
}
