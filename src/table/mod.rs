//! # Encounter Tables
//!
//! Weighted encounter entries and the table set they live in.
//!
//! Each table covers one combination of time of day, power tier and terrain
//! (see [`TableKey`]). Entries carry a selection weight, up to five creature
//! slots and the gates deciding whether the entry may fire at all.

pub mod resolve;
pub mod selection;

pub use resolve::*;
pub use selection::*;

use crate::{config, EncounterError, EncounterResult, SpeciesId};
use serde::{Deserialize, Serialize};

/// A group of identical creatures in an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureSlot {
    /// Prototype to build the creatures from
    pub species: SpeciesId,
    /// Smallest number of creatures
    pub min_count: u32,
    /// Largest number of creatures
    pub max_count: u32,
}

impl CreatureSlot {
    /// Creates a new creature slot.
    pub fn new(species: SpeciesId, min_count: u32, max_count: u32) -> Self {
        Self {
            species,
            min_count,
            max_count,
        }
    }
}

/// One possible encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterTableEntry {
    /// Row id the entry was loaded from; also its save-game key
    pub message_id: i32,
    /// Selection weight
    pub frequency: i32,
    /// Creature groups, at most five
    pub creatures: Vec<CreatureSlot>,
    /// Lowest player level the entry fires for
    pub min_level: i32,
    /// Highest player level the entry fires for
    pub max_level: i32,
    /// Story flag that must be set, if any
    pub global_flag: Option<i32>,
    /// How often the entry may fire; None means unlimited
    pub max_trigger_count: Option<i32>,
    /// How often the entry has fired
    pub trigger_count: i32,
}

impl EncounterTableEntry {
    /// Creates an ungated entry with no creatures.
    ///
    /// # Examples
    ///
    /// ```
    /// use overworld_encounters::EncounterTableEntry;
    ///
    /// let entry = EncounterTableEntry::new(50_000, 20)
    ///     .with_creature(1042, 2, 4)
    ///     .with_levels(5, 10)
    ///     .with_max_triggers(1);
    /// assert_eq!(entry.creatures.len(), 1);
    /// assert_eq!(entry.global_flag, None);
    /// ```
    pub fn new(message_id: i32, frequency: i32) -> Self {
        Self {
            message_id,
            frequency,
            creatures: Vec::new(),
            min_level: 0,
            max_level: config::MAX_LEVEL,
            global_flag: None,
            max_trigger_count: None,
            trigger_count: 0,
        }
    }

    /// Adds a creature slot.
    pub fn with_creature(mut self, species: SpeciesId, min_count: u32, max_count: u32) -> Self {
        self.creatures.push(CreatureSlot::new(species, min_count, max_count));
        self
    }

    /// Restricts the entry to a player level range.
    pub fn with_levels(mut self, min_level: i32, max_level: i32) -> Self {
        self.min_level = min_level;
        self.max_level = max_level;
        self
    }

    /// Requires a story flag.
    pub fn with_global_flag(mut self, flag: i32) -> Self {
        self.global_flag = Some(flag);
        self
    }

    /// Caps how often the entry fires.
    pub fn with_max_triggers(mut self, max: i32) -> Self {
        self.max_trigger_count = Some(max);
        self
    }

    /// Whether the trigger cap has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.max_trigger_count
            .is_some_and(|max| self.trigger_count >= max)
    }
}

/// Ordered list of entries for one table slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterTable {
    /// Entries in selection order
    pub entries: Vec<EncounterTableEntry>,
}

impl EncounterTable {
    /// Creates a table from its entries.
    pub fn new(entries: Vec<EncounterTableEntry>) -> Self {
        Self { entries }
    }

    /// Records that an entry fired.
    pub fn record_trigger(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.trigger_count += 1;
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All encounter tables, fixed in size once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSet {
    tables: Vec<EncounterTable>,
}

impl TableSet {
    /// Creates a table set.
    pub fn new(tables: Vec<EncounterTable>) -> Self {
        Self { tables }
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the set has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Validates a resolved table index.
    pub fn checked_index(&self, index: i32) -> EncounterResult<usize> {
        usize::try_from(index)
            .ok()
            .filter(|index| *index < self.tables.len())
            .ok_or(EncounterError::TableOutOfBounds {
                index,
                count: self.tables.len(),
            })
    }

    /// Table at a position.
    pub fn table(&self, index: usize) -> Option<&EncounterTable> {
        self.tables.get(index)
    }

    /// Mutable table at a position.
    pub fn table_mut(&mut self, index: usize) -> Option<&mut EncounterTable> {
        self.tables.get_mut(index)
    }

    /// Every table in index order.
    pub fn tables(&self) -> &[EncounterTable] {
        &self.tables
    }

    /// Every entry of every table, in table order.
    pub fn entries(&self) -> impl Iterator<Item = &EncounterTableEntry> {
        self.tables.iter().flat_map(|table| table.entries.iter())
    }

    /// Mutable access to every entry of every table.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut EncounterTableEntry> {
        self.tables.iter_mut().flat_map(|table| table.entries.iter_mut())
    }

    /// Finds an entry by its row id.
    pub fn entry_by_message_id(&self, message_id: i32) -> Option<&EncounterTableEntry> {
        self.entries().find(|entry| entry.message_id == message_id)
    }
}
