//! # Encounter Engine
//!
//! The state machine owning the loaded rules and answering "does an
//! encounter happen here?".
//!
//! An engine starts out uninitialized. Loading rules makes it active, a bad
//! rules resource or an explicit [`EncounterEngine::disable`] makes it
//! disabled for good. Only an active engine ever fires encounters.

pub mod persistence;
pub mod scheduler;

pub use persistence::*;
pub use scheduler::*;

use crate::{
    classify_terrain, resolve_table_index, select_entry, Dice, EncounterError, EncounterResult,
    EncounterRules, Host, Position, PowerTier, RulesFile, RulesLoader, SpawnedCreature, Spawner,
    TableKey,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables of the encounter engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Percent chance per check where the frequency chart has no zone
    pub default_frequency: i32,
    /// Factor applied to the frequency while the player sleeps
    pub sleeping_frequency_multiplier: i32,
    /// Tier used where the power chart has no zone
    pub default_power: PowerTier,
    /// Shortest re-arm delay, in delay units
    pub min_rearm_delay: i32,
    /// Longest re-arm delay, in delay units
    pub max_rearm_delay: i32,
    /// Length of one delay unit in milliseconds
    pub rearm_unit_ms: u64,
    /// Distance from the player to the first creature of a formation
    pub baseline_offset: i32,
    /// How far from the player to look for a free tile when a creature's
    /// tile is blocked
    pub search_radius: u32,
    /// Skip a creature slot whose prototype is missing instead of failing
    pub skip_missing_prototypes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_frequency: 5,
            sleeping_frequency_multiplier: 5,
            default_power: PowerTier::Average,
            min_rearm_delay: 300,
            max_rearm_delay: 700,
            rearm_unit_ms: 60_000,
            baseline_offset: 6,
            search_radius: 6,
            skip_missing_prototypes: true,
        }
    }
}

impl EngineConfig {
    /// Create a config suitable for testing
    ///
    /// Missing prototypes are errors so broken fixtures fail loudly, and
    /// delays are counted in seconds.
    pub fn for_testing() -> Self {
        Self {
            rearm_unit_ms: 1_000,
            skip_missing_prototypes: false,
            ..Self::default()
        }
    }

    /// Spawner configured from these settings.
    pub fn spawner(&self) -> Spawner {
        Spawner {
            baseline_offset: self.baseline_offset,
            search_radius: self.search_radius,
            skip_missing_prototypes: self.skip_missing_prototypes,
        }
    }
}

/// Lifecycle state of the engine, with the rules it owns when active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EngineState {
    /// No rules loaded yet
    #[default]
    Uninitialized,
    /// Turned off, explicitly or by a bad rules resource
    Disabled,
    /// Rules loaded, encounters may fire
    Active(EncounterRules),
}

/// Lifecycle state without the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineStatus {
    Uninitialized,
    Disabled,
    Active,
}

/// An encounter that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    /// Table the entry was picked from
    pub table_index: usize,
    /// Row id of the entry that fired
    pub message_id: i32,
    /// Location the creatures gathered around
    pub location: Position,
    /// Creatures that were placed
    pub creatures: Vec<SpawnedCreature>,
}

/// Random encounter engine.
#[derive(Debug, Clone, Default)]
pub struct EncounterEngine {
    config: EngineConfig,
    state: EngineState,
}

impl EncounterEngine {
    /// Creates an uninitialized engine.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: EngineState::Uninitialized,
        }
    }

    /// Engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn status(&self) -> EngineStatus {
        match self.state {
            EngineState::Uninitialized => EngineStatus::Uninitialized,
            EngineState::Disabled => EngineStatus::Disabled,
            EngineState::Active(_) => EngineStatus::Active,
        }
    }

    /// Loaded rules, if the engine is active.
    pub fn rules(&self) -> Option<&EncounterRules> {
        match &self.state {
            EngineState::Active(rules) => Some(rules),
            _ => None,
        }
    }

    /// Mutable access to the loaded rules, if the engine is active.
    pub fn rules_mut(&mut self) -> Option<&mut EncounterRules> {
        match &mut self.state {
            EngineState::Active(rules) => Some(rules),
            _ => None,
        }
    }

    /// Loads charts and tables from a parsed rules file.
    ///
    /// Any content error disables the engine. A disabled or already active
    /// engine is left as it is.
    pub fn load_rules(&mut self, file: &RulesFile) -> EngineStatus {
        if !matches!(self.state, EngineState::Uninitialized) {
            return self.status();
        }

        match RulesLoader::new(file).load() {
            Ok(rules) => {
                info!(
                    "Random encounters active: {} tables, {} entries",
                    rules.tables.len(),
                    rules.tables.entries().count()
                );
                self.state = EngineState::Active(rules);
            }
            Err(err) => {
                warn!("{}", err);
                warn!("Disabling random encounters because of bad rules data");
                self.state = EngineState::Disabled;
            }
        }
        self.status()
    }

    /// Reads a rules file from disk and loads it.
    ///
    /// A file that can't be read is returned as an error and leaves the
    /// engine untouched; a file that can't be parsed disables it.
    pub fn load_rules_from_path(&mut self, path: impl AsRef<Path>) -> EncounterResult<EngineStatus> {
        if matches!(self.state, EngineState::Disabled) {
            return Ok(self.status());
        }

        match RulesFile::from_path(path) {
            Ok(file) => Ok(self.load_rules(&file)),
            Err(EncounterError::Config(err)) => {
                warn!("{}", err);
                warn!("Disabling random encounters because of bad rules data");
                self.state = EngineState::Disabled;
                Ok(self.status())
            }
            Err(err) => Err(err),
        }
    }

    /// Releases the loaded rules so they can be loaded again.
    pub fn unload(&mut self) {
        if matches!(self.state, EngineState::Active(_)) {
            info!("Random encounter rules unloaded");
            self.state = EngineState::Uninitialized;
        }
    }

    /// Turns random encounters off for the rest of the session.
    pub fn disable(&mut self) {
        if !matches!(self.state, EngineState::Disabled) {
            info!("Random encounters disabled");
        }
        self.state = EngineState::Disabled;
    }

    /// Rolls for an encounter at `location`, spawning it if one fires.
    pub fn check<H, D>(&mut self, location: Position, host: &mut H, dice: &mut D) -> EncounterResult<bool>
    where
        H: Host + ?Sized,
        D: Dice + ?Sized,
    {
        Ok(self.check_encounter(location, host, dice)?.is_some())
    }

    /// Like [`EncounterEngine::check`], returning what fired.
    ///
    /// Steps, each of which may end the attempt: the frequency roll, the
    /// power tier, the town check, terrain classification, the table index,
    /// entry selection and finally the creature count roll.
    pub fn check_encounter<H, D>(
        &mut self,
        location: Position,
        host: &mut H,
        dice: &mut D,
    ) -> EncounterResult<Option<Encounter>>
    where
        H: Host + ?Sized,
        D: Dice + ?Sized,
    {
        let config = &self.config;
        let rules = match &mut self.state {
            EngineState::Active(rules) => rules,
            _ => return Ok(None),
        };

        let mut frequency = rules.frequency.lookup(location).unwrap_or(config.default_frequency);
        if host.is_sleeping() {
            frequency = frequency.saturating_mul(config.sleeping_frequency_multiplier);
        }
        if dice.between(1, 100) > frequency {
            return Ok(None);
        }

        let power = match rules.power.lookup(location) {
            Some(value) => PowerTier::from_value(value).unwrap_or_else(|| {
                warn!("Power chart value {} at {:?} is not a tier", value, location);
                config.default_power
            }),
            None => config.default_power,
        };
        if power == PowerTier::None {
            return Ok(None);
        }

        let night = host.is_night();

        if host.is_town_sector(location) {
            return Ok(None);
        }

        let Some(terrain) = classify_terrain(host.sector_terrain(location)) else {
            return Ok(None);
        };

        let key = TableKey { night, power, terrain };
        let index = resolve_table_index(key, rules.overrides.lookup(location));
        let table_index = match rules.tables.checked_index(index) {
            Ok(table_index) => table_index,
            Err(err) => {
                warn!("{}", err);
                return Ok(None);
            }
        };
        debug!("random encounter fired: table {}", table_index);

        let Some(player_level) = host.player_level() else {
            return Ok(None);
        };

        let Some(table) = rules.tables.table_mut(table_index) else {
            return Ok(None);
        };
        let mut flags = |flag: i32| host.global_flag(flag);
        let Some(entry_index) = select_entry(table, player_level, &mut flags, dice) else {
            return Ok(None);
        };
        table.record_trigger(entry_index);
        let entry = table.entries[entry_index].clone();

        let Some(creatures) = config.spawner().spawn(&entry, location, host, dice)? else {
            return Ok(None);
        };

        Ok(Some(Encounter {
            table_index,
            message_id: entry.message_id,
            location,
            creatures,
        }))
    }
}
