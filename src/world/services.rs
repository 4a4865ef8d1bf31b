//! # Host Services
//!
//! Trait definitions for everything the encounter engine asks of the game.
//!
//! Each trait covers one collaborator: the calendar, the world map, the
//! player party, the object model, the travel UI and the time-event queue.
//! [`Host`] bundles them and is implemented automatically for any type that
//! provides all six.

use crate::{CreatureHandle, Direction, EncounterResult, Position, SectorTerrain, SpeciesId};

/// Time-of-day queries.
pub trait Calendar {
    /// Current hour of the day, 0..24.
    fn current_hour(&self) -> u32;

    /// Whether the current hour counts as night (before 6:00 or from 18:00).
    fn is_night(&self) -> bool {
        let hour = self.current_hour();
        hour < 6 || hour >= 18
    }
}

/// Map and placement queries.
pub trait WorldMap {
    /// Terrain sub-ids of the sector containing `location`.
    fn sector_terrain(&self, location: Position) -> SectorTerrain;

    /// Whether the sector containing `location` is a town or settlement.
    fn is_town_sector(&self, location: Position) -> bool;

    /// Whether the tile itself blocks movement.
    fn is_blocked(&self, tile: Position) -> bool;

    /// Finds a free tile within `radius` of `near`, if any.
    fn find_free_tile_near(&self, near: Position, radius: u32) -> Option<Position>;

    /// Player characters and NPCs standing on `tile`.
    fn occupants_at(&self, tile: Position) -> Vec<CreatureHandle>;
}

/// Player state queries.
pub trait Party {
    /// Level of the local player, or None when there is no player.
    fn player_level(&self) -> Option<i32>;

    /// State of a global story flag.
    fn global_flag(&self, flag: i32) -> bool;
}

/// Object creation and mutation.
pub trait Objects {
    /// Creates a creature from its prototype at `tile`.
    ///
    /// Fails with [`crate::EncounterError::MissingCreaturePrototype`] when the
    /// species has no prototype.
    fn create_creature(&mut self, species: SpeciesId, tile: Position) -> EncounterResult<CreatureHandle>;

    /// Moves an existing creature to another tile.
    fn move_creature(&mut self, creature: CreatureHandle, tile: Position);

    /// Destroys a creature.
    fn destroy_creature(&mut self, creature: CreatureHandle);

    /// Rotates a creature to the given facing.
    fn set_facing(&mut self, creature: CreatureHandle, facing: Direction);
}

/// Travel and sleep UI.
pub trait Travel {
    /// Whether the player is on the overworld map.
    fn on_overworld(&self) -> bool;

    /// Whether the player is inside a scripted area.
    fn in_scripted_area(&self) -> bool;

    /// Current travel location on the overworld.
    fn travel_location(&self) -> Position;

    /// Whether the world map travel screen is open.
    fn is_world_map_open(&self) -> bool;

    /// Closes the world map and starts the encounter.
    fn start_encounter(&mut self);

    /// Whether the player is resting.
    fn is_sleeping(&self) -> bool;

    /// Wakes the player up.
    fn interrupt_sleep(&mut self);
}

/// Game time-event queue.
pub trait TimerQueue {
    /// Arms the encounter timer to fire after `delay_ms` of game time.
    fn schedule_encounter_timer(&mut self, delay_ms: u64);
}

/// Every collaborator the engine needs.
pub trait Host: Calendar + WorldMap + Party + Objects + Travel + TimerQueue {}

impl<T> Host for T where T: Calendar + WorldMap + Party + Objects + Travel + TimerQueue {}
