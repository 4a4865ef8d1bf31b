//! # Simulated World
//!
//! An in-memory host implementing every collaborator trait. The CLI drives
//! the engine against it and the tests use it to observe spawning.

use crate::{
    Calendar, CreatureHandle, Direction, EncounterError, EncounterResult, Objects, Party, Position,
    RawTerrain, SectorTerrain, SpeciesId, TimerQueue, Travel, WorldMap,
};
use noise::{NoiseFn, Perlin};
use pathfinding::prelude::bfs;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::{HashMap, HashSet};

/// Side length of a world map sector in tiles.
pub const SECTOR_SIZE: i32 = 64;

const MS_PER_HOUR: u64 = 3_600_000;

/// Returns the sector coordinates containing a tile.
pub fn sector_of(tile: Position) -> (i32, i32) {
    (tile.x.div_euclid(SECTOR_SIZE), tile.y.div_euclid(SECTOR_SIZE))
}

/// A creature object living in the simulated world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimCreature {
    /// Prototype the creature was built from
    pub species: SpeciesId,
    /// Tile the creature stands on
    pub tile: Position,
    /// Current facing, if it was ever rotated
    pub facing: Option<Direction>,
}

/// In-memory world implementing [`crate::Host`].
#[derive(Debug, Clone)]
pub struct SimWorld {
    sectors: HashMap<(i32, i32), SectorTerrain>,
    default_terrain: SectorTerrain,
    towns: HashSet<(i32, i32)>,
    blocked: HashSet<Position>,
    creatures: HashMap<CreatureHandle, SimCreature>,
    prototypes: Option<HashSet<SpeciesId>>,
    flags: HashSet<i32>,
    player: CreatureHandle,
    /// Tile the player stands on while travelling
    pub player_tile: Position,
    /// Player level; None simulates a missing player object
    pub player_level: Option<i32>,
    /// Whether the player is on the overworld map
    pub overworld: bool,
    /// Whether the player is inside a scripted area
    pub scripted_area: bool,
    /// Whether the world map travel screen is open
    pub world_map_open: bool,
    /// Whether the player is resting
    pub sleeping: bool,
    /// Encounters started through the travel UI
    pub encounters_started: u32,
    /// Times resting was interrupted by an encounter
    pub sleep_interruptions: u32,
    clock_ms: u64,
    start_hour: u32,
    timers: Vec<u64>,
    terrain_queries: Cell<u32>,
}

impl SimWorld {
    /// Creates a flat green world with the player at `player_tile`, at noon.
    pub fn new(player_tile: Position) -> Self {
        Self {
            sectors: HashMap::new(),
            default_terrain: SectorTerrain::uniform(RawTerrain::GreenGrasslands),
            towns: HashSet::new(),
            blocked: HashSet::new(),
            creatures: HashMap::new(),
            prototypes: None,
            flags: HashSet::new(),
            player: crate::new_creature_handle(),
            player_tile,
            player_level: Some(1),
            overworld: true,
            scripted_area: false,
            world_map_open: true,
            sleeping: false,
            encounters_started: 0,
            sleep_interruptions: 0,
            clock_ms: 0,
            start_hour: 12,
            timers: Vec::new(),
            terrain_queries: Cell::new(0),
        }
    }

    /// Creates a world whose sector terrain comes from Perlin noise.
    ///
    /// Two noise fields are sampled per sector, elevation and moisture.
    /// High ground becomes mountains, low ground water, and the rest is
    /// banded by moisture from desert to swamp. Each sector's edge terrain is
    /// the base terrain of its eastern neighbour.
    pub fn generated(seed: u32, width_sectors: i32, height_sectors: i32, player_tile: Position) -> Self {
        let elevation = Perlin::new(seed);
        let moisture = Perlin::new(seed.wrapping_add(1));
        let base_at = |sx: i32, sy: i32| -> RawTerrain {
            let point = [sx as f64 * 0.31, sy as f64 * 0.31];
            let height = elevation.get(point);
            let wet = moisture.get(point);
            if height > 0.55 {
                RawTerrain::Mountains
            } else if height < -0.55 {
                RawTerrain::Water
            } else if wet > 0.4 {
                RawTerrain::Swamps
            } else if wet > 0.15 {
                RawTerrain::Forest
            } else if wet > -0.15 {
                if height > 0.0 {
                    RawTerrain::Plains
                } else {
                    RawTerrain::GreenGrasslands
                }
            } else if wet > -0.4 {
                RawTerrain::Deforested
            } else {
                RawTerrain::Desert
            }
        };

        let mut world = Self::new(player_tile);
        for sy in 0..height_sectors {
            for sx in 0..width_sectors {
                let sector = SectorTerrain::blended(base_at(sx, sy), base_at(sx + 1, sy));
                world.sectors.insert((sx, sy), sector);
            }
        }
        world
    }

    /// Overrides the terrain of one sector.
    pub fn set_sector_terrain(&mut self, sector: (i32, i32), terrain: SectorTerrain) {
        self.sectors.insert(sector, terrain);
    }

    /// Marks a sector as a town.
    pub fn add_town(&mut self, sector: (i32, i32)) {
        self.towns.insert(sector);
    }

    /// Makes a tile impassable.
    pub fn block_tile(&mut self, tile: Position) {
        self.blocked.insert(tile);
    }

    /// Sets a global story flag.
    pub fn set_flag(&mut self, flag: i32, value: bool) {
        if value {
            self.flags.insert(flag);
        } else {
            self.flags.remove(&flag);
        }
    }

    /// Restricts which species have prototypes. By default every positive
    /// species id does.
    pub fn restrict_prototypes(&mut self, species: impl IntoIterator<Item = SpeciesId>) {
        self.prototypes = Some(species.into_iter().collect());
    }

    /// Handle of the player object.
    pub fn player_handle(&self) -> CreatureHandle {
        self.player
    }

    /// Looks up a creature.
    pub fn creature(&self, handle: CreatureHandle) -> Option<&SimCreature> {
        self.creatures.get(&handle)
    }

    /// All creatures currently in the world.
    pub fn creatures(&self) -> impl Iterator<Item = (&CreatureHandle, &SimCreature)> {
        self.creatures.iter()
    }

    /// Number of creatures currently in the world.
    pub fn creature_count(&self) -> usize {
        self.creatures.len()
    }

    /// Removes every creature, as when the player leaves an encounter map.
    pub fn clear_creatures(&mut self) {
        self.creatures.clear();
    }

    /// Sets the time of day without moving the clock.
    pub fn set_hour(&mut self, hour: u32) {
        let elapsed_hours = (self.clock_ms / MS_PER_HOUR % 24) as u32;
        self.start_hour = (hour % 24 + 24 - elapsed_hours) % 24;
    }

    /// Game time elapsed in milliseconds.
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Due times of armed timers.
    pub fn pending_timers(&self) -> &[u64] {
        &self.timers
    }

    /// Advances the clock to the earliest armed timer and disarms it.
    ///
    /// Returns false when no timer is armed.
    pub fn advance_to_next_timer(&mut self) -> bool {
        let Some((index, due)) = self
            .timers
            .iter()
            .copied()
            .enumerate()
            .min_by_key(|(_, due)| *due)
        else {
            return false;
        };
        self.timers.swap_remove(index);
        self.clock_ms = self.clock_ms.max(due);
        true
    }

    /// Number of terrain and town lookups made so far.
    pub fn terrain_queries(&self) -> u32 {
        self.terrain_queries.get()
    }

    fn is_free(&self, tile: Position) -> bool {
        !self.is_blocked(tile) && self.occupants_at(tile).is_empty()
    }
}

impl Calendar for SimWorld {
    fn current_hour(&self) -> u32 {
        ((self.start_hour as u64 + self.clock_ms / MS_PER_HOUR) % 24) as u32
    }
}

impl WorldMap for SimWorld {
    fn sector_terrain(&self, location: Position) -> SectorTerrain {
        self.terrain_queries.set(self.terrain_queries.get() + 1);
        self.sectors
            .get(&sector_of(location))
            .copied()
            .unwrap_or(self.default_terrain)
    }

    fn is_town_sector(&self, location: Position) -> bool {
        self.terrain_queries.set(self.terrain_queries.get() + 1);
        self.towns.contains(&sector_of(location))
    }

    fn is_blocked(&self, tile: Position) -> bool {
        self.blocked.contains(&tile)
    }

    fn find_free_tile_near(&self, near: Position, radius: u32) -> Option<Position> {
        let path = bfs(
            &near,
            |tile: &Position| {
                tile.adjacent_positions()
                    .into_iter()
                    .filter(|next| next.chebyshev_distance(near) <= radius)
                    .collect::<Vec<_>>()
            },
            |tile: &Position| self.is_free(*tile),
        )?;
        path.last().copied()
    }

    fn occupants_at(&self, tile: Position) -> Vec<CreatureHandle> {
        let mut occupants: Vec<CreatureHandle> = self
            .creatures
            .iter()
            .filter(|(_, creature)| creature.tile == tile)
            .map(|(handle, _)| *handle)
            .collect();
        if self.player_tile == tile {
            occupants.push(self.player);
        }
        occupants
    }
}

impl Party for SimWorld {
    fn player_level(&self) -> Option<i32> {
        self.player_level
    }

    fn global_flag(&self, flag: i32) -> bool {
        self.flags.contains(&flag)
    }
}

impl Objects for SimWorld {
    fn create_creature(&mut self, species: SpeciesId, tile: Position) -> EncounterResult<CreatureHandle> {
        let known = match &self.prototypes {
            Some(prototypes) => prototypes.contains(&species),
            None => species > 0,
        };
        if !known {
            return Err(EncounterError::MissingCreaturePrototype { species });
        }

        let handle = crate::new_creature_handle();
        self.creatures.insert(
            handle,
            SimCreature {
                species,
                tile,
                facing: None,
            },
        );
        Ok(handle)
    }

    fn move_creature(&mut self, creature: CreatureHandle, tile: Position) {
        if let Some(creature) = self.creatures.get_mut(&creature) {
            creature.tile = tile;
        }
    }

    fn destroy_creature(&mut self, creature: CreatureHandle) {
        self.creatures.remove(&creature);
    }

    fn set_facing(&mut self, creature: CreatureHandle, facing: Direction) {
        if let Some(creature) = self.creatures.get_mut(&creature) {
            creature.facing = Some(facing);
        }
    }
}

impl Travel for SimWorld {
    fn on_overworld(&self) -> bool {
        self.overworld
    }

    fn in_scripted_area(&self) -> bool {
        self.scripted_area
    }

    fn travel_location(&self) -> Position {
        self.player_tile
    }

    fn is_world_map_open(&self) -> bool {
        self.world_map_open
    }

    fn start_encounter(&mut self) {
        self.world_map_open = false;
        self.encounters_started += 1;
    }

    fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    fn interrupt_sleep(&mut self) {
        self.sleeping = false;
        self.sleep_interruptions += 1;
    }
}

impl TimerQueue for SimWorld {
    fn schedule_encounter_timer(&mut self, delay_ms: u64) {
        self.timers.push(self.clock_ms + delay_ms);
    }
}
