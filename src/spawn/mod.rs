//! # Encounter Spawning
//!
//! Turns a selected table entry into creatures standing near the player.
//!
//! Spawning runs in two phases. [`plan_spawns`] is pure: it lays every
//! creature out on a formation starting from a baseline next to the anchor.
//! [`Spawner::materialize`] then creates the objects through the host,
//! relocating creatures whose tile is blocked and discarding those that
//! can't be placed or land on someone else.

use crate::{
    CreatureHandle, Dice, Direction, EncounterError, EncounterResult, EncounterTableEntry, Objects,
    Position, SpeciesId, WorldMap,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Rolls how many creatures each slot of an entry brings.
///
/// Slots with equal bounds don't touch the dice.
pub fn roll_creature_counts<D>(entry: &EncounterTableEntry, dice: &mut D) -> Vec<u32>
where
    D: Dice + ?Sized,
{
    entry
        .creatures
        .iter()
        .map(|slot| {
            if slot.min_count == slot.max_count {
                slot.min_count
            } else {
                let low = slot.min_count.min(i32::MAX as u32) as i32;
                let high = slot.max_count.min(i32::MAX as u32) as i32;
                dice.between(low, high).max(0) as u32
            }
        })
        .collect()
}

/// Which side of the anchor the formation starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Baseline {
    /// Start `offset` tiles west of the anchor
    West,
    /// Start `offset` tiles north of the anchor
    North,
}

impl Baseline {
    /// Picks a baseline with even odds.
    pub fn roll<D>(dice: &mut D) -> Baseline
    where
        D: Dice + ?Sized,
    {
        if dice.between(1, 100) < 51 {
            Baseline::West
        } else {
            Baseline::North
        }
    }

    /// First formation tile for an anchor.
    pub fn origin(self, anchor: Position, offset: i32) -> Position {
        match self {
            Baseline::West => anchor.offset(-offset, 0),
            Baseline::North => anchor.offset(0, -offset),
        }
    }
}

/// Offset of the `ordinal`-th creature of a slot from the formation origin.
///
/// Ordinal 0 sits on the origin. Later creatures fill bands of three tiles
/// laid across the diagonal, each band one step further down it.
///
/// # Examples
///
/// ```
/// use overworld_encounters::{formation_offset, Position};
///
/// assert_eq!(formation_offset(0), Position::new(0, 0));
/// assert_eq!(formation_offset(2), Position::new(1, 1));
/// assert_eq!(formation_offset(5), Position::new(2, 2));
/// ```
pub fn formation_offset(ordinal: u32) -> Position {
    if ordinal == 0 {
        return Position::origin();
    }
    let band = ((ordinal - 1) / 3 + 1) as i32;
    let lane = ((ordinal - 1) % 3) as i32 - 1;
    Position::new(band + lane, band - lane)
}

/// One creature in a spawn plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCreature {
    /// Prototype to build
    pub species: SpeciesId,
    /// Index of the creature slot it came from
    pub slot: usize,
    /// Position within its slot
    pub ordinal: u32,
    /// Intended tile
    pub tile: Position,
}

/// Where every creature of an encounter should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPlan {
    /// Location the creatures face
    pub anchor: Position,
    /// Side the formation starts from
    pub baseline: Baseline,
    /// First formation tile
    pub origin: Position,
    /// Creatures in creation order
    pub creatures: Vec<PlannedCreature>,
}

/// Lays out an entry's creatures around `anchor`.
///
/// `counts` gives the number of creatures per slot, as returned by
/// [`roll_creature_counts`]. Every slot restarts the formation at the origin.
pub fn plan_spawns(
    entry: &EncounterTableEntry,
    counts: &[u32],
    anchor: Position,
    baseline: Baseline,
    offset: i32,
) -> SpawnPlan {
    let origin = baseline.origin(anchor, offset);
    let creatures = entry
        .creatures
        .iter()
        .zip(counts)
        .enumerate()
        .flat_map(|(slot, (creature, count))| {
            (0..*count).map(move |ordinal| PlannedCreature {
                species: creature.species,
                slot,
                ordinal,
                tile: origin + formation_offset(ordinal),
            })
        })
        .collect();

    SpawnPlan {
        anchor,
        baseline,
        origin,
        creatures,
    }
}

/// A creature that made it into the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnedCreature {
    /// Host handle of the creature
    pub handle: CreatureHandle,
    /// Prototype it was built from
    pub species: SpeciesId,
    /// Tile it ended up on
    pub tile: Position,
    /// Facing toward the anchor; None if it stands on the anchor
    pub facing: Option<Direction>,
}

/// Creates encounter creatures through the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawner {
    /// Distance from the anchor to the formation origin
    pub baseline_offset: i32,
    /// How far from the anchor to look for a free tile when the planned one
    /// is blocked
    pub search_radius: u32,
    /// Skip the rest of a slot when its prototype is missing instead of
    /// failing the spawn
    pub skip_missing_prototypes: bool,
}

impl Default for Spawner {
    fn default() -> Self {
        Self {
            baseline_offset: 6,
            search_radius: 6,
            skip_missing_prototypes: true,
        }
    }
}

impl Spawner {
    /// Rolls counts, plans and materializes an entry's creatures.
    ///
    /// Returns `Ok(None)` when the rolled counts add up to zero.
    pub fn spawn<H, D>(
        &self,
        entry: &EncounterTableEntry,
        anchor: Position,
        host: &mut H,
        dice: &mut D,
    ) -> EncounterResult<Option<Vec<SpawnedCreature>>>
    where
        H: WorldMap + Objects + ?Sized,
        D: Dice + ?Sized,
    {
        let counts = roll_creature_counts(entry, dice);
        let total: u64 = counts.iter().map(|count| *count as u64).sum();
        if total == 0 {
            warn!("Encounter {} rolled zero creatures", entry.message_id);
            return Ok(None);
        }

        let baseline = Baseline::roll(dice);
        let plan = plan_spawns(entry, &counts, anchor, baseline, self.baseline_offset);
        let spawned = self.materialize(&plan, host)?;
        info!(
            "Encounter {} spawned {} of {} creatures near {:?}",
            entry.message_id,
            spawned.len(),
            total,
            anchor
        );
        Ok(Some(spawned))
    }

    /// Creates the planned creatures.
    ///
    /// A creature whose tile is blocked is moved to a free tile around the
    /// anchor; if there is none it is destroyed. A creature sharing its tile
    /// with anyone else is destroyed too. Survivors face the anchor.
    /// A missing prototype either skips the rest of its slot or, when
    /// `skip_missing_prototypes` is off, aborts with the error (creatures
    /// already placed stay in the world).
    pub fn materialize<H>(&self, plan: &SpawnPlan, host: &mut H) -> EncounterResult<Vec<SpawnedCreature>>
    where
        H: WorldMap + Objects + ?Sized,
    {
        let mut spawned = Vec::with_capacity(plan.creatures.len());
        let mut skipped_slot = None;

        for planned in &plan.creatures {
            if skipped_slot == Some(planned.slot) {
                continue;
            }

            let handle = match host.create_creature(planned.species, planned.tile) {
                Ok(handle) => handle,
                Err(EncounterError::MissingCreaturePrototype { species }) if self.skip_missing_prototypes => {
                    warn!("Skipping encounter slot {}: no prototype for species {}", planned.slot, species);
                    skipped_slot = Some(planned.slot);
                    continue;
                }
                Err(err) => return Err(err),
            };

            let mut tile = planned.tile;
            if host.is_blocked(tile) {
                match host.find_free_tile_near(plan.anchor, self.search_radius) {
                    Some(free) if !host.is_blocked(free) => {
                        host.move_creature(handle, free);
                        tile = free;
                    }
                    _ => {
                        debug!("No room for species {} near {:?}", planned.species, planned.tile);
                        host.destroy_creature(handle);
                        continue;
                    }
                }
            }

            if occupied_by_other(host, tile, handle) {
                debug!("Tile {:?} already taken, dropping species {}", tile, planned.species);
                host.destroy_creature(handle);
                continue;
            }

            let facing = Direction::toward(tile, plan.anchor);
            if let Some(facing) = facing {
                host.set_facing(handle, facing);
            }

            spawned.push(SpawnedCreature {
                handle,
                species: planned.species,
                tile,
                facing,
            });
        }

        Ok(spawned)
    }
}

fn occupied_by_other<H>(host: &H, tile: Position, creature: CreatureHandle) -> bool
where
    H: WorldMap + ?Sized,
{
    host.occupants_at(tile).iter().any(|other| *other != creature)
}
