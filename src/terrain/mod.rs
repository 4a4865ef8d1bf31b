//! # Terrain Classification
//!
//! Maps the raw terrain of a world map sector onto the encounter terrain
//! categories used to pick an encounter table.
//!
//! Every sector carries two raw sub-ids: the base terrain and the terrain it
//! blends into along its edges. Both must be encounter-capable for the sector
//! to host an encounter; the category itself comes from the base.

use log::warn;
use serde::{Deserialize, Serialize};

/// Raw terrain kinds as stored on the world map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawTerrain {
    GreenGrasslands,
    Swamps,
    Water,
    Plains,
    Forest,
    DesertIsland,
    VoidPlains,
    BroadLeafForest,
    Desert,
    Mountains,
    ElvenForest,
    Deforested,
    SnowPlains,
    TropicalJungle,
    VoidMountains,
    ScorchedEarth,
    DesertMountains,
    SnowyMountains,
    TropicalMountains,
}

impl RawTerrain {
    /// Number of raw terrain kinds.
    pub const COUNT: u8 = 19;

    /// Looks up a raw terrain kind by its map id.
    pub fn from_id(id: u8) -> Option<RawTerrain> {
        use RawTerrain::*;
        const ALL: [RawTerrain; RawTerrain::COUNT as usize] = [
            GreenGrasslands,
            Swamps,
            Water,
            Plains,
            Forest,
            DesertIsland,
            VoidPlains,
            BroadLeafForest,
            Desert,
            Mountains,
            ElvenForest,
            Deforested,
            SnowPlains,
            TropicalJungle,
            VoidMountains,
            ScorchedEarth,
            DesertMountains,
            SnowyMountains,
            TropicalMountains,
        ];
        ALL.get(id as usize).copied()
    }

    /// Encounter category of this terrain, or None where encounters can't
    /// happen (water, every mountain range, scorched earth).
    pub fn category(self) -> Option<TerrainCategory> {
        use RawTerrain::*;
        match self {
            GreenGrasslands => Some(TerrainCategory::GreenGrasslands),
            Swamps => Some(TerrainCategory::Swamps),
            Plains | BroadLeafForest | Deforested => Some(TerrainCategory::Plains),
            Forest => Some(TerrainCategory::Forest),
            DesertIsland | Desert => Some(TerrainCategory::Desert),
            VoidPlains => Some(TerrainCategory::Void),
            ElvenForest => Some(TerrainCategory::ElvenForest),
            SnowPlains => Some(TerrainCategory::SnowyPlains),
            TropicalJungle => Some(TerrainCategory::TropicalJungle),
            Water | Mountains | VoidMountains | ScorchedEarth | DesertMountains | SnowyMountains
            | TropicalMountains => None,
        }
    }
}

/// Encounter terrain categories, numbered from 1 in table-formula order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainCategory {
    GreenGrasslands = 1,
    Plains = 2,
    Swamps = 3,
    ElvenForest = 4,
    TropicalJungle = 5,
    Desert = 6,
    Forest = 7,
    SnowyPlains = 8,
    Void = 9,
}

impl TerrainCategory {
    /// Number used by the table index formula.
    pub fn index(self) -> i32 {
        self as i32
    }
}

/// The two raw terrain sub-ids of a map sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectorTerrain {
    /// Terrain filling the sector
    pub base: u8,
    /// Terrain the sector blends into at its edges
    pub edge: u8,
}

impl SectorTerrain {
    /// Creates a sector made of a single raw terrain.
    pub fn uniform(terrain: RawTerrain) -> Self {
        Self::blended(terrain, terrain)
    }

    /// Creates a sector blending `base` into `edge`.
    pub fn blended(base: RawTerrain, edge: RawTerrain) -> Self {
        Self {
            base: base as u8,
            edge: edge as u8,
        }
    }
}

/// Classifies a sector for encounter purposes.
///
/// Returns None when either sub-id is unknown or maps to no category.
///
/// # Examples
///
/// ```
/// use overworld_encounters::{classify_terrain, RawTerrain, SectorTerrain, TerrainCategory};
///
/// let sector = SectorTerrain::blended(RawTerrain::Deforested, RawTerrain::Forest);
/// assert_eq!(classify_terrain(sector), Some(TerrainCategory::Plains));
///
/// let coast = SectorTerrain::blended(RawTerrain::Plains, RawTerrain::Water);
/// assert_eq!(classify_terrain(coast), None);
/// ```
pub fn classify_terrain(sector: SectorTerrain) -> Option<TerrainCategory> {
    let (Some(base), Some(edge)) = (RawTerrain::from_id(sector.base), RawTerrain::from_id(sector.edge)) else {
        warn!(
            "Unknown terrain ids {}/{} in encounter terrain classification",
            sector.base, sector.edge
        );
        return None;
    };

    edge.category()?;
    base.category()
}
