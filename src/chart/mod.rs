//! # Encounter Charts
//!
//! Spatial lookup of per-location encounter parameters.
//!
//! A chart is a list of circular zones. Looking up a location returns the
//! value of the smallest zone covering it; zones of equal radius are tried in
//! the order they were loaded. Three charts drive the engine: encounter
//! frequency, power tier, and a direct table override.

use crate::{ConfigError, Position};
use serde::{Deserialize, Serialize};

/// One circular zone of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    /// Center of the zone
    pub location: Position,
    /// Radius of the zone in tiles
    pub radius: u32,
    /// Value applying inside the zone
    pub value: i32,
}

impl ChartEntry {
    /// Creates a new chart entry.
    pub fn new(location: Position, radius: u32, value: i32) -> Self {
        Self {
            location,
            radius,
            value,
        }
    }

    /// Whether the zone covers `location`.
    pub fn covers(&self, location: Position) -> bool {
        self.location.euclidean_distance(location) <= self.radius as f64
    }
}

/// Radius-sorted set of zones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    entries: Vec<ChartEntry>,
}

impl Chart {
    /// Builds a chart from its zones, sorted by ascending radius.
    ///
    /// The sort is stable, so zones of equal radius keep their input order.
    /// A chart without zones is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use overworld_encounters::{Chart, ChartEntry, Position};
    ///
    /// let chart = Chart::new(vec![
    ///     ChartEntry::new(Position::new(0, 0), 50, 10),
    ///     ChartEntry::new(Position::new(0, 0), 5, 80),
    /// ])
    /// .unwrap();
    /// assert_eq!(chart.lookup(Position::new(2, 2)), Some(80));
    /// assert_eq!(chart.lookup(Position::new(30, 0)), Some(10));
    /// assert_eq!(chart.lookup(Position::new(300, 0)), None);
    /// ```
    pub fn new(mut entries: Vec<ChartEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyChart { base: None });
        }
        entries.sort_by_key(|entry| entry.radius);
        Ok(Self { entries })
    }

    /// Value of the first zone, in radius order, covering `location`.
    pub fn lookup(&self, location: Position) -> Option<i32> {
        self.entries
            .iter()
            .find(|entry| entry.covers(location))
            .map(|entry| entry.value)
    }

    /// Zones in lookup order.
    pub fn entries(&self) -> &[ChartEntry] {
        &self.entries
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a successfully built chart.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Coarse difficulty of the encounters around a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerTier {
    /// No encounters at all
    None = 0,
    Easy = 1,
    Average = 2,
    Powerful = 3,
}

impl PowerTier {
    /// Converts a chart value to a tier.
    pub fn from_value(value: i32) -> Option<PowerTier> {
        match value {
            0 => Some(PowerTier::None),
            1 => Some(PowerTier::Easy),
            2 => Some(PowerTier::Average),
            3 => Some(PowerTier::Powerful),
            _ => None,
        }
    }

    /// Number used by the table index formula.
    pub fn index(self) -> i32 {
        self as i32
    }
}

impl Default for PowerTier {
    fn default() -> Self {
        PowerTier::Average
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smaller_radius_wins() {
        let chart = Chart::new(vec![
            ChartEntry::new(Position::new(10, 10), 20, 2),
            ChartEntry::new(Position::new(12, 10), 5, 1),
        ])
        .unwrap();

        assert_eq!(chart.entries()[0].radius, 5);
        assert_eq!(chart.lookup(Position::new(11, 10)), Some(1));
        assert_eq!(chart.lookup(Position::new(25, 10)), Some(2));
        assert_eq!(chart.lookup(Position::new(100, 100)), None);
    }

    #[test]
    fn test_equal_radius_keeps_load_order() {
        let chart = Chart::new(vec![
            ChartEntry::new(Position::new(0, 0), 30, 99),
            ChartEntry::new(Position::new(0, 0), 10, 7),
            ChartEntry::new(Position::new(5, 0), 10, 8),
        ])
        .unwrap();

        // Both radius-10 zones cover (3, 0); the one loaded first wins.
        assert_eq!(chart.lookup(Position::new(3, 0)), Some(7));
        assert_eq!(chart.lookup(Position::new(14, 0)), Some(8));
    }

    #[test]
    fn test_radius_boundary_is_inclusive() {
        let chart = Chart::new(vec![ChartEntry::new(Position::new(0, 0), 5, 1)]).unwrap();
        assert_eq!(chart.lookup(Position::new(3, 4)), Some(1));
        assert_eq!(chart.lookup(Position::new(4, 4)), None);
        assert_eq!(chart.lookup(Position::new(0, 0)), Some(1));
    }

    #[test]
    fn test_lookup_far_across_the_map() {
        let chart = Chart::new(vec![ChartEntry::new(Position::new(2_000_000_000, 0), 5, 80)]).unwrap();
        assert_eq!(chart.lookup(Position::new(-1_000_000_000, 0)), None);
        assert_eq!(chart.lookup(Position::new(i32::MIN, i32::MIN)), None);
        assert_eq!(chart.lookup(Position::new(1_999_999_997, 4)), Some(80));
    }

    #[test]
    fn test_empty_chart_is_an_error() {
        assert!(matches!(Chart::new(Vec::new()), Err(ConfigError::EmptyChart { .. })));
    }

    #[test]
    fn test_power_tiers() {
        assert_eq!(PowerTier::from_value(0), Some(PowerTier::None));
        assert_eq!(PowerTier::from_value(3), Some(PowerTier::Powerful));
        assert_eq!(PowerTier::from_value(4), None);
        assert_eq!(PowerTier::default().index(), 2);
    }
}
