//! # Entry Selection
//!
//! Eligibility gating and frequency-weighted choice of a table entry.

use crate::{Dice, EncounterTable, EncounterTableEntry};

/// Whether an entry may fire for the given player level and flag state.
///
/// An entry is eligible when the level lies inside its range, its story
/// flag (if any) is set, and its trigger cap (if any) hasn't been reached.
pub fn is_eligible<F>(entry: &EncounterTableEntry, player_level: i32, flag_lookup: &mut F) -> bool
where
    F: FnMut(i32) -> bool,
{
    if player_level < entry.min_level || player_level > entry.max_level {
        return false;
    }

    if let Some(flag) = entry.global_flag {
        if !flag_lookup(flag) {
            return false;
        }
    }

    !entry.is_exhausted()
}

/// Sum of the frequencies of all eligible entries.
pub fn total_frequency<F>(table: &EncounterTable, player_level: i32, flag_lookup: &mut F) -> i64
where
    F: FnMut(i32) -> bool,
{
    table
        .entries
        .iter()
        .filter(|entry| is_eligible(entry, player_level, flag_lookup))
        .map(|entry| entry.frequency as i64)
        .sum()
}

/// Picks an eligible entry with probability proportional to its frequency.
///
/// A roll `r` in `1..=total` is walked down the table: an eligible entry
/// wins when `r` is below its frequency, otherwise its frequency is
/// subtracted. A roll that survives the walk (which happens whenever it
/// lands exactly on the running total) goes to the last eligible entry
/// visited.
///
/// Returns None when the eligible frequencies sum to zero or less.
///
/// # Examples
///
/// ```
/// use overworld_encounters::{select_entry, EncounterTable, EncounterTableEntry, ScriptedDice};
///
/// let table = EncounterTable::new(vec![
///     EncounterTableEntry::new(1, 10),
///     EncounterTableEntry::new(2, 20).with_levels(5, 10),
///     EncounterTableEntry::new(3, 30),
/// ]);
///
/// let mut dice = ScriptedDice::new([15]);
/// assert_eq!(select_entry(&table, 1, &mut |_: i32| true, &mut dice), Some(2));
/// ```
pub fn select_entry<F, D>(
    table: &EncounterTable,
    player_level: i32,
    flag_lookup: &mut F,
    dice: &mut D,
) -> Option<usize>
where
    F: FnMut(i32) -> bool,
    D: Dice + ?Sized,
{
    let total = total_frequency(table, player_level, flag_lookup);
    if total <= 0 {
        return None;
    }

    let mut roll = dice.between(1, total.min(i32::MAX as i64) as i32);
    let mut last_eligible = None;
    for (index, entry) in table.entries.iter().enumerate() {
        if !is_eligible(entry, player_level, flag_lookup) {
            continue;
        }

        last_eligible = Some(index);
        if roll < entry.frequency {
            return Some(index);
        }
        roll -= entry.frequency;
    }

    last_eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedDice;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;

    fn weighted_table() -> EncounterTable {
        EncounterTable::new(vec![
            EncounterTableEntry::new(1, 10),
            EncounterTableEntry::new(2, 20),
            EncounterTableEntry::new(3, 30),
        ])
    }

    #[test]
    fn test_level_gate_is_inclusive() {
        let entry = EncounterTableEntry::new(1, 10).with_levels(5, 10);
        let mut flags = |_: i32| true;
        assert!(!is_eligible(&entry, 4, &mut flags));
        for level in 5..=10 {
            assert!(is_eligible(&entry, level, &mut flags));
        }
        assert!(!is_eligible(&entry, 11, &mut flags));
    }

    #[test]
    fn test_flag_gate() {
        let entry = EncounterTableEntry::new(1, 10).with_global_flag(42);
        assert!(is_eligible(&entry, 1, &mut |flag: i32| flag == 42));
        assert!(!is_eligible(&entry, 1, &mut |_: i32| false));

        let ungated = EncounterTableEntry::new(2, 10);
        let mut asked = false;
        assert!(is_eligible(&ungated, 1, &mut |_: i32| {
            asked = true;
            false
        }));
        assert!(!asked);
    }

    #[test]
    fn test_walk_boundaries() {
        let table = weighted_table();
        let mut flags = |_: i32| true;
        let cases = [(1, 0), (9, 0), (10, 1), (29, 1), (30, 2), (59, 2), (60, 2)];
        for (roll, expected) in cases {
            let mut dice = ScriptedDice::new([roll]);
            assert_eq!(
                select_entry(&table, 1, &mut flags, &mut dice),
                Some(expected),
                "roll {}",
                roll
            );
        }
    }

    #[test]
    fn test_roll_on_total_falls_back_to_last_eligible() {
        let table = EncounterTable::new(vec![
            EncounterTableEntry::new(1, 10),
            EncounterTableEntry::new(2, 10).with_levels(50, 60),
        ]);
        let mut dice = ScriptedDice::new([10]);
        assert_eq!(select_entry(&table, 1, &mut |_: i32| true, &mut dice), Some(0));
    }

    #[test]
    fn test_eligibility_change_mid_walk_uses_fallback() {
        // The flag reads true while totalling and false during the walk, so
        // the walk visits only the first entry and never matches.
        let table = EncounterTable::new(vec![
            EncounterTableEntry::new(1, 5),
            EncounterTableEntry::new(2, 50).with_global_flag(9),
        ]);
        let reads = Cell::new(0);
        let mut flaky = |_: i32| {
            reads.set(reads.get() + 1);
            reads.get() == 1
        };
        let mut dice = ScriptedDice::new([40]);
        assert_eq!(select_entry(&table, 1, &mut flaky, &mut dice), Some(0));
    }

    #[test]
    fn test_nothing_eligible_after_total_yields_none() {
        let table = EncounterTable::new(vec![EncounterTableEntry::new(1, 5).with_global_flag(9)]);
        let reads = Cell::new(0);
        let mut flaky = |_: i32| {
            reads.set(reads.get() + 1);
            reads.get() == 1
        };
        let mut dice = ScriptedDice::new([3]);
        assert_eq!(select_entry(&table, 1, &mut flaky, &mut dice), None);
    }

    #[test]
    fn test_zero_total_yields_none() {
        let table = EncounterTable::new(vec![
            EncounterTableEntry::new(1, 0),
            EncounterTableEntry::new(2, 40).with_levels(20, 30),
        ]);
        let mut dice = ScriptedDice::new([1]);
        assert_eq!(select_entry(&table, 1, &mut |_: i32| true, &mut dice), None);
        assert_eq!(dice.consumed(), 0);
        assert_eq!(select_entry(&EncounterTable::default(), 1, &mut |_: i32| true, &mut dice), None);
    }

    #[test]
    fn test_trigger_cap_exhausts_after_one_selection() {
        let mut table = EncounterTable::new(vec![EncounterTableEntry::new(1, 10).with_max_triggers(1)]);
        let mut rng = StdRng::seed_from_u64(3);

        let chosen = select_entry(&table, 1, &mut |_: i32| true, &mut rng).unwrap();
        table.record_trigger(chosen);

        for _ in 0..20 {
            assert_eq!(select_entry(&table, 1, &mut |_: i32| true, &mut rng), None);
        }
    }

    #[test]
    fn test_distribution_tracks_frequencies() {
        let table = weighted_table();
        let mut rng = StdRng::seed_from_u64(12345);
        let mut counts = [0u32; 3];
        let trials = 60_000;
        for _ in 0..trials {
            let index = select_entry(&table, 1, &mut |_: i32| true, &mut rng).unwrap();
            counts[index] += 1;
        }

        for (count, weight) in counts.iter().zip([10.0, 20.0, 30.0]) {
            let observed = *count as f64 / trials as f64;
            let expected = weight / 60.0;
            assert!(
                (observed - expected).abs() < 0.03,
                "observed {:.3}, expected {:.3}",
                observed,
                expected
            );
        }
    }
}
