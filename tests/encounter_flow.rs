//! End-to-end tests: rules in, creatures and save data out.

use overworld_encounters::{
    EncounterEngine, EncounterResult, EncounterScheduler, EngineConfig, EngineStatus, Position,
    RawTerrain, RulesFile, ScriptedDice, SectorTerrain, SimWorld,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{BufReader, BufWriter};

/// Frequency 80 around the origin, easy power everywhere, and one entry in
/// the daytime easy grasslands table (index 0) and the plains one (6).
const RULES: &str = "\
{10000}{0, 0, 100, 80}
{20000}{0, 0, 10000, easy}
{30000}{5000, 5000, 1, 0}
{49999}{0}
{50000}{10, First: 501 2-4, Second: 502 1}
{50001}{30, First: 503 1, MinLevel: 4}
{50600}{10, First: 504 3}
";

fn engine() -> EncounterResult<EncounterEngine> {
    let file: RulesFile = RULES.parse()?;
    let mut engine = EncounterEngine::new(EngineConfig::for_testing());
    assert_eq!(engine.load_rules(&file), EngineStatus::Active);
    Ok(engine)
}

#[test]
fn test_roll_above_frequency_stops_before_any_lookup() -> EncounterResult<()> {
    let mut engine = engine()?;
    let mut world = SimWorld::new(Position::new(10, 10));

    for roll in [81, 90, 100] {
        let mut dice = ScriptedDice::new([roll, 1, 1, 1, 1]);
        assert!(!engine.check(Position::new(10, 10), &mut world, &mut dice)?);
        assert_eq!(dice.consumed(), 1);
    }
    assert_eq!(world.terrain_queries(), 0);
    assert_eq!(world.creature_count(), 0);
    Ok(())
}

#[test]
fn test_roll_within_frequency_spawns_encounter() -> EncounterResult<()> {
    let mut engine = engine()?;
    let anchor = Position::new(10, 10);
    let mut world = SimWorld::new(anchor);

    // Frequency 80, entry roll 1, three of species 501, west baseline. The
    // lone 502 starts on the tile the first 501 already holds and is dropped.
    let mut dice = ScriptedDice::new([80, 1, 3, 1]);
    let encounter = engine.check_encounter(anchor, &mut world, &mut dice)?.unwrap();
    assert_eq!(dice.remaining(), 0);
    assert_eq!(encounter.table_index, 0);
    assert_eq!(encounter.message_id, 50_000);
    assert_eq!(encounter.creatures.len(), 3);
    assert_eq!(world.creature_count(), 3);

    let species: Vec<i32> = encounter.creatures.iter().map(|creature| creature.species).collect();
    assert_eq!(species, vec![501, 501, 501]);
    for creature in &encounter.creatures {
        assert!(creature.tile.x < anchor.x);
        assert!(creature.facing.is_some());
    }
    Ok(())
}

#[test]
fn test_terrain_picks_the_table() -> EncounterResult<()> {
    let mut engine = engine()?;
    let anchor = Position::new(10, 10);
    let mut world = SimWorld::new(anchor);
    world.set_sector_terrain((0, 0), SectorTerrain::blended(RawTerrain::Deforested, RawTerrain::Plains));

    let mut dice = ScriptedDice::new([1, 1, 1]);
    let encounter = engine.check_encounter(anchor, &mut world, &mut dice)?.unwrap();
    assert_eq!(encounter.table_index, 6);
    assert_eq!(encounter.creatures.len(), 3);
    Ok(())
}

#[test]
fn test_trigger_counts_survive_save_and_load() -> EncounterResult<()> {
    let mut engine = engine()?;
    let anchor = Position::new(10, 10);
    let mut world = SimWorld::new(anchor);
    let mut dice = ScriptedDice::new([1, 1, 2, 1]);
    assert!(engine.check(anchor, &mut world, &mut dice)?);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("encounters.sav");
    engine.save(BufWriter::new(File::create(&path)?))?;

    let mut restored = EncounterEngine::new(EngineConfig::for_testing());
    assert_eq!(restored.load_rules(&RULES.parse()?), EngineStatus::Active);
    restored.load(BufReader::new(File::open(&path)?))?;

    let tables = &restored.rules().unwrap().tables;
    assert_eq!(tables.entry_by_message_id(50_000).unwrap().trigger_count, 1);
    assert_eq!(tables.entry_by_message_id(50_001).unwrap().trigger_count, 0);
    assert_eq!(tables.entry_by_message_id(50_600).unwrap().trigger_count, 0);
    assert_eq!(restored.trigger_records(), engine.trigger_records());
    Ok(())
}

#[test]
fn test_save_survives_content_changes() -> EncounterResult<()> {
    let mut engine = engine()?;
    let anchor = Position::new(10, 10);
    let mut world = SimWorld::new(anchor);
    world.set_sector_terrain((0, 0), SectorTerrain::uniform(RawTerrain::Plains));
    let mut dice = ScriptedDice::new([1, 1, 1]);
    assert!(engine.check(anchor, &mut world, &mut dice)?);

    let mut bytes = Vec::new();
    engine.save(&mut bytes)?;

    // Table 6 gains a row; saved counts follow row ids, not table positions.
    let changed = RULES.replace("{50600}{10, First: 504 3}", "{50600}{5, First: 505 1}\n{50601}{10, First: 504 3}");
    let mut updated = EncounterEngine::new(EngineConfig::for_testing());
    assert_eq!(updated.load_rules(&changed.parse()?), EngineStatus::Active);
    updated.load(bytes.as_slice())?;

    let tables = &updated.rules().unwrap().tables;
    assert_eq!(tables.entry_by_message_id(50_600).unwrap().trigger_count, 1);
    assert_eq!(tables.entry_by_message_id(50_601).unwrap().trigger_count, 0);
    Ok(())
}

#[test]
fn test_scheduler_keeps_cadence_over_a_long_trip() -> EncounterResult<()> {
    let mut engine = engine()?;
    let scheduler = EncounterScheduler::from_config(engine.config());
    let mut world = SimWorld::new(Position::new(10, 10));
    let mut rng = StdRng::seed_from_u64(2024);

    scheduler.schedule(&mut world, &mut rng);
    let mut fired = 0;
    let mut last_clock = 0;
    for _ in 0..200 {
        assert!(world.advance_to_next_timer());
        let gap = world.clock_ms() - last_clock;
        assert!((300_000..=700_000).contains(&gap), "gap {}", gap);
        last_clock = world.clock_ms();

        if scheduler.on_timer(&mut engine, &mut world, &mut rng)?.is_some() {
            fired += 1;
            world.clear_creatures();
            world.world_map_open = true;
        }
        assert_eq!(world.pending_timers().len(), 1);
    }

    // Roughly 80% of daytime checks fire; nights hit empty tables.
    assert!(fired > 20, "only {} encounters", fired);
    assert_eq!(world.encounters_started, fired);
    let total: i32 = engine.trigger_records().iter().map(|record| record.trigger_count).sum();
    assert_eq!(total as u32, fired);
    Ok(())
}
