//! Integration tests for reading rules resources from disk.

use overworld_encounters::{
    config, ConfigError, EncounterEngine, EncounterError, EncounterResult, EngineConfig, EngineStatus,
    Position, PowerTier, RulesFile, RulesLoader, ScriptedDice, SimWorld,
};
use std::io::Write;
use std::path::PathBuf;

fn sample_rules_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/encounters.mes")
}

#[test]
fn test_sample_rules_load() -> EncounterResult<()> {
    let file = RulesFile::from_path(sample_rules_path())?;
    let rules = RulesLoader::new(&file).load()?;

    assert_eq!(rules.tables.len(), config::BASE_TABLE_COUNT + 2);
    assert_eq!(rules.frequency.len(), 4);
    assert_eq!(rules.power.len(), 4);
    assert_eq!(rules.overrides.len(), 2);

    // Smallest zone around the capital wins over the world-wide one.
    let capital = Position::new(1024, 1024);
    assert_eq!(rules.frequency.lookup(capital), Some(3));
    assert_eq!(rules.power.lookup(capital), Some(PowerTier::None.index()));
    assert_eq!(rules.power.lookup(Position::new(1124, 1024)), Some(PowerTier::Easy.index()));
    assert_eq!(rules.frequency.lookup(Position::new(1024, 1800)), Some(12));
    assert_eq!(rules.overrides.lookup(Position::new(1700, 300)), Some(54));
    assert_eq!(rules.overrides.lookup(capital), None);

    let table = rules.tables.table(0).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.entries[1].max_level, 6);
    assert_eq!(table.entries[2].creatures.len(), 2);

    let capped = rules.tables.entry_by_message_id(50_202).unwrap();
    assert_eq!(capped.global_flag, Some(120));
    assert_eq!(capped.max_trigger_count, Some(1));

    assert!(rules.tables.table(53).unwrap().is_empty());
    assert_eq!(rules.tables.table(55).unwrap().entries[0].creatures.len(), 3);
    Ok(())
}

#[test]
fn test_engine_loads_sample_rules_from_path() -> EncounterResult<()> {
    let mut engine = EncounterEngine::new(EngineConfig::default());
    assert_eq!(engine.load_rules_from_path(sample_rules_path())?, EngineStatus::Active);
    Ok(())
}

#[test]
fn test_broken_rules_on_disk_disable_engine() -> EncounterResult<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "{{10000}}{{0, 0, 10, 50}}")?;
    writeln!(file, "{{20000}}{{0, 0, 10, legendary}}")?;
    writeln!(file, "{{30000}}{{0, 0, 10, 0}}")?;
    writeln!(file, "{{49999}}{{0}}")?;
    file.flush()?;

    let parsed = RulesFile::from_path(file.path())?;
    assert!(matches!(
        RulesLoader::new(&parsed).load(),
        Err(ConfigError::UnknownValue { row: 20_000, .. })
    ));

    let mut engine = EncounterEngine::default();
    assert_eq!(engine.load_rules_from_path(file.path())?, EngineStatus::Disabled);
    assert!(engine.rules().is_none());
    Ok(())
}

#[test]
fn test_malformed_line_on_disk_disables_engine() -> EncounterResult<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "{{10000}}{{0, 0, 10, 50")?;
    file.flush()?;

    assert!(matches!(
        RulesFile::from_path(file.path()),
        Err(EncounterError::Config(ConfigError::MalformedLine { line: 1, .. }))
    ));

    let mut engine = EncounterEngine::default();
    assert_eq!(engine.load_rules_from_path(file.path())?, EngineStatus::Disabled);
    Ok(())
}

#[test]
fn test_duplicate_table_row_is_rejected() -> EncounterResult<()> {
    let mut text = std::fs::read_to_string(sample_rules_path())?;
    text.push_str("\n{50100}{5, First: 1 1}\n");
    let file: RulesFile = text.parse()?;
    assert!(matches!(
        RulesLoader::new(&file).load(),
        Err(ConfigError::DuplicateRow { row: 50_100 })
    ));
    Ok(())
}

#[test]
fn test_missing_rules_file_is_an_io_error() {
    let mut engine = EncounterEngine::default();
    let missing = sample_rules_path().with_file_name("no_such_rules.mes");
    assert!(matches!(
        engine.load_rules_from_path(missing),
        Err(EncounterError::Io(_))
    ));
    assert_eq!(engine.status(), EngineStatus::Uninitialized);
}

#[test]
fn test_zones_at_the_edge_of_the_map() -> EncounterResult<()> {
    let file: RulesFile = "{10000}{2000000000, 0, 5, 80}\n\
                           {20000}{-2147483648, 2147483647, 5, easy}\n\
                           {30000}{2147483647, -2147483648, 1, 0}\n\
                           {49999}{0}\n"
        .parse()?;
    let rules = RulesLoader::new(&file).load()?;
    let far_west = Position::new(-1_000_000_000, 0);
    assert_eq!(rules.frequency.lookup(far_west), None);
    assert_eq!(rules.power.lookup(far_west), None);
    assert_eq!(rules.overrides.lookup(far_west), None);
    assert_eq!(rules.frequency.lookup(Position::new(2_000_000_003, 0)), Some(80));

    // Uncovered frequency falls back to 5, so a roll of 6 stops the check.
    let mut engine = EncounterEngine::default();
    assert_eq!(engine.load_rules(&file), EngineStatus::Active);
    let mut world = SimWorld::new(far_west);
    let mut dice = ScriptedDice::new([6]);
    assert!(!engine.check(far_west, &mut world, &mut dice)?);
    Ok(())
}
