//! # Rules Loader
//!
//! Builds charts and encounter tables out of a parsed [`RulesFile`].
//!
//! Loading is all or nothing: the first bad row aborts the load and nothing
//! parsed so far survives.

use crate::{
    config, Chart, ChartEntry, ConfigError, EncounterTable, EncounterTableEntry, Position, RowCursor,
    RulesFile, TableSet,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Everything the engine needs from the rules resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterRules {
    /// Percent chance of an encounter per check, by location
    pub frequency: Chart,
    /// Power tier by location
    pub power: Chart,
    /// Explicit table index by location
    pub overrides: Chart,
    /// All encounter tables
    pub tables: TableSet,
}

/// How the last column of a chart row is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartValues {
    /// A plain integer
    Integer,
    /// A case-insensitive token, stored as its position in the list
    Tokens(&'static [&'static str]),
}

/// Loader over one rules file.
pub struct RulesLoader<'a> {
    file: &'a RulesFile,
}

impl<'a> RulesLoader<'a> {
    /// Creates a loader reading from `file`.
    pub fn new(file: &'a RulesFile) -> Self {
        Self { file }
    }

    /// Loads the three charts and the table set.
    pub fn load(&self) -> Result<EncounterRules, ConfigError> {
        let frequency = self.chart(config::FREQUENCY_CHART_BASE, ChartValues::Integer)?;
        let power = self.chart(config::POWER_CHART_BASE, ChartValues::Tokens(&config::POWER_TOKENS))?;
        let overrides = self.chart(config::OVERRIDE_CHART_BASE, ChartValues::Integer)?;
        let tables = self.tables()?;

        debug!(
            "Loaded encounter rules: {}/{}/{} chart zones, {} tables, {} entries",
            frequency.len(),
            power.len(),
            overrides.len(),
            tables.len(),
            tables.entries().count()
        );

        Ok(EncounterRules {
            frequency,
            power,
            overrides,
            tables,
        })
    }

    /// Parses the chart whose rows start at `base`.
    pub fn chart(&self, base: i32, values: ChartValues) -> Result<Chart, ConfigError> {
        let rows = self.file.window(base, config::CHART_WINDOW)?;
        if rows.is_empty() {
            return Err(ConfigError::EmptyChart { base: Some(base) });
        }

        let entries = rows
            .into_iter()
            .map(|(row, text)| parse_chart_row(row, text, values))
            .collect::<Result<Vec<_>, _>>()?;
        Chart::new(entries)
    }

    /// Parses the table count row and every table window.
    pub fn tables(&self) -> Result<TableSet, ConfigError> {
        let row = config::TABLE_COUNT_ROW;
        let text = self.file.get(row).ok_or(ConfigError::MissingRow { row })?;
        let extra = RowCursor::new(text)
            .int()
            .ok_or_else(|| malformed(row, "expected a table count"))?;

        // Every table id must still fit in an i32.
        let max_extra = ((i32::MAX - config::FIRST_TABLE_ROW) / config::TABLE_STRIDE) as i64
            - config::BASE_TABLE_COUNT as i64;
        if !(0..=max_extra).contains(&extra) {
            return Err(ConfigError::OutOfRange {
                row,
                field: "table count",
                value: extra,
            });
        }

        let count = config::BASE_TABLE_COUNT + extra as usize;
        let tables = (0..count)
            .map(|index| self.table(config::FIRST_TABLE_ROW + config::TABLE_STRIDE * index as i32))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TableSet::new(tables))
    }

    /// Parses the table whose rows start at `base`. Rows must run without
    /// gaps from the base id.
    pub fn table(&self, base: i32) -> Result<EncounterTable, ConfigError> {
        let rows = self.file.window(base, config::TABLE_STRIDE)?;
        let mut entries = Vec::with_capacity(rows.len());
        for (offset, (row, text)) in rows.into_iter().enumerate() {
            let expected = base + offset as i32;
            if row != expected {
                return Err(ConfigError::Discontinuous { row: expected });
            }
            entries.push(parse_entry(row, text)?);
        }
        Ok(EncounterTable::new(entries))
    }
}

/// Parses `x, y, radius, value`.
pub fn parse_chart_row(row: i32, text: &str, values: ChartValues) -> Result<ChartEntry, ConfigError> {
    let mut cursor = RowCursor::new(text);
    let x = cursor.int().ok_or_else(|| malformed(row, "expected x"))?;
    let y = cursor.int().ok_or_else(|| malformed(row, "expected y"))?;
    let radius = cursor.int().ok_or_else(|| malformed(row, "expected a radius"))?;

    let value = match values {
        ChartValues::Integer => {
            let value = cursor.int().ok_or_else(|| malformed(row, "expected a value"))?;
            to_i32(row, "value", value)?
        }
        ChartValues::Tokens(tokens) => {
            let token = cursor.word().ok_or_else(|| malformed(row, "expected a value"))?;
            let lowered = token.to_lowercase();
            let position = tokens
                .iter()
                .position(|candidate| *candidate == lowered)
                .ok_or_else(|| ConfigError::UnknownValue {
                    row,
                    token: token.to_string(),
                })?;
            position as i32
        }
    };

    let radius = u32::try_from(radius).map_err(|_| ConfigError::OutOfRange {
        row,
        field: "radius",
        value: radius,
    })?;
    let location = Position::new(to_i32(row, "x", x)?, to_i32(row, "y", y)?);
    Ok(ChartEntry::new(location, radius, value))
}

/// Parses one encounter entry row.
///
/// # Examples
///
/// ```
/// use overworld_encounters::parse_entry;
///
/// let entry = parse_entry(50_003, "25, First: 1042 2-4, Second: 77 1, MaxLevel: 12").unwrap();
/// assert_eq!(entry.frequency, 25);
/// assert_eq!(entry.creatures.len(), 2);
/// assert_eq!(entry.max_level, 12);
/// assert_eq!(entry.message_id, 50_003);
/// ```
pub fn parse_entry(row: i32, text: &str) -> Result<EncounterTableEntry, ConfigError> {
    let mut cursor = RowCursor::new(text);
    let frequency = cursor
        .int()
        .ok_or_else(|| malformed(row, "expected a frequency"))?;
    if frequency < 0 {
        return Err(ConfigError::OutOfRange {
            row,
            field: "frequency",
            value: frequency,
        });
    }
    let mut entry = EncounterTableEntry::new(row, to_i32(row, "frequency", frequency)?);

    for (slot, label) in config::CREATURE_SLOT_LABELS.iter().enumerate() {
        if !cursor.named(label) {
            if slot == 0 {
                return Err(ConfigError::MissingCreature { row });
            }
            break;
        }

        let species = cursor
            .int()
            .ok_or_else(|| malformed(row, format!("{label} needs a species id")))?;
        if species == 0 {
            break;
        }
        let species = to_i32(row, "species", species)?;
        let (low, high) = cursor
            .range()
            .ok_or_else(|| malformed(row, format!("{label} needs a creature count")))?;
        let count_error = |value: i64| ConfigError::OutOfRange {
            row,
            field: "creature count",
            value,
        };
        let low = u32::try_from(low).map_err(|_| count_error(low))?;
        let high = u32::try_from(high).map_err(|_| count_error(high))?;
        if low > high {
            return Err(count_error(low as i64));
        }
        entry = entry.with_creature(species, low, high);
    }

    if let Some(level) = named_value(&cursor, row, "MinLevel:")? {
        entry.min_level = in_range(row, "MinLevel", level, 0, config::MAX_LEVEL)?;
    }
    if let Some(level) = named_value(&cursor, row, "MaxLevel:")? {
        entry.max_level = in_range(row, "MaxLevel", level, 0, config::MAX_LEVEL)?;
    }
    if let Some(flag) = named_value(&cursor, row, "GlobalFlag:")? {
        let flag = in_range(row, "GlobalFlag", flag, -1, config::MAX_GLOBAL_FLAG)?;
        entry.global_flag = (flag >= 0).then_some(flag);
    }
    if let Some(max) = named_value(&cursor, row, "TriggerCount:")? {
        let max = to_i32(row, "TriggerCount", max)?;
        entry.max_trigger_count = (max >= 0).then_some(max);
    }

    Ok(entry)
}

fn named_value(cursor: &RowCursor<'_>, row: i32, key: &str) -> Result<Option<i64>, ConfigError> {
    match cursor.find_named(key) {
        Some(mut at) => at
            .int()
            .map(Some)
            .ok_or_else(|| malformed(row, format!("{key} needs an integer"))),
        None => Ok(None),
    }
}

fn in_range(row: i32, field: &'static str, value: i64, low: i32, high: i32) -> Result<i32, ConfigError> {
    if value < low as i64 || value > high as i64 {
        return Err(ConfigError::OutOfRange { row, field, value });
    }
    Ok(value as i32)
}

fn to_i32(row: i32, field: &'static str, value: i64) -> Result<i32, ConfigError> {
    i32::try_from(value).map_err(|_| ConfigError::OutOfRange { row, field, value })
}

fn malformed(row: i32, reason: impl Into<String>) -> ConfigError {
    ConfigError::MalformedRow {
        row,
        reason: reason.into(),
    }
}
