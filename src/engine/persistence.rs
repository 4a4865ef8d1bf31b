//! # Trigger Count Persistence
//!
//! Saves and restores how often each encounter entry has fired.
//!
//! The payload is a little-endian `i32` record count followed by that many
//! `{trigger_count: i32, message_id: i32}` records. Records are matched to
//! entries by message id, so a save survives entries being added, removed
//! or moved between tables.

use super::{EncounterEngine, EngineState};
use crate::{EncounterError, EncounterResult, TableSet};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};

/// Saved trigger count of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerRecord {
    /// How often the entry fired
    pub trigger_count: i32,
    /// Row id of the entry
    pub message_id: i32,
}

/// Collects a record for every entry, in table order.
pub fn collect_trigger_records(tables: &TableSet) -> Vec<TriggerRecord> {
    tables
        .entries()
        .map(|entry| TriggerRecord {
            trigger_count: entry.trigger_count,
            message_id: entry.message_id,
        })
        .collect()
}

/// Resets every trigger count, then applies the records whose message id
/// names an entry. Returns the number of entries restored.
pub fn apply_trigger_records(tables: &mut TableSet, records: &[TriggerRecord]) -> usize {
    let mut saved = HashMap::with_capacity(records.len());
    for record in records {
        saved.entry(record.message_id).or_insert(record.trigger_count);
    }

    let mut restored = 0;
    for entry in tables.entries_mut() {
        entry.trigger_count = match saved.get(&entry.message_id) {
            Some(count) => {
                restored += 1;
                *count
            }
            None => 0,
        };
    }
    restored
}

/// Writes records in the save format.
pub fn write_trigger_records<W: Write>(mut writer: W, records: &[TriggerRecord]) -> EncounterResult<()> {
    let count = i32::try_from(records.len())
        .map_err(|_| EncounterError::SaveData(format!("too many trigger records: {}", records.len())))?;
    writer.write_all(&count.to_le_bytes())?;
    for record in records {
        writer.write_all(&record.trigger_count.to_le_bytes())?;
        writer.write_all(&record.message_id.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads records in the save format.
pub fn read_trigger_records<R: Read>(mut reader: R) -> EncounterResult<Vec<TriggerRecord>> {
    let count = read_i32(&mut reader, "record count")?;
    if count < 0 {
        return Err(EncounterError::SaveData(format!("negative record count {}", count)));
    }

    // Capacity is capped so a corrupt count can't allocate ahead of the data.
    let mut records = Vec::with_capacity(count.min(4_096) as usize);
    for _ in 0..count {
        let trigger_count = read_i32(&mut reader, "trigger count")?;
        let message_id = read_i32(&mut reader, "message id")?;
        records.push(TriggerRecord {
            trigger_count,
            message_id,
        });
    }
    Ok(records)
}

fn read_i32<R: Read>(reader: &mut R, what: &str) -> EncounterResult<i32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes).map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            EncounterError::SaveData(format!("truncated while reading {}", what))
        } else {
            EncounterError::Io(err)
        }
    })?;
    Ok(i32::from_le_bytes(bytes))
}

impl EncounterEngine {
    /// Trigger counts of all loaded entries; empty unless active.
    pub fn trigger_records(&self) -> Vec<TriggerRecord> {
        match &self.state {
            EngineState::Active(rules) => collect_trigger_records(&rules.tables),
            _ => Vec::new(),
        }
    }

    /// Writes the trigger counts. An inactive engine writes zero records.
    pub fn save<W: Write>(&self, writer: W) -> EncounterResult<()> {
        let records = self.trigger_records();
        write_trigger_records(writer, &records).map_err(|err| {
            error!("Error writing random encounter save data: {}", err);
            err
        })?;
        debug!("Saved {} encounter trigger records", records.len());
        Ok(())
    }

    /// Reads trigger counts and applies them to the loaded entries.
    ///
    /// The payload is always consumed; an inactive engine ignores it.
    pub fn load<R: Read>(&mut self, reader: R) -> EncounterResult<()> {
        let records = read_trigger_records(reader).map_err(|err| {
            error!("Error reading random encounter save data: {}", err);
            err
        })?;

        if let EngineState::Active(rules) = &mut self.state {
            let restored = apply_trigger_records(&mut rules.tables, &records);
            debug!(
                "Restored {} of {} encounter trigger records",
                restored,
                records.len()
            );
        }
        Ok(())
    }
}
