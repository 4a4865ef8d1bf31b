//! # Encounter Scheduler
//!
//! The recurring timer that drives encounter checks while the player
//! travels. Every firing re-arms the timer before doing anything else.

use super::{Encounter, EncounterEngine, EngineConfig};
use crate::{Dice, EncounterResult, Host, TimerQueue};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Arms and handles the encounter timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterScheduler {
    /// Shortest delay in units
    pub min_delay: i32,
    /// Longest delay in units
    pub max_delay: i32,
    /// Milliseconds per unit
    pub unit_ms: u64,
}

impl Default for EncounterScheduler {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl EncounterScheduler {
    /// Scheduler using the engine's re-arm settings.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            min_delay: config.min_rearm_delay,
            max_delay: config.max_rearm_delay,
            unit_ms: config.rearm_unit_ms,
        }
    }

    /// Queues the next firing after a random delay. Returns the delay in
    /// milliseconds.
    pub fn schedule<T, D>(&self, timers: &mut T, dice: &mut D) -> u64
    where
        T: TimerQueue + ?Sized,
        D: Dice + ?Sized,
    {
        let units = dice.between(self.min_delay, self.max_delay).max(0) as u64;
        let delay_ms = units.saturating_mul(self.unit_ms);
        timers.schedule_encounter_timer(delay_ms);
        debug!("Next random encounter check in {} ms", delay_ms);
        delay_ms
    }

    /// Handles a timer firing.
    ///
    /// Re-arms unconditionally, then checks for an encounter at the travel
    /// location when the player is on the overworld outside scripted areas.
    /// A fired encounter closes an open world map and starts it, or failing
    /// that wakes a sleeping player.
    pub fn on_timer<H, D>(
        &self,
        engine: &mut EncounterEngine,
        host: &mut H,
        dice: &mut D,
    ) -> EncounterResult<Option<Encounter>>
    where
        H: Host + ?Sized,
        D: Dice + ?Sized,
    {
        self.schedule(host, dice);

        if !host.on_overworld() || host.in_scripted_area() {
            return Ok(None);
        }

        let location = host.travel_location();
        let Some(encounter) = engine.check_encounter(location, host, dice)? else {
            return Ok(None);
        };

        if host.is_world_map_open() {
            info!("Random encounter at {:?}, leaving the world map", location);
            host.start_encounter();
        } else if host.is_sleeping() {
            info!("Random encounter at {:?} interrupts rest", location);
            host.interrupt_sleep();
        }
        Ok(Some(encounter))
    }
}
