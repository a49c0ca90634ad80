//! Table configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::state::TableSettings;

/// Configuration for one table actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// Engine settings: seats, stacks, blind schedule, timers.
    pub settings: TableSettings,

    /// How often the actor ticks itself.
    pub tick_interval: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Default Table".to_string(),
            settings: TableSettings::default(),
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.settings.max_seats < 2 {
            return Err("A table needs at least two seats".to_string());
        }

        if self.settings.starting_stack == 0 {
            return Err("Starting stack must be positive".to_string());
        }

        if self.settings.blind_schedule.is_empty() {
            return Err("Blind schedule must have at least one level".to_string());
        }

        for level in &self.settings.blind_schedule {
            if level.big <= level.small {
                return Err("Big blind must be greater than small blind".to_string());
            }
        }

        if self.settings.level_duration.is_zero() {
            return Err("Level duration must be positive".to_string());
        }

        if self.settings.action_timeout.is_zero() {
            return Err("Action timeout must be positive".to_string());
        }

        if self.tick_interval.is_zero() {
            return Err("Tick interval must be positive".to_string());
        }

        Ok(())
    }
}
