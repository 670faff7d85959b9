use crate::error::{config_err_res, VavooError};
use crate::utils::{default_fixed_time, default_interval_minutes, parse_time_of_day};
use chrono::{NaiveTime, TimeDelta};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    #[default]
    Interval,
    FixedTime,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mode: ScheduleMode,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    #[serde(default = "default_fixed_time")]
    pub fixed_time: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: ScheduleMode::default(),
            interval_minutes: default_interval_minutes(),
            fixed_time: default_fixed_time(),
        }
    }
}

impl ScheduleConfig {
    pub(crate) fn prepare(&mut self) -> Result<(), VavooError> {
        if self.interval_minutes == 0 {
            return config_err_res!("Schedule interval_minutes must be at least 1");
        }
        match parse_time_of_day(&self.fixed_time) {
            Some(time) => self.fixed_time = time.format("%H:%M").to_string(),
            None => return config_err_res!("Invalid schedule fixed_time, expected HH:MM: {}", self.fixed_time),
        }
        Ok(())
    }

    pub fn interval(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.interval_minutes.max(1)))
    }

    pub fn time_of_day(&self) -> Option<NaiveTime> {
        parse_time_of_day(&self.fixed_time)
    }

    /// The distance between two regular fires.
    pub fn period(&self) -> TimeDelta {
        match self.mode {
            ScheduleMode::Interval => self.interval(),
            ScheduleMode::FixedTime => TimeDelta::hours(24),
        }
    }
}
