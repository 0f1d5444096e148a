//! Calendar system for simulated dates
//!
//! One tick is one simulated month, counted from a fixed epoch.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::Tick;

/// Calendar tracks the tick counter and the simulated date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    tick: Tick,
    epoch: NaiveDate,
    date: NaiveDate,
}

impl Calendar {
    pub fn new(epoch: NaiveDate) -> Self {
        Self {
            tick: 0,
            epoch,
            date: epoch,
        }
    }

    /// Calendar starting on the first day of the given month
    pub fn from_epoch(year: i32, month: u32) -> Result<Self> {
        let epoch = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            SimError::InvalidConfig(format!("no such epoch month: {year}-{month:02}"))
        })?;
        Ok(Self::new(epoch))
    }

    /// The calendar one tick later; `self` is left untouched
    pub fn advanced(&self) -> Result<Self> {
        let date = self
            .date
            .checked_add_months(Months::new(1))
            .ok_or(SimError::CalendarOverflow(self.tick))?;
        Ok(Self {
            tick: self.tick + 1,
            epoch: self.epoch,
            date,
        })
    }

    pub fn advance(&mut self) -> Result<()> {
        *self = self.advanced()?;
        Ok(())
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn current_date(&self) -> NaiveDate {
        self.date
    }

    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}
