//! Restock countdowns for each shop category.
//!
//! The shop restocks on fixed wall-clock cadences. Timers are derived fresh
//! from the current instant every time they are needed and never cached.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::clock::{countdown, next_aligned};

pub const EGG_CADENCE_SECS: u32 = 30 * 60;
pub const GEAR_CADENCE_SECS: u32 = 5 * 60;
pub const SEED_CADENCE_SECS: u32 = 5 * 60;
pub const HONEY_CADENCE_SECS: u32 = 60 * 60;
/// Counted from local midnight, so the last window of the day runs past 00:00.
pub const COSMETICS_CADENCE_SECS: u32 = 7 * 60 * 60;

/// Human-readable time left until each category restocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockTimers {
    pub gear: String,
    pub seed: String,
    pub egg: String,
    pub honey: String,
    pub cosmetics: String,
}

impl RestockTimers {
    pub fn at(now: &DateTime<Tz>) -> Self {
        let timer = |cadence| countdown(now, &next_aligned(now, cadence, 0));
        Self {
            gear: timer(GEAR_CADENCE_SECS),
            seed: timer(SEED_CADENCE_SECS),
            egg: timer(EGG_CADENCE_SECS),
            honey: timer(HONEY_CADENCE_SECS),
            cosmetics: timer(COSMETICS_CADENCE_SECS),
        }
    }
}
