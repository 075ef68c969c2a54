use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Shown instead of a countdown once the target instant has passed.
pub const RESTOCKED: &str = "Just Restocked!";

/// Wall clock pinned to a single IANA time zone.
///
/// Every cadence boundary is computed in this zone regardless of the host's
/// local zone. A clock can be frozen at a fixed instant for tests.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    tz: Tz,
    frozen: Option<DateTime<Utc>>,
}

impl Clock {
    pub fn new(tz: Tz) -> Self {
        Self { tz, frozen: None }
    }

    /// A clock that always reports `at`.
    pub fn frozen(tz: Tz, at: DateTime<Utc>) -> Self {
        Self {
            tz,
            frozen: Some(at),
        }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Current instant in the clock's zone.
    pub fn now(&self) -> DateTime<Tz> {
        self.frozen.unwrap_or_else(Utc::now).with_timezone(&self.tz)
    }

    /// Next boundary strictly after `now()`. See [`next_aligned`].
    pub fn next_aligned(&self, cadence_secs: u32, offset_secs: u32) -> DateTime<Tz> {
        next_aligned(&self.now(), cadence_secs, offset_secs)
    }

    /// Time left until `target`, clamped at zero.
    pub fn until(&self, target: &DateTime<Tz>) -> std::time::Duration {
        (*target - self.now()).to_std().unwrap_or_default()
    }

    pub fn countdown(&self, target: &DateTime<Tz>) -> String {
        countdown(&self.now(), target)
    }
}

/// Smallest instant strictly greater than `now` that sits on a cadence
/// boundary.
///
/// Boundaries are counted from local midnight of `now`'s date and shifted by
/// `offset_secs`, so a 300s cadence with a 15s offset fires at `hh:00:15`,
/// `hh:05:15`, ... The result may fall on the following day.
pub fn next_aligned(now: &DateTime<Tz>, cadence_secs: u32, offset_secs: u32) -> DateTime<Tz> {
    let cadence = i64::from(cadence_secs.max(1));
    let offset = i64::from(offset_secs);

    let midnight = local_midnight(now);
    let elapsed = (*now - midnight).num_seconds();

    let slot = (elapsed - offset).div_euclid(cadence) + 1;
    midnight + Duration::seconds(slot * cadence + offset)
}

/// Remaining time as `HHh MMm SSs`, or [`RESTOCKED`] once `target <= now`.
pub fn countdown(now: &DateTime<Tz>, target: &DateTime<Tz>) -> String {
    let ms_left = (*target - *now).num_milliseconds();
    if ms_left <= 0 {
        return RESTOCKED.to_string();
    }

    let secs = ms_left / 1000;
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{h:02}h {m:02}m {s:02}s")
}

fn local_midnight(now: &DateTime<Tz>) -> DateTime<Tz> {
    let naive = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&naive).earliest() {
        Some(midnight) => midnight,
        // Midnight skipped by a DST jump: fall back to wall-clock arithmetic.
        None => {
            *now - Duration::seconds(i64::from(now.num_seconds_from_midnight()))
                - Duration::nanoseconds(i64::from(now.nanosecond()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Manila;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Tz> {
        Manila.with_ymd_and_hms(2025, 6, 1, h, m, s).unwrap()
    }

    #[test]
    fn next_aligned_rounds_up_to_boundary() {
        assert_eq!(next_aligned(&at(12, 7, 0), 300, 0), at(12, 10, 0));
    }

    #[test]
    fn next_aligned_excludes_now() {
        assert_eq!(next_aligned(&at(12, 10, 0), 300, 0), at(12, 15, 0));
    }

    #[test]
    fn next_aligned_applies_offset() {
        assert_eq!(next_aligned(&at(12, 7, 0), 300, 15), at(12, 10, 15));
        assert_eq!(next_aligned(&at(12, 10, 5), 300, 15), at(12, 10, 15));
        assert_eq!(next_aligned(&at(12, 10, 15), 300, 15), at(12, 15, 15));
    }

    #[test]
    fn next_aligned_carries_into_next_hour() {
        assert_eq!(next_aligned(&at(12, 58, 30), 300, 0), at(13, 0, 0));
        assert_eq!(next_aligned(&at(12, 59, 59), 300, 15), at(13, 0, 15));
    }

    #[test]
    fn next_aligned_carries_into_next_day() {
        let next = next_aligned(&at(23, 57, 0), 300, 0);
        assert_eq!(next, Manila.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn next_aligned_before_first_offset_of_day() {
        assert_eq!(next_aligned(&at(0, 0, 5), 300, 15), at(0, 0, 15));
    }

    #[test]
    fn next_aligned_ignores_sub_second_precision() {
        let now = at(12, 10, 0) + Duration::milliseconds(500);
        assert_eq!(next_aligned(&now, 300, 0), at(12, 15, 0));
    }

    #[test]
    fn next_aligned_is_independent_of_input_zone() {
        let utc = Utc.with_ymd_and_hms(2025, 6, 1, 4, 7, 0).unwrap();
        let clock = Clock::frozen(Manila, utc);
        assert_eq!(clock.next_aligned(300, 0), at(12, 10, 0));
    }

    #[test]
    fn countdown_formats_remaining_time() {
        assert_eq!(countdown(&at(12, 0, 0), &at(13, 2, 5)), "01h 02m 05s");
        assert_eq!(countdown(&at(12, 0, 0), &at(12, 0, 9)), "00h 00m 09s");
    }

    #[test]
    fn countdown_past_target_is_restocked() {
        assert_eq!(countdown(&at(12, 0, 0), &at(12, 0, 0)), RESTOCKED);
        assert_eq!(countdown(&at(12, 0, 1), &at(12, 0, 0)), RESTOCKED);
    }

    #[test]
    fn until_clamps_at_zero() {
        let clock = Clock::frozen(Manila, at(12, 0, 0).with_timezone(&Utc));
        assert_eq!(clock.until(&at(11, 0, 0)), std::time::Duration::ZERO);
        assert_eq!(clock.until(&at(12, 0, 30)), std::time::Duration::from_secs(30));
    }
}
