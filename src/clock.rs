use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone};
use std::sync::Mutex;

/// Source of "now" plus the local calendar rules needed to find day boundaries.
pub trait ClockSource: Send + Sync {
    /// Current instant, carrying the local UTC offset in effect.
    fn now(&self) -> DateTime<FixedOffset>;

    /// First instant of `date` in local time, or `None` if local midnight
    /// does not exist on that date.
    fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<FixedOffset>> {
        let offset = *self.now().offset();
        offset
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .single()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<FixedOffset>> {
        Local
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .earliest()
            .map(|dt| dt.fixed_offset())
    }
}

/// Settable clock for tests and simulations. Uses a single fixed offset.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock at `hour:minute` local time on the given date, UTC offset in hours.
    pub fn at(date: NaiveDate, hour: u32, minute: u32, offset_hours: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(offset_hours * 3600)?;
        let naive = date.and_hms_opt(hour, minute, 0)?;
        let now = offset.from_local_datetime(&naive).single()?;
        Some(Self::new(now))
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
