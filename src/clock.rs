use chrono::{DateTime, NaiveDate, Utc};

/// Single source of "now" for the whole engine. Challenge selection, streak
/// continuity and snapshot keys must all agree on the same calendar day, so
/// nothing below the orchestrator is allowed to call `Utc::now()` itself.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for tests: pins "today" so day-boundary behavior is exact.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn on_date(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(12, 0, 0).expect("valid time").and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_pins_today() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let clock = FixedClock::on_date(date);
        assert_eq!(clock.today(), date);
    }
}
