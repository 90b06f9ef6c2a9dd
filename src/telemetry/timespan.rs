use super::TelemetryError;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("valid iso duration regex")
});

/// A positive ISO-8601 duration such as `PT1H`, `P7D` or `P1DT12H`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timespan {
    iso: String,
    duration: Duration,
}

impl Timespan {
    pub fn parse(input: &str) -> Result<Self, TelemetryError> {
        let iso = input.trim().to_uppercase();
        let invalid = || TelemetryError::InvalidTimespan(input.to_string());

        let caps = DURATION_RE.captures(&iso).ok_or_else(invalid)?;
        if iso.ends_with('T') {
            return Err(invalid());
        }

        let units: [(usize, fn(i64) -> Option<Duration>); 5] = [
            (1, Duration::try_weeks),
            (2, Duration::try_days),
            (3, Duration::try_hours),
            (4, Duration::try_minutes),
            (5, Duration::try_seconds),
        ];

        let mut duration = Duration::zero();
        let mut any = false;
        for (group, unit) in units {
            if let Some(m) = caps.get(group) {
                let value: i64 = m.as_str().parse().map_err(|_| invalid())?;
                let part = unit(value).ok_or_else(invalid)?;
                duration = duration.checked_add(&part).ok_or_else(invalid)?;
                any = true;
            }
        }

        if !any || duration <= Duration::zero() {
            return Err(invalid());
        }

        Ok(Self { iso, duration })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn as_iso8601(&self) -> &str {
        &self.iso
    }

    /// `start/end` interval of this length ending at `end`.
    ///
    /// Fails when the start would fall before the earliest representable date.
    pub fn interval_ending(&self, end: DateTime<Utc>) -> Result<String, TelemetryError> {
        let start = end
            .checked_sub_signed(self.duration)
            .ok_or_else(|| TelemetryError::InvalidTimespan(self.iso.clone()))?;
        Ok(format!(
            "{}/{}",
            start.to_rfc3339_opts(SecondsFormat::Secs, true),
            end.to_rfc3339_opts(SecondsFormat::Secs, true)
        ))
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso)
    }
}
