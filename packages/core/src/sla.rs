// ABOUTME: SLA clock for release-test cycles
// ABOUTME: Pure evaluation of remaining time, expiry and countdown labels against a caller-supplied now

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use tracing::debug;

use crate::error::SlaError;

/// Length of the window opened by "start SLA".
pub const DEFAULT_SLA_HOURS: u32 = 24;

/// Hours added by "extend SLA" when the caller does not say otherwise.
pub const DEFAULT_EXTENSION_HOURS: u32 = 1;

pub const LABEL_NOT_STARTED: &str = "Não iniciado";
pub const LABEL_EXPIRED: &str = "SLA Vencido";

/// State of a cycle's SLA at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaState {
    NotStarted,
    Remaining(Duration),
    Expired,
}

impl SlaState {
    /// Evaluates the SLA given its end timestamp. The end instant itself counts
    /// as expired.
    pub fn evaluate(end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match end {
            None => SlaState::NotStarted,
            Some(end) if end <= now => SlaState::Expired,
            Some(end) => SlaState::Remaining(end - now),
        }
    }

    /// Same as [`SlaState::evaluate`] but from the raw backend string. Empty or
    /// unparsable values read as not started.
    pub fn from_raw(end: &str, now: DateTime<Utc>) -> Self {
        Self::evaluate(parse_timestamp(end), now)
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, SlaState::Expired)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, SlaState::Remaining(_))
    }

    pub fn remaining(&self) -> Option<Duration> {
        match self {
            SlaState::Remaining(d) => Some(*d),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            SlaState::NotStarted => LABEL_NOT_STARTED.to_string(),
            SlaState::Remaining(d) => format_countdown(*d),
            SlaState::Expired => LABEL_EXPIRED.to_string(),
        }
    }
}

impl fmt::Display for SlaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Formats a duration as `HH:MM:SS`. Hours are not wrapped at 24, fractional
/// seconds are dropped and negative durations clamp to zero.
pub fn format_countdown(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Parses a backend timestamp.
///
/// Accepts RFC 3339 (with offset) and naive ISO 8601 such as
/// `2024-05-10T14:00:00.123456`. The backend stamps naive values in its local
/// time, so they are read in the operator's local zone.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    parse_timestamp_in(raw, &Local)
}

/// Like [`parse_timestamp`] with naive values read in `zone`.
pub fn parse_timestamp_in<Tz: TimeZone>(raw: &str, zone: &Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = match raw.parse::<NaiveDateTime>() {
        Ok(naive) => naive,
        Err(e) => {
            debug!(value = raw, error = %e, "Ignoring unparsable SLA timestamp");
            return None;
        }
    };

    match zone.from_local_datetime(&naive).earliest() {
        Some(dt) => Some(dt.with_timezone(&Utc)),
        None => {
            debug!(value = raw, "Timestamp falls in a DST gap, reading as UTC");
            Some(Utc.from_utc_datetime(&naive))
        }
    }
}

/// Window opened when the SLA starts: `(now, now + 24h)`.
pub fn start_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + Duration::hours(i64::from(DEFAULT_SLA_HOURS)))
}

/// Pushes an SLA end forward by whole hours.
pub fn extend(end: DateTime<Utc>, hours: u32) -> DateTime<Utc> {
    end + Duration::hours(i64::from(hours))
}

/// Checked extension: the SLA must have an end and the hours must be positive.
pub fn try_extend(end: Option<DateTime<Utc>>, hours: u32) -> Result<DateTime<Utc>, SlaError> {
    if hours == 0 {
        return Err(SlaError::InvalidHours(hours));
    }
    let end = end.ok_or(SlaError::NotStarted)?;
    Ok(extend(end, hours))
}
