//! Recurrence translation
//!
//! Converts ISO-8601 repeating intervals (`R<n>/<start>/<interval>`) into the
//! five-field cron syntax the service schedules with
//! (minute, hour, day-of-month, month, day-of-week).

use crate::domain::error::{Result, ValidationError};
use crate::domain::Schedule;
use chrono::{DateTime, Datelike, Duration, SecondsFormat, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Smallest interval the service can schedule
pub const MIN_INTERVAL_SECONDS: u64 = 60;

static REPEAT: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^R(\d+)$").unwrap()
});

static DURATION: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(
        r"^P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$",
    )
    .unwrap()
});

/// ISO-8601 duration, kept by component since months and years have no fixed length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsoDuration {
    pub years: u64,
    pub months: u64,
    pub weeks: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl IsoDuration {
    pub fn parse(input: &str) -> Result<Self> {
        // "P" and "...T" match the pattern but carry no component
        if input == "P" || input.ends_with('T') {
            return Err(ValidationError::recurrence(input, "empty duration"));
        }
        let caps = DURATION
            .captures(input)
            .ok_or_else(|| ValidationError::recurrence(input, "illegal ISO-8601 duration"))?;

        let field = |idx: usize| -> Result<u64> {
            match caps.get(idx) {
                Some(m) => m.as_str().parse().map_err(|_| {
                    ValidationError::recurrence(input, "duration component out of range")
                }),
                None => Ok(0),
            }
        };

        Ok(Self {
            years: field(1)?,
            months: field(2)?,
            weeks: field(3)?,
            days: field(4)?,
            hours: field(5)?,
            minutes: field(6)?,
            seconds: field(7)?,
        })
    }

    /// Length in seconds, or `None` when the duration has calendar components
    pub fn fixed_seconds(&self) -> Option<u64> {
        if self.years > 0 || self.months > 0 {
            return None;
        }
        Some(
            self.weeks
                .saturating_mul(604_800)
                .saturating_add(self.days.saturating_mul(86_400))
                .saturating_add(self.hours.saturating_mul(3_600))
                .saturating_add(self.minutes.saturating_mul(60))
                .saturating_add(self.seconds),
        )
    }

    fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Where the first occurrence is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceStart {
    /// Empty start segment: begin as soon as possible
    Immediate,
    Offset(IsoDuration),
    At(DateTime<Utc>),
}

/// Parsed `R<n>/<start>/<interval>` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    repeat: u32,
    start: RecurrenceStart,
    interval: IsoDuration,
}

impl Recurrence {
    pub fn parse(expr: &str) -> Result<Self> {
        let segments: Vec<&str> = expr.split('/').collect();
        if segments.len() != 3 {
            return Err(ValidationError::recurrence(
                expr,
                "expected three segments R<n>/<start>/<interval>",
            ));
        }

        let repeat = REPEAT
            .captures(segments[0])
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .ok_or_else(|| {
                ValidationError::recurrence(expr, "repeat segment must match R<digits>")
            })?;
        if repeat == 0 {
            return Err(ValidationError::recurrence(
                expr,
                "repeat count must be at least 1",
            ));
        }

        let start = match segments[1] {
            "" => RecurrenceStart::Immediate,
            s if s.starts_with('P') => RecurrenceStart::Offset(IsoDuration::parse(s)?),
            s => DateTime::parse_from_rfc3339(s)
                .map(|t| RecurrenceStart::At(t.with_timezone(&Utc)))
                .map_err(|_| {
                    ValidationError::recurrence(expr, "start must be empty, a duration or RFC 3339")
                })?,
        };

        let interval = IsoDuration::parse(segments[2])?;
        let too_short = match interval.fixed_seconds() {
            Some(secs) => secs < MIN_INTERVAL_SECONDS,
            None => interval.is_zero(),
        };
        if too_short {
            return Err(ValidationError::recurrence(
                expr,
                "interval is below the one-minute scheduling granularity",
            ));
        }

        Ok(Self {
            repeat,
            start,
            interval,
        })
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    pub fn start(&self) -> RecurrenceStart {
        self.start
    }

    pub fn interval(&self) -> IsoDuration {
        self.interval
    }

    /// Render the interval as a cron expression.
    ///
    /// Steps must divide their parent unit evenly (minutes into an hour, hours
    /// into a day) so every occurrence is exactly one interval apart. Day steps
    /// restart at each month boundary. An `At` start anchors the minute offset of
    /// minute steps, the minute and hour of longer steps and the weekday of
    /// weekly schedules.
    pub fn to_cron(&self) -> Result<String> {
        let unrepresentable =
            |reason: &str| ValidationError::recurrence(&self.describe(), reason.to_string());

        let (anchor_minute, anchor_hour, anchor_weekday) = match self.start {
            RecurrenceStart::At(t) => (t.minute(), t.hour(), t.weekday().num_days_from_sunday()),
            _ => (0, 0, 0),
        };

        let secs = match self.interval.fixed_seconds() {
            Some(secs) => secs,
            None => {
                let calendar_only = IsoDuration {
                    months: self.interval.months,
                    ..IsoDuration::default()
                } == self.interval;
                if !calendar_only || self.interval.months > 12 || 12 % self.interval.months != 0
                {
                    return Err(unrepresentable("calendar interval has no cron form"));
                }
                return Ok(match self.interval.months {
                    1 => format!("{anchor_minute} {anchor_hour} 1 * *"),
                    m => format!("{anchor_minute} {anchor_hour} 1 */{m} *"),
                });
            }
        };

        if secs % 60 != 0 {
            return Err(unrepresentable("interval is not a whole number of minutes"));
        }
        let minutes = secs / 60;

        if minutes < 60 {
            if 60 % minutes != 0 {
                return Err(unrepresentable("minute step does not divide an hour"));
            }
            let offset = u64::from(anchor_minute) % minutes;
            return Ok(match minutes {
                1 => "* * * * *".to_string(),
                m if offset == 0 => format!("*/{m} * * * *"),
                m => format!("{offset}-59/{m} * * * *"),
            });
        }

        if minutes % 60 != 0 {
            return Err(unrepresentable("interval mixes hours and minutes"));
        }
        let hours = minutes / 60;

        if hours < 24 {
            if 24 % hours != 0 {
                return Err(unrepresentable("hour step does not divide a day"));
            }
            return Ok(match hours {
                1 => format!("{anchor_minute} * * * *"),
                h => format!("{anchor_minute} */{h} * * *"),
            });
        }

        if hours % 24 != 0 {
            return Err(unrepresentable("interval mixes days and hours"));
        }
        match hours / 24 {
            1 => Ok(format!("{anchor_minute} {anchor_hour} * * *")),
            7 => Ok(format!("{anchor_minute} {anchor_hour} * * {anchor_weekday}")),
            d if d <= 31 => Ok(format!("{anchor_minute} {anchor_hour} */{d} * *")),
            _ => Err(unrepresentable("day step longer than a month")),
        }
    }

    /// Wrap the cron form into a schedule with service defaults
    pub fn into_schedule(self, id: impl Into<String>) -> Result<Schedule> {
        Schedule::new(id, self.to_cron()?)
    }

    fn describe(&self) -> String {
        format!("R{}/.../{:?}", self.repeat, self.interval)
    }
}

/// Cron expression for the first whole minute after `now`
///
/// The running minute is already past for a cron evaluator, so the next one is
/// used; hour, day and month carry over at their boundaries.
pub fn immediate_cron(now: DateTime<Utc>) -> String {
    let minute_start = now
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    let next = minute_start
        .checked_add_signed(Duration::minutes(1))
        .unwrap_or(minute_start);
    format!(
        "{} {} {} {} *",
        next.minute(),
        next.hour(),
        next.day(),
        next.month()
    )
}

/// Build an ISO-8601 repeating interval from its parts
///
/// A missing start renders as an empty segment (`R10//P10M`).
pub fn format_recurrence(
    start: Option<DateTime<Utc>>,
    interval: &str,
    repetitions: &str,
) -> Result<String> {
    if !interval.starts_with('P') {
        return Err(ValidationError::Format("Interval"));
    }
    if !repetitions.starts_with('R') {
        return Err(ValidationError::Format("Repetitions"));
    }
    let start = start
        .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_default();
    Ok(format!("{repetitions}/{start}/{interval}"))
}
