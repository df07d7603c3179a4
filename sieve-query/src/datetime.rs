//! Layered date/time parsing into half-open spans.
//!
//! Resolution order:
//! 1. explicit range `start_end`
//! 2. strict ISO-8601 (precision decides the span: `2010` is a whole year)
//! 3. natural-language phrases relative to the configured clock
//!    (`yesterday`, `3-days-ago`, `last-month`, `june 1st`, `friday`)
//! 4. ambiguous numeric dates (`03/04/2020`) in the locale's day/month order
//!
//! Every successful parse yields `[start, end)`.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime,
    Timelike, Weekday,
};
use std::sync::LazyLock;

use crate::config::FilterConfiguration;
use crate::locale::DateOrder;

/// A parsed half-open interval `[start, end)` in wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    /// Inclusive start.
    pub start: NaiveDateTime,
    /// Exclusive end.
    pub end: NaiveDateTime,
    /// Offset written in the text, if any.
    pub offset: Option<FixedOffset>,
}

impl DateSpan {
    fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            offset: None,
        }
    }

    fn day(date: NaiveDate) -> Option<Self> {
        let start = date.and_time(NaiveTime::MIN);
        Some(Self::new(start, start.checked_add_signed(Duration::days(1))?))
    }

    fn span(start: NaiveDateTime, unit: Unit) -> Option<Self> {
        Some(Self::new(start, unit.add(start, 1)?))
    }

    /// Span boundaries as instants, reading wall-clock times in `offset`
    /// unless the text named its own.
    pub fn with_offset(&self, offset: FixedOffset) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let offset = self.offset.unwrap_or(offset);
        let start = self.start.and_local_timezone(offset).single()?;
        let end = self.end.and_local_timezone(offset).single()?;
        Some((start, end))
    }

    /// Span boundaries as naive times; explicit offsets are normalised to UTC.
    pub fn naive(&self) -> (NaiveDateTime, NaiveDateTime) {
        match self.offset {
            Some(offset) => {
                let shift = Duration::seconds(i64::from(offset.local_minus_utc()));
                (self.start - shift, self.end - shift)
            }
            None => (self.start, self.end),
        }
    }

    /// Span boundaries as dates; a partial trailing day is included.
    ///
    /// Dates carry no zone, so the wall-clock span is used as written and
    /// any explicit offset is ignored.
    pub fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (start, end) = (self.start, self.end);
        let end_date = if end.time() == NaiveTime::MIN {
            end.date()
        } else {
            end.date().succ_opt()?
        };
        Some((start.date(), end_date))
    }
}

/// Parse `text` into a span using the configuration's clock and locale.
pub fn parse(text: &str, config: &FilterConfiguration) -> Option<DateSpan> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some((left, right)) = text.split_once('_') {
        let start = parse_single(left, config)?;
        let end = parse_single(right, config)?;
        let span = DateSpan {
            start: start.start,
            end: end.end,
            offset: start.offset.or(end.offset),
        };
        return (span.start < span.end).then_some(span);
    }
    parse_single(text, config)
}

fn parse_single(text: &str, config: &FilterConfiguration) -> Option<DateSpan> {
    let text = text.trim();
    parse_iso(text)
        .or_else(|| parse_natural(text, config.clock.now().naive_local()))
        .or_else(|| parse_ambiguous(text, config.locale.date_order()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    fn parse(word: &str) -> Option<Self> {
        let word = word.strip_suffix('s').unwrap_or(word);
        Some(match word {
            "sec" | "second" => Self::Second,
            "min" | "minute" => Self::Minute,
            "hour" => Self::Hour,
            "day" => Self::Day,
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            _ => return None,
        })
    }

    fn add(self, at: NaiveDateTime, n: i64) -> Option<NaiveDateTime> {
        match self {
            Self::Second => at.checked_add_signed(Duration::try_seconds(n)?),
            Self::Minute => at.checked_add_signed(Duration::try_minutes(n)?),
            Self::Hour => at.checked_add_signed(Duration::try_hours(n)?),
            Self::Day => at.checked_add_signed(Duration::try_days(n)?),
            Self::Week => at.checked_add_signed(Duration::try_weeks(n)?),
            Self::Month | Self::Year => {
                let months = if self == Self::Year { n.checked_mul(12)? } else { n };
                let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
                if months >= 0 {
                    at.checked_add_months(magnitude)
                } else {
                    at.checked_sub_months(magnitude)
                }
            }
        }
    }

    /// Start of the calendar unit containing `at`.
    fn floor(self, at: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = at.date();
        Some(match self {
            Self::Second => at.with_nanosecond(0)?,
            Self::Minute => at.with_nanosecond(0)?.with_second(0)?,
            Self::Hour => date.and_hms_opt(at.hour(), 0, 0)?,
            Self::Day => date.and_time(NaiveTime::MIN),
            Self::Week => {
                let back = Duration::days(i64::from(date.weekday().num_days_from_monday()));
                date.checked_sub_signed(back)?.and_time(NaiveTime::MIN)
            }
            Self::Month => date.with_day(1)?.and_time(NaiveTime::MIN),
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?.and_time(NaiveTime::MIN),
        })
    }

    /// Granularity of an `N units ago` result.
    fn relative_granularity(self) -> Self {
        match self {
            Self::Second | Self::Minute | Self::Hour => self,
            _ => Self::Day,
        }
    }
}

static ISO: LazyLock<Option<regex_lite::Regex>> = LazyLock::new(|| {
    regex_lite::Regex::new(
        r"(?i)^(\d{4})(?:-(\d{2})(?:-(\d{2})(?:[T ](\d{2})(?::(\d{2})(?::(\d{2})(?:[.,](\d{1,9}))?)?)?)?)?)?(Z|[+-]\d{2}(?::?\d{2})?)?$",
    )
    .ok()
});

static AMBIGUOUS: LazyLock<Option<regex_lite::Regex>> = LazyLock::new(|| {
    regex_lite::Regex::new(
        r"^(\d{1,4})[./-](\d{1,2})[./-](\d{1,4})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2}))?)?$",
    )
    .ok()
});

fn number(caps: &regex_lite::Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx).and_then(|m| m.as_str().parse().ok())
}

/// Strict ISO-8601 with precision-derived span.
fn parse_iso(text: &str) -> Option<DateSpan> {
    let caps = ISO.as_ref()?.captures(text)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month = number(&caps, 2);
    let day = number(&caps, 3);
    let hour = number(&caps, 4);
    let minute = number(&caps, 5);
    let second = number(&caps, 6);
    let fraction = caps.get(7).map(|m| m.as_str());

    let date = NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1))?;
    let nanos = match fraction {
        Some(digits) => format!("{:0<9}", digits).parse().ok()?,
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(
        hour.unwrap_or(0),
        minute.unwrap_or(0),
        second.unwrap_or(0),
        nanos,
    )?;
    let start = date.and_time(time);

    let end = match (fraction, second, minute, hour, day, month) {
        (Some(digits), ..) => {
            let step = 10_i64.pow(9 - digits.len() as u32);
            start.checked_add_signed(Duration::nanoseconds(step))?
        }
        (None, Some(_), ..) => Unit::Second.add(start, 1)?,
        (None, None, Some(_), ..) => Unit::Minute.add(start, 1)?,
        (None, None, None, Some(_), ..) => Unit::Hour.add(start, 1)?,
        (None, None, None, None, Some(_), _) => Unit::Day.add(start, 1)?,
        (None, None, None, None, None, Some(_)) => Unit::Month.add(start, 1)?,
        _ => Unit::Year.add(start, 1)?,
    };

    let offset = match caps.get(8).map(|m| m.as_str()) {
        None => None,
        Some(z) if z.eq_ignore_ascii_case("z") => FixedOffset::east_opt(0),
        Some(designator) => Some(parse_offset(designator)?),
    };

    Some(DateSpan { start, end, offset })
}

fn parse_offset(designator: &str) -> Option<FixedOffset> {
    let sign = if designator.starts_with('-') { -1 } else { 1 };
    let digits: String = designator[1..].chars().filter(char::is_ascii_digit).collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = match digits.get(2..4) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_count(word: &str) -> Option<i64> {
    if let Ok(n) = word.parse::<i64>() {
        return Some(n);
    }
    Some(match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    })
}

fn parse_month(word: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(word))
        .map(|idx| idx as u32 + 1)
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    let day = match word {
        "mon" | "monday" => Weekday::Mon,
        "tue" | "tues" | "tuesday" => Weekday::Tue,
        "wed" | "wednesday" => Weekday::Wed,
        "thu" | "thur" | "thurs" | "thursday" => Weekday::Thu,
        "fri" | "friday" => Weekday::Fri,
        "sat" | "saturday" => Weekday::Sat,
        "sun" | "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// Day of month with an optional ordinal suffix (`1st`, `22nd`).
fn parse_day(word: &str) -> Option<u32> {
    let digits = word.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let suffix = &word[digits.len()..];
    if !matches!(suffix, "" | "st" | "nd" | "rd" | "th") {
        return None;
    }
    digits.parse().ok().filter(|d| (1..=31).contains(d))
}

/// Natural-language phrases. Hyphens separate words like spaces do.
fn parse_natural(text: &str, now: NaiveDateTime) -> Option<DateSpan> {
    let normalized = text.to_lowercase().replace(['-', ','], " ");
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let today = now.date();

    match words.as_slice() {
        ["now"] => DateSpan::span(Unit::Second.floor(now)?, Unit::Second),
        ["today"] => DateSpan::day(today),
        ["yesterday"] => DateSpan::day(today.pred_opt()?),
        ["tomorrow"] => DateSpan::day(today.succ_opt()?),
        [count, unit, "ago"] => {
            let unit = Unit::parse(unit)?;
            let at = unit.add(now, parse_count(count)?.checked_neg()?)?;
            let granularity = unit.relative_granularity();
            DateSpan::span(granularity.floor(at)?, granularity)
        }
        ["in", count, unit] => {
            let unit = Unit::parse(unit)?;
            let at = unit.add(now, parse_count(count)?)?;
            let granularity = unit.relative_granularity();
            DateSpan::span(granularity.floor(at)?, granularity)
        }
        [which @ ("last" | "this" | "next"), word] => {
            let step = match *which {
                "last" => -1,
                "this" => 0,
                _ => 1,
            };
            if let Some(weekday) = parse_weekday(word) {
                let this_week = Unit::Week.floor(now)?.date();
                let day = this_week
                    .checked_add_signed(Duration::days(i64::from(weekday.num_days_from_monday())))?
                    .checked_add_signed(Duration::weeks(step))?;
                return DateSpan::day(day);
            }
            let unit = Unit::parse(word)?;
            let start = unit.floor(unit.add(now, step)?)?;
            DateSpan::span(start, unit)
        }
        [word] => {
            if let Some(weekday) = parse_weekday(word) {
                let back = (7 + today.weekday().num_days_from_monday()
                    - weekday.num_days_from_monday())
                    % 7;
                return DateSpan::day(today.checked_sub_signed(Duration::days(i64::from(back)))?);
            }
            let month = parse_month(word)?;
            let start = NaiveDate::from_ymd_opt(today.year(), month, 1)?.and_time(NaiveTime::MIN);
            DateSpan::span(start, Unit::Month)
        }
        [first, second] => {
            // `june 1st`, `1st june`, `june 2020`
            if let (Some(month), Some(day)) = (parse_month(first), parse_day(second)) {
                return DateSpan::day(NaiveDate::from_ymd_opt(today.year(), month, day)?);
            }
            if let (Some(day), Some(month)) = (parse_day(first), parse_month(second)) {
                return DateSpan::day(NaiveDate::from_ymd_opt(today.year(), month, day)?);
            }
            let month = parse_month(first)?;
            let year: i32 = second.parse().ok().filter(|_| second.len() == 4)?;
            let start = NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN);
            DateSpan::span(start, Unit::Month)
        }
        [first, second, third] => {
            // `june 1st 2020`, `1 june 2020`
            let year: i32 = third.parse().ok().filter(|_| third.len() == 4)?;
            let (month, day) = match (parse_month(first), parse_day(second)) {
                (Some(month), Some(day)) => (month, day),
                _ => (parse_month(second)?, parse_day(first)?),
            };
            DateSpan::day(NaiveDate::from_ymd_opt(year, month, day)?)
        }
        _ => None,
    }
}

/// Numeric dates whose field order depends on the locale.
fn parse_ambiguous(text: &str, order: DateOrder) -> Option<DateSpan> {
    let caps = AMBIGUOUS.as_ref()?.captures(text)?;
    let parts = [caps.get(1)?.as_str(), caps.get(2)?.as_str(), caps.get(3)?.as_str()];
    let values = [
        parts[0].parse::<u32>().ok()?,
        parts[1].parse::<u32>().ok()?,
        parts[2].parse::<u32>().ok()?,
    ];

    let (year, month, day) = if parts[0].len() == 4 {
        (values[0], values[1], values[2])
    } else {
        let (first, second, year) = (values[0], values[1], values[2]);
        let day_first = if first > 12 {
            true
        } else if second > 12 {
            false
        } else {
            order != DateOrder::MonthDayYear
        };
        let year = match parts[2].len() {
            1 | 2 if year < 50 => 2000 + year,
            1 | 2 => 1900 + year,
            4 => year,
            _ => return None,
        };
        if day_first {
            (year, second, first)
        } else {
            (year, first, second)
        }
    };

    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;
    match (number(&caps, 4), number(&caps, 5)) {
        (Some(hour), Some(minute)) => {
            let second = number(&caps, 6);
            let start = date.and_hms_opt(hour, minute, second.unwrap_or(0))?;
            let unit = if second.is_some() { Unit::Second } else { Unit::Minute };
            DateSpan::span(start, unit)
        }
        _ => DateSpan::day(date),
    }
}
