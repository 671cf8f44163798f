// ==========================================
// Date arithmetic
// ==========================================
// Input: calendar-only strings (YYYY-MM-DD), timestamps, chrono values
// Output: calendar dates in an explicit timezone, elapsed days / weeks,
//         production week, localized labels
// ==========================================
// Calendar-only strings are built from their y/m/d components as local
// midnight in the calendar's timezone. They are never read as UTC midnight.
// ==========================================

use crate::i18n::{t, t_with_args, Locale};
use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc,
};

/// Milliseconds in one day
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// First production week
pub const FIRST_WEEK: u32 = 1;

/// Last production week tracked by the feed plan; later weeks collapse here
pub const LAST_WEEK: u32 = 6;

/// Label rendered for a missing / unparseable date
pub const NOT_AVAILABLE: &str = "N/A";

/// Timestamp layouts carrying an explicit offset
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Timestamp layouts without offset (read as local wall-clock time)
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// ==========================================
// DateInput - heterogeneous date-like value
// ==========================================

/// Anything a screen may hand over as a date
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    /// No value (null / undefined / empty field)
    Missing,
    /// Raw text: calendar-only or timestamp
    Text(String),
    /// A calendar date without time of day
    Calendar(NaiveDate),
    /// Local wall-clock date and time
    Naive(NaiveDateTime),
    /// An absolute instant
    Instant(DateTime<Utc>),
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        DateInput::Text(s)
    }
}

impl From<&String> for DateInput {
    fn from(s: &String) -> Self {
        DateInput::Text(s.clone())
    }
}

impl From<NaiveDate> for DateInput {
    fn from(d: NaiveDate) -> Self {
        DateInput::Calendar(d)
    }
}

impl From<&NaiveDate> for DateInput {
    fn from(d: &NaiveDate) -> Self {
        DateInput::Calendar(*d)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(d: NaiveDateTime) -> Self {
        DateInput::Naive(d)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(d: DateTime<Tz>) -> Self {
        DateInput::Instant(d.with_timezone(&Utc))
    }
}

impl<Tz: TimeZone> From<&DateTime<Tz>> for DateInput {
    fn from(d: &DateTime<Tz>) -> Self {
        DateInput::Instant(d.with_timezone(&Utc))
    }
}

impl<T: Into<DateInput>> From<Option<T>> for DateInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DateInput::Missing)
    }
}

/// `YYYY-MM-DD` and nothing else
fn is_calendar_only(s: &str) -> bool {
    let mut parts = s.split('-');
    let widths = [4..=4, 1..=2, 1..=2];
    widths.iter().all(|w| {
        parts
            .next()
            .is_some_and(|p| w.contains(&p.len()) && p.bytes().all(|c| c.is_ascii_digit()))
    }) && parts.next().is_none()
}

// ==========================================
// Clock
// ==========================================

/// Source of "now"
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen clock for reports pinned to a moment, and for tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ==========================================
// Date display style
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// day + abbreviated month ("15 ene")
    Short,
    /// day + abbreviated month + year ("15 ene 2025")
    Medium,
    /// day + full month + year ("15 de enero de 2025")
    Long,
}

impl DateStyle {
    fn layout_key(&self) -> &'static str {
        match self {
            DateStyle::Short => "date.layout.short",
            DateStyle::Medium => "date.layout.default",
            DateStyle::Long => "date.layout.long",
        }
    }

    fn month_key(&self) -> &'static str {
        match self {
            DateStyle::Short | DateStyle::Medium => "date.month_short",
            DateStyle::Long => "date.month_long",
        }
    }
}

/// Render a calendar date in the given style and locale
pub fn render_calendar_date(date: NaiveDate, style: DateStyle, locale: Locale) -> String {
    let month = t(locale, &format!("{}.m{:02}", style.month_key(), date.month()));
    let day = date.day().to_string();
    let year = date.year().to_string();
    t_with_args(
        locale,
        style.layout_key(),
        &[("day", &day), ("month", &month), ("year", &year)],
    )
}

/// Render a date as `YYYY-MM-DD` using its own calendar date
pub fn to_iso_date_string<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    date.date_naive().format("%Y-%m-%d").to_string()
}

/// `ceil(days / 7)`
pub fn days_to_weeks(days: i64) -> i64 {
    (days as f64 / 7.0).ceil() as i64
}

// ==========================================
// Calendar - timezone + clock context
// ==========================================

/// Date arithmetic bound to an explicit timezone and clock
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone = Local, C: Clock = SystemClock> {
    tz: Tz,
    clock: C,
}

impl Calendar<Local, SystemClock> {
    /// Host timezone, wall clock
    pub fn local() -> Self {
        Self {
            tz: Local,
            clock: SystemClock,
        }
    }
}

impl Default for Calendar<Local, SystemClock> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz: TimeZone, C: Clock> Calendar<Tz, C> {
    pub fn new(tz: Tz, clock: C) -> Self {
        Self { tz, clock }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Current instant in this calendar's timezone
    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.tz)
    }

    /// Today's calendar date in this calendar's timezone
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Local wall-clock time → instant
    ///
    /// Ambiguous times take the earlier instant; times inside a DST gap are
    /// moved forward one hour.
    pub fn from_local(&self, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                self.tz
                    .from_local_datetime(&(naive + Duration::hours(1)))
                    .earliest()
            })
    }

    /// Local midnight of a calendar date
    pub fn midnight(&self, date: NaiveDate) -> Option<DateTime<Tz>> {
        self.from_local(date.and_hms_opt(0, 0, 0)?)
    }

    /// Resolve a date-like input; `None` is the "no date" sentinel
    pub fn parse(&self, input: impl Into<DateInput>) -> Option<DateTime<Tz>> {
        match input.into() {
            DateInput::Missing => None,
            DateInput::Text(s) => self.parse_text(&s),
            DateInput::Calendar(d) => self.midnight(d),
            DateInput::Naive(dt) => self.from_local(dt),
            DateInput::Instant(dt) => Some(dt.with_timezone(&self.tz)),
        }
    }

    fn parse_text(&self, text: &str) -> Option<DateTime<Tz>> {
        let s = text.trim();
        if s.is_empty() {
            return None;
        }

        if is_calendar_only(s) {
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
            return self.midnight(date);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&self.tz));
        }

        for layout in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, layout) {
                return Some(dt.with_timezone(&self.tz));
            }
        }

        for layout in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
                return self.from_local(naive);
            }
        }

        None
    }

    // ==========================================
    // Formatting
    // ==========================================

    /// Format in the given style; "N/A" for a missing / unparseable date
    pub fn format_with_style(
        &self,
        input: impl Into<DateInput>,
        style: DateStyle,
        locale: Locale,
    ) -> String {
        match self.parse(input) {
            Some(dt) => render_calendar_date(dt.date_naive(), style, locale),
            None => NOT_AVAILABLE.to_string(),
        }
    }

    /// "15 ene 2025"
    pub fn format_date(&self, input: impl Into<DateInput>, locale: Locale) -> String {
        self.format_with_style(input, DateStyle::Medium, locale)
    }

    /// "15 ene"
    pub fn format_date_short(&self, input: impl Into<DateInput>, locale: Locale) -> String {
        self.format_with_style(input, DateStyle::Short, locale)
    }

    /// "15 de enero de 2025"
    pub fn format_date_long(&self, input: impl Into<DateInput>, locale: Locale) -> String {
        self.format_with_style(input, DateStyle::Long, locale)
    }

    /// `YYYY-MM-DD` of the parsed date in this calendar's timezone
    pub fn iso_date(&self, input: impl Into<DateInput>) -> Option<String> {
        self.parse(input).map(|dt| to_iso_date_string(&dt))
    }

    // ==========================================
    // Elapsed time
    // ==========================================

    fn elapsed_days_ceil(start: &DateTime<Tz>, end: &DateTime<Tz>) -> i64 {
        let ms = end
            .clone()
            .signed_duration_since(start.clone())
            .num_milliseconds() as f64;
        (ms / MS_PER_DAY).ceil() as i64
    }

    /// `ceil((end - start) / 1 day)`; 0 when either bound is unparseable
    pub fn days_between(
        &self,
        start: impl Into<DateInput>,
        end: impl Into<DateInput>,
    ) -> i64 {
        match (self.parse(start), self.parse(end)) {
            (Some(start), Some(end)) => Self::elapsed_days_ceil(&start, &end),
            _ => 0,
        }
    }

    /// Days from `start` until now
    pub fn days_since(&self, start: impl Into<DateInput>) -> i64 {
        match self.parse(start) {
            Some(start) => Self::elapsed_days_ceil(&start, &self.now()),
            None => 0,
        }
    }

    /// Production week of a batch started at `start_date`, within [1, 6]
    pub fn current_week(&self, start_date: impl Into<DateInput>) -> u32 {
        let Some(start) = self.parse(start_date) else {
            return FIRST_WEEK;
        };
        let weeks = days_to_weeks(Self::elapsed_days_ceil(&start, &self.now()));
        weeks.clamp(FIRST_WEEK as i64, LAST_WEEK as i64) as u32
    }

    /// Same local calendar day as today
    pub fn is_today(&self, input: impl Into<DateInput>) -> bool {
        match self.parse(input) {
            Some(dt) => dt.date_naive() == self.today(),
            None => false,
        }
    }

    /// "Hoy", "Ayer", "Hace 3 días", "Hace 2 semanas", ...
    ///
    /// Months are 30 days and years 365 days.
    pub fn relative_time(&self, input: impl Into<DateInput>, locale: Locale) -> String {
        let Some(date) = self.parse(input) else {
            return NOT_AVAILABLE.to_string();
        };
        let ms = self
            .now()
            .signed_duration_since(date)
            .num_milliseconds() as f64;
        let diff_days = (ms / MS_PER_DAY).floor() as i64;

        let (key, count) = match diff_days {
            0 => return t(locale, "relative.today"),
            1 => return t(locale, "relative.yesterday"),
            d if d < 7 => ("relative.days", d),
            d if d < 30 => ("relative.weeks", d.div_euclid(7)),
            d if d < 365 => ("relative.months", d.div_euclid(30)),
            d => ("relative.years", d.div_euclid(365)),
        };
        t_with_args(locale, key, &[("count", &count.to_string())])
    }
}

// ==========================================
// Host-timezone shortcuts
// ==========================================

/// Parse in the host timezone
pub fn parse_date(input: impl Into<DateInput>) -> Option<DateTime<Local>> {
    Calendar::local().parse(input)
}

/// "15 ene 2025" (Spanish)
pub fn format_date(input: impl Into<DateInput>) -> String {
    Calendar::local().format_date(input, Locale::Es)
}

/// "15 ene" (Spanish)
pub fn format_date_short(input: impl Into<DateInput>) -> String {
    Calendar::local().format_date_short(input, Locale::Es)
}

/// "15 de enero de 2025" (Spanish)
pub fn format_date_long(input: impl Into<DateInput>) -> String {
    Calendar::local().format_date_long(input, Locale::Es)
}

/// Days between two dates in the host timezone
pub fn days_between(start: impl Into<DateInput>, end: impl Into<DateInput>) -> i64 {
    Calendar::local().days_between(start, end)
}

/// Days from `start` until now
pub fn days_since(start: impl Into<DateInput>) -> i64 {
    Calendar::local().days_since(start)
}

/// Production week in [1, 6]
pub fn get_current_week(start_date: impl Into<DateInput>) -> u32 {
    Calendar::local().current_week(start_date)
}

/// Same calendar day as today (host timezone)
pub fn is_today(input: impl Into<DateInput>) -> bool {
    Calendar::local().is_today(input)
}

/// Spanish relative label
pub fn get_relative_time(input: impl Into<DateInput>) -> String {
    Calendar::local().relative_time(input, Locale::Es)
}
