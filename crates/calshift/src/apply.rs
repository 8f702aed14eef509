//! Applying a shift specification to a timestamp.
//!
//! Evaluation runs in three phases. Phase 1 substitutes the nine
//! plain calendar fields (year through nanosecond) under one uniform
//! per-field rule and rebuilds the timestamp with calendar
//! normalization, so out-of-range values carry across month and year
//! boundaries the way adding a duration would. Phase 2 resolves the
//! day-from-end anchor (`D$1` = last day of the month). Phase 3
//! resolves the week anchors and the weekday snap (`W^1 w0` = first
//! Sunday of the month).
//!
//! All arithmetic happens on the wall clock of the input's own
//! offset/location, and the result carries that offset/location back
//! out.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike,
};

use crate::spec::{PartDef, ShiftSpec};

impl ShiftSpec {
    /// Apply the shift to `t`, producing the shifted timestamp.
    ///
    /// Total and deterministic: identity specs return `t` as-is, and
    /// an intermediate that leaves the representable calendar range
    /// (or a wall-clock value unresolvable in `t`'s timezone even
    /// after gap correction) falls back to returning `t` unchanged.
    /// The result always carries `t`'s own offset/location.
    ///
    /// # Examples
    ///
    /// ```
    /// use calshift::ShiftSpec;
    /// use chrono::DateTime;
    ///
    /// // the last day of the month, at the same time of day
    /// let spec = ShiftSpec::parse("D$1").unwrap();
    /// let t = DateTime::parse_from_rfc3339("2000-02-13T14:55:22Z").unwrap();
    /// assert_eq!(spec.apply(t).to_rfc3339(), "2000-02-29T14:55:22+00:00");
    /// ```
    pub fn apply<Tz: TimeZone>(&self, t: DateTime<Tz>) -> DateTime<Tz> {
        if self.is_identity() {
            return t;
        }
        match self.shift(&t) {
            Some(shifted) => shifted,
            None => t,
        }
    }

    fn shift<Tz: TimeZone>(&self, t: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = t.timezone();
        let local = t.naive_local();

        // Day of month before any adjustment; the day-from-end anchor
        // counts back from it.
        let day0 = i64::from(local.day());

        let year = adjust(&self.year, i64::from(local.year()));
        let month = adjust(&self.month, i64::from(local.month()));
        let day = adjust(&self.day, day0);

        let hour = adjust(&self.hour, i64::from(local.hour()));
        let minute = adjust(&self.minute, i64::from(local.minute()));
        let second = adjust(&self.second, i64::from(local.second()));

        let nanos = i64::from(local.nanosecond());
        let milli = adjust(&self.milli, nanos / 1_000_000);
        let micro = adjust(&self.micro, (nanos / 1_000) % 1_000);
        let nano = adjust(&self.nano, nanos % 1_000);

        let clock = hour * 3_600 + minute * 60 + second;
        let subsec = milli * 1_000_000 + micro * 1_000 + nano;
        let naive = rebuild(year, month, day, clock, subsec)?;
        let mut result = resolve_local(&tz, naive)?;

        if self.day.active && self.day.from_end {
            result = add_date(&result, 1, 1 - day0 - i64::from(self.day.value))?;
        }

        if self.week.active {
            let part = &self.week;
            let wd = if self.weekday.active {
                i64::from(self.weekday.value)
            } else {
                weekday_of(&result)
            };

            if part.from_begin {
                // nth occurrence of wd counting from the month start
                result = add_date(&result, 0, 1 - i64::from(result.day()))?;
                let mut shift = wd - weekday_of(&result);
                if shift < 0 {
                    shift += 7;
                }
                shift += (i64::from(part.value) - 1) * 7;
                return add_date(&result, 0, shift);
            }

            if part.from_end {
                // nth occurrence of wd counting back from the month end
                result = add_date(&result, 1, -i64::from(result.day()))?;
                let mut shift = wd - weekday_of(&result);
                if shift > 0 {
                    shift -= 7;
                }
                shift -= (i64::from(part.value) - 1) * 7;
                return add_date(&result, 0, shift);
            }

            if part.absolute {
                // nth occurrence of wd counting from January 1; values
                // past the year's last occurrence spill into the next
                // year
                result = add_date(&result, 0, 1 - i64::from(result.ordinal()))?;
                let mut shift = wd - weekday_of(&result);
                if shift < 0 {
                    shift += 7;
                }
                shift += (i64::from(part.value) - 1) * 7;
                return add_date(&result, 0, shift);
            }

            // relative week: plain day shift, then fall through to the
            // weekday snap
            result = add_date(&result, 0, i64::from(part.value) * 7)?;
        }

        if self.weekday.active {
            // signed snap: may move backward within the 7-day span
            let shift = i64::from(self.weekday.value) - weekday_of(&result);
            return add_date(&result, 0, shift);
        }

        Some(result)
    }
}

// ── Field substitution ──────────────────────────────────────────────────────

/// The uniform per-field substitution rule: inactive parts leave the
/// field alone, `from_end` parts defer to the anchor phase, absolute
/// parts set, relative parts add. Out-of-range results are intentional
/// and resolve during calendar-normalizing reconstruction.
fn adjust(part: &PartDef, field: i64) -> i64 {
    if !part.active || part.from_end {
        return field;
    }
    if part.absolute {
        return i64::from(part.value);
    }
    field + i64::from(part.value)
}

// ── Calendar-normalizing construction ───────────────────────────────────────

/// Build a date from possibly out-of-range year/month/day fields.
/// Months normalize into years by euclidean division; the day is an
/// offset from the 1st of the normalized month, so 0 is the last day
/// of the previous month and 33 rolls into the next.
fn rebuild_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    let year = year.checked_add((month - 1).div_euclid(12))?;
    let month = (month - 1).rem_euclid(12) + 1;
    let first = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month as u32, 1)?;
    first.checked_add_signed(Duration::try_days(day - 1)?)
}

/// Build a full wall-clock value from possibly out-of-range fields;
/// the clock and sub-second parts fold in as signed offsets.
fn rebuild(
    year: i64,
    month: i64,
    day: i64,
    clock_seconds: i64,
    subsec_nanos: i64,
) -> Option<NaiveDateTime> {
    let date = rebuild_date(year, month, day)?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    midnight
        .checked_add_signed(Duration::try_seconds(clock_seconds)?)?
        .checked_add_signed(Duration::nanoseconds(subsec_nanos))
}

/// Shift by whole months and days in one normalized step, keeping the
/// wall-clock time and resolving in `t`'s own timezone.
fn add_date<Tz: TimeZone>(t: &DateTime<Tz>, months: i64, days: i64) -> Option<DateTime<Tz>> {
    let local = t.naive_local();
    let date = rebuild_date(
        i64::from(local.year()),
        i64::from(local.month()) + months,
        i64::from(local.day()) + days,
    )?;
    resolve_local(&t.timezone(), date.and_time(local.time()))
}

/// Resolve a wall-clock value in `tz`. Ambiguous times take the
/// earlier instant; times inside a spring-forward gap retry one hour
/// later.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earlier, _) => Some(earlier),
        LocalResult::None => {
            let bumped = naive.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&bumped).earliest()
        }
    }
}

/// Sunday-based weekday number (0 = Sunday … 6 = Saturday).
fn weekday_of<Tz: TimeZone>(t: &DateTime<Tz>) -> i64 {
    i64::from(t.weekday().num_days_from_sunday())
}

// ── Tests ───────────────────────────────────────────────────────────────────
