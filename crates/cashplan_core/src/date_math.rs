//! Fast date arithmetic helpers that bypass jiff's `Span` machinery.
//!
//! jiff `Span` operations (`Date - Date`, `Span::years()`) are correct but
//! relatively heavy for a hot simulation loop. The helpers here use Rata Die
//! day-numbering for O(1) day differences and direct calendar arithmetic for
//! month/year offsets, plus the anniversary-rolling helpers the recurrence
//! expander needs.

use jiff::civil::Date;

/// Fast leap year check.
#[inline]
pub fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Fast inline days-in-month calculation without creating a `jiff::civil::Date`.
#[inline]
pub fn days_in_month(year: i16, month: i8) -> i8 {
    const DAYS: [i8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[(month - 1) as usize]
    }
}

/// Convert a civil date to a Rata Die day number (days since 0001-01-01).
///
/// Uses the proleptic Gregorian calendar algorithm from Baum (2017).
#[inline]
fn rata_die(d: Date) -> i32 {
    let y = d.year() as i32;
    let m = d.month() as i32;
    let day = d.day() as i32;

    // Shift March = month 1 so Feb (end of "year") is month 12
    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// Convert a Rata Die day number back to a `jiff::civil::Date`.
#[inline]
fn rd_to_date(rd: i32) -> Date {
    // Shift so day 0 = March 1, year 0
    let z = rd + 306;
    let h = 100 * z - 25;
    let a = h / 3_652_425;
    let b = a - a / 4;
    let y = (100 * b + h) / 36_525;
    let c = b + z - 365 * y - y / 4;
    let m = (5 * c + 456) / 153;
    let day = c - (153 * m - 457) / 5;

    let (year, month) = if m > 12 { (y + 1, m - 12) } else { (y, m) };

    jiff::civil::date(year as i16, month as i8, day as i8)
}

/// Compute the number of days between two dates (d2 - d1).
///
/// Positive when `d2 > d1`.
#[inline]
pub fn fast_days_between(d1: Date, d2: Date) -> i32 {
    rata_die(d2) - rata_die(d1)
}

/// Add `n` days to a date without going through `jiff::Span`.
#[inline]
pub fn add_days(d: Date, n: i32) -> Date {
    rd_to_date(rata_die(d) + n)
}

/// Add `n` calendar months, clamping the day to the target month's length
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months_clamped(d: Date, n: i32) -> Date {
    let total = (d.year() as i32) * 12 + (d.month() as i32 - 1) + n;
    let year = total.div_euclid(12) as i16;
    let month = (total.rem_euclid(12) + 1) as i8;
    let day = d.day().min(days_in_month(year, month));
    jiff::civil::date(year, month, day)
}

/// Difference between two dates in fractional years (mean Gregorian year).
#[inline]
pub fn fractional_years(from: Date, to: Date) -> f64 {
    fast_days_between(from, to) as f64 / 365.2425
}

/// The next occurrence of a `day`/`month` anniversary on or after `from`.
///
/// The day is clamped to the month's length for the chosen year, so a
/// Feb 29 anniversary lands on Feb 28 in common years.
pub fn next_anniversary_on_or_after(from: Date, month: i8, day: i8) -> Date {
    let clamp = |year: i16| {
        let d = day.min(days_in_month(year, month));
        jiff::civil::date(year, month, d)
    };
    let this_year = clamp(from.year());
    if this_year >= from {
        this_year
    } else {
        clamp(from.year() + 1)
    }
}
