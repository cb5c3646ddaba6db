//! Natural language date resolution
//!
//! Turns temporal expressions such as "tomorrow", "3 days ago", "next
//! Friday", "this weekend" or "07/06/2024" into a concrete [`ResolvedDate`].
//!
//! Resolution is a pure function of the expression and a supplied reference
//! time. Nothing here reads the wall clock, so the same input always yields
//! the same output.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use domain::value_objects::ResolvedDate;
use tracing::debug;

use crate::error::DateError;

/// How many days ahead the provider can forecast
pub const FORECAST_HORIZON_DAYS: u32 = 7;

/// Which way a bare weekday name points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemporalLean {
    /// "friday" means the coming Friday
    #[default]
    Future,
    /// "friday" means the most recent Friday
    Past,
}

/// Resolve a temporal expression, reading bare weekdays as future days
///
/// # Errors
///
/// See [`resolve_leaning`].
pub fn resolve(expression: Option<&str>, now: NaiveDateTime) -> Result<ResolvedDate, DateError> {
    resolve_leaning(expression, now, TemporalLean::Future)
}

/// Resolve a temporal expression against `now`
///
/// An absent or blank expression means today.
///
/// # Errors
///
/// - `DateError::Unparseable` if the expression is not recognized
/// - `DateError::Ambiguous` for numeric dates readable both day-first and
///   month-first
/// - `DateError::OutOfRange` for ranges ending after the forecast horizon
pub fn resolve_leaning(
    expression: Option<&str>,
    now: NaiveDateTime,
    lean: TemporalLean,
) -> Result<ResolvedDate, DateError> {
    let today = now.date();
    let Some(raw) = expression else {
        return Ok(ResolvedDate::single(today));
    };

    let input = normalize(raw);
    if input.is_empty() {
        return Ok(ResolvedDate::single(today));
    }
    let unparseable = || DateError::Unparseable(raw.trim().to_string());

    if let Some(range) = parse_range(&input, today) {
        let range = range.ok_or_else(unparseable)?;
        return check_horizon(range, raw, today);
    }

    if let Some(offset) = parse_relative(&input) {
        let date = shift(today, offset.ok_or_else(unparseable)?).ok_or_else(unparseable)?;
        debug!(input = %input, date = %date, "Resolved relative date");
        return Ok(ResolvedDate::single(date));
    }

    if let Some(date) = parse_weekday(&input, today, lean) {
        debug!(input = %input, date = %date, "Resolved weekday");
        return Ok(ResolvedDate::single(date));
    }

    if let Some(date) = parse_absolute(&input, today)? {
        debug!(input = %input, date = %date, "Resolved absolute date");
        return Ok(ResolvedDate::single(date));
    }

    debug!(input = %input, "Failed to resolve date");
    Err(unparseable())
}

/// Lowercase, collapse whitespace, drop trailing punctuation and leading
/// filler words
fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let trimmed = lowered.trim_end_matches(['?', '!', '.', ',', ' ', '\t']);
    let mut words: Vec<&str> = trimmed.split_whitespace().collect();
    while matches!(words.first(), Some(&("on" | "for" | "the"))) {
        words.remove(0);
    }
    words.join(" ")
}

fn shift(today: NaiveDate, offset: i64) -> Option<NaiveDate> {
    let days = Days::new(offset.unsigned_abs());
    if offset >= 0 {
        today.checked_add_days(days)
    } else {
        today.checked_sub_days(days)
    }
}

fn check_horizon(
    range: ResolvedDate,
    raw: &str,
    today: NaiveDate,
) -> Result<ResolvedDate, DateError> {
    let limit = today + Days::new(u64::from(FORECAST_HORIZON_DAYS));
    if range.last() > limit {
        return Err(DateError::OutOfRange {
            input: raw.trim().to_string(),
            horizon_days: FORECAST_HORIZON_DAYS,
        });
    }
    debug!(input = raw, range = %range, "Resolved date range");
    Ok(range)
}

/// Parse a count written as digits or an English word
fn parse_count(word: &str) -> Option<u32> {
    if let Ok(n) = word.parse::<u32>() {
        return Some(n);
    }
    let n = match word {
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
    };
    Some(n)
}

fn unit_days(word: &str) -> Option<i64> {
    match word {
        "day" | "days" => Some(1),
        "week" | "weeks" => Some(7),
        _ => None,
    }
}

/// Offsets like "tomorrow", "3 days ago" or "in two weeks"
///
/// The outer `Option` says whether the phrase was recognized, the inner one
/// whether its count was usable.
fn parse_relative(input: &str) -> Option<Option<i64>> {
    let fixed = match input {
        "today" | "now" | "right now" | "currently" | "tonight" | "this morning"
        | "this afternoon" | "this evening" => Some(0),
        "tomorrow" => Some(1),
        "day after tomorrow" => Some(2),
        "yesterday" => Some(-1),
        "day before yesterday" => Some(-2),
        "next week" => Some(7),
        "last week" => Some(-7),
        _ => None,
    };
    if fixed.is_some() {
        return Some(fixed);
    }

    let words: Vec<&str> = input.split_whitespace().collect();
    let (count, unit, sign) = match words.as_slice() {
        [n, unit, "ago"] => (*n, *unit, -1),
        ["in" | "after", n, unit] | [n, unit, "from", "now"] | [n, unit, "later"] => {
            (*n, *unit, 1)
        },
        _ => return None,
    };

    let unit = unit_days(unit)?;
    let count = parse_count(count)?;
    Some(i64::from(count).checked_mul(unit).map(|days| days * sign))
}

/// Ranges like "this week", "this weekend" or "next 3 days"
///
/// The outer `Option` says whether the phrase was recognized, the inner one
/// whether it produced a usable range.
fn parse_range(input: &str, today: NaiveDate) -> Option<Option<ResolvedDate>> {
    match input {
        "this week" => {
            let to_sunday = u64::from(6 - today.weekday().num_days_from_monday());
            return Some(ResolvedDate::range(today, today + Days::new(to_sunday)).ok());
        },
        "this weekend" | "weekend" | "the weekend" => {
            let (start, end) = match today.weekday() {
                Weekday::Sat => (today, today + Days::new(1)),
                Weekday::Sun => (today, today),
                other => {
                    let to_saturday = u64::from(5 - other.num_days_from_monday());
                    let saturday = today + Days::new(to_saturday);
                    (saturday, saturday + Days::new(1))
                },
            };
            return Some(ResolvedDate::range(start, end).ok());
        },
        _ => {},
    }

    let words: Vec<&str> = input.split_whitespace().collect();
    let count = match words.as_slice() {
        ["next" | "coming", "few", "days"] => 3,
        ["next" | "coming", "couple", "days"] | ["next" | "coming", "couple", "of", "days"] => 2,
        ["next" | "coming", n, "days" | "day"] => match parse_count(n) {
            Some(n) => n,
            None => return None,
        },
        _ => return None,
    };
    if count == 0 {
        return Some(None);
    }

    let start = today.checked_add_days(Days::new(1));
    let end = today.checked_add_days(Days::new(u64::from(count)));
    Some(start.zip(end).and_then(|(s, e)| ResolvedDate::range(s, e).ok()))
}

fn weekday_from_name(word: &str) -> Option<Weekday> {
    match word {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Weekday names, optionally qualified by "next", "last", "this"
fn parse_weekday(input: &str, today: NaiveDate, lean: TemporalLean) -> Option<NaiveDate> {
    let words: Vec<&str> = input.split_whitespace().collect();
    let (lean, name) = match words.as_slice() {
        [name] => (lean, *name),
        ["next" | "coming", name] => (TemporalLean::Future, *name),
        ["last" | "past" | "previous", name] => (TemporalLean::Past, *name),
        ["this", name] => (lean, *name),
        _ => return None,
    };
    let target = weekday_from_name(name)?;
    Some(weekday_occurrence(today, target, lean))
}

/// Nearest occurrence of `target` strictly after or before `from`
fn weekday_occurrence(from: NaiveDate, target: Weekday, lean: TemporalLean) -> NaiveDate {
    let current = from.weekday().num_days_from_monday();
    let target = target.num_days_from_monday();
    match lean {
        TemporalLean::Future => {
            let days = match (target + 7 - current) % 7 {
                0 => 7,
                n => n,
            };
            from + Days::new(u64::from(days))
        },
        TemporalLean::Past => {
            let days = match (current + 7 - target) % 7 {
                0 => 7,
                n => n,
            };
            from - Days::new(u64::from(days))
        },
    }
}

fn month_from_name(word: &str) -> Option<u32> {
    let month = match word {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Day of month with an optional ordinal suffix ("7", "7th", "21st")
fn parse_day_of_month(word: &str) -> Option<u32> {
    let digits = word.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let suffix = &word[digits.len()..];
    if !matches!(suffix, "" | "st" | "nd" | "rd" | "th") {
        return None;
    }
    digits.parse().ok()
}

fn parse_year(word: &str) -> Option<i32> {
    if word.len() == 4 {
        word.parse().ok()
    } else {
        None
    }
}

/// ISO, numeric and month-name dates
///
/// Returns `Ok(None)` when the input does not look like a date at all.
fn parse_absolute(input: &str, today: NaiveDate) -> Result<Option<NaiveDate>, DateError> {
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Ok(Some(date));
        }
    }

    if let Some(result) = parse_numeric(input) {
        return result.map(Some);
    }

    Ok(parse_month_name(input, today.year()))
}

/// `a/b/yyyy`, `a.b.yyyy` or `a-b-yyyy`, tried day-first then month-first
fn parse_numeric(input: &str) -> Option<Result<NaiveDate, DateError>> {
    let separator = ['/', '.', '-'].into_iter().find(|sep| input.contains(*sep))?;
    let parts: Vec<&str> = input.split(separator).collect();
    let [a, b, year] = parts.as_slice() else {
        return None;
    };
    let a: u32 = a.parse().ok()?;
    let b: u32 = b.parse().ok()?;
    let year = parse_year(year)?;

    let day_first = NaiveDate::from_ymd_opt(year, b, a);
    let month_first = NaiveDate::from_ymd_opt(year, a, b);
    let result = match (day_first, month_first) {
        (Some(day_first), Some(month_first)) if day_first != month_first => {
            Err(DateError::Ambiguous {
                input: input.to_string(),
                day_first,
                month_first,
            })
        },
        (Some(date), _) | (None, Some(date)) => Ok(date),
        (None, None) => Err(DateError::Unparseable(input.to_string())),
    };
    Some(result)
}

/// `June 7`, `7 June`, `June 7, 2024`, `7th of June 2024`
fn parse_month_name(input: &str, default_year: i32) -> Option<NaiveDate> {
    let cleaned = input.replace(',', " ");
    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|word| *word != "of")
        .collect();

    let (month, day, year) = match words.as_slice() {
        [first, second] => match month_from_name(first) {
            Some(month) => (month, parse_day_of_month(second)?, default_year),
            None => (month_from_name(second)?, parse_day_of_month(first)?, default_year),
        },
        [first, second, year] => {
            let year = parse_year(year)?;
            match month_from_name(first) {
                Some(month) => (month, parse_day_of_month(second)?, year),
                None => (month_from_name(second)?, parse_day_of_month(first)?, year),
            }
        },
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Monday 2024-06-10, mid-afternoon
    fn now() -> NaiveDateTime {
        date(2024, 6, 10).and_time(NaiveTime::from_hms_opt(15, 30, 0).unwrap())
    }

    fn single(expr: &str) -> NaiveDate {
        match resolve(Some(expr), now()).unwrap() {
            ResolvedDate::Single { date } => date,
            other => panic!("expected single date for {expr}, got {other}"),
        }
    }

    fn past(expr: &str) -> NaiveDate {
        resolve_leaning(Some(expr), now(), TemporalLean::Past)
            .unwrap()
            .first()
    }

    #[test]
    fn absent_or_blank_means_today() {
        assert_eq!(resolve(None, now()).unwrap(), ResolvedDate::single(date(2024, 6, 10)));
        assert_eq!(single("   "), date(2024, 6, 10));
    }

    #[test]
    fn today_synonyms() {
        for expr in ["today", "Today?", "now", "right now", "currently", "tonight", "this evening"] {
            assert_eq!(single(expr), date(2024, 6, 10), "{expr}");
        }
    }

    #[test]
    fn fixed_offsets() {
        assert_eq!(single("tomorrow"), date(2024, 6, 11));
        assert_eq!(single("the day after tomorrow"), date(2024, 6, 12));
        assert_eq!(single("yesterday"), date(2024, 6, 9));
        assert_eq!(single("day before yesterday"), date(2024, 6, 8));
        assert_eq!(single("next week"), date(2024, 6, 17));
        assert_eq!(single("last week"), date(2024, 6, 3));
    }

    #[test]
    fn counted_offsets() {
        assert_eq!(single("3 days ago"), date(2024, 6, 7));
        assert_eq!(single("three days ago"), date(2024, 6, 7));
        assert_eq!(single("a day ago"), date(2024, 6, 9));
        assert_eq!(single("2 weeks ago"), date(2024, 5, 27));
        assert_eq!(single("in 3 days"), date(2024, 6, 13));
        assert_eq!(single("after 3 days"), date(2024, 6, 13));
        assert_eq!(single("5 days from now"), date(2024, 6, 15));
        assert_eq!(single("in a week"), date(2024, 6, 17));
        assert_eq!(single("in two weeks"), date(2024, 6, 24));
    }

    #[test]
    fn leading_filler_and_punctuation_ignored() {
        assert_eq!(single("on tomorrow."), date(2024, 6, 11));
        assert_eq!(single("  For  3   days ago!"), date(2024, 6, 7));
    }

    #[test]
    fn weekday_future_lean_skips_today() {
        // 2024-06-10 is a Monday
        assert_eq!(single("monday"), date(2024, 6, 17));
        assert_eq!(single("friday"), date(2024, 6, 14));
        assert_eq!(single("on Friday"), date(2024, 6, 14));
        assert_eq!(single("next friday"), date(2024, 6, 14));
        assert_eq!(single("sunday"), date(2024, 6, 16));
    }

    #[test]
    fn weekday_past_lean_skips_today() {
        assert_eq!(past("monday"), date(2024, 6, 3));
        assert_eq!(past("friday"), date(2024, 6, 7));
        assert_eq!(past("sunday"), date(2024, 6, 9));
    }

    #[test]
    fn weekday_qualifiers_override_lean() {
        assert_eq!(single("last friday"), date(2024, 6, 7));
        assert_eq!(past("next friday"), date(2024, 6, 14));
        assert_eq!(single("past wednesday"), date(2024, 6, 5));
    }

    #[test]
    fn this_week_runs_to_sunday() {
        let resolved = resolve(Some("this week"), now()).unwrap();
        assert_eq!(resolved, ResolvedDate::range(date(2024, 6, 10), date(2024, 6, 16)).unwrap());
    }

    #[test]
    fn this_weekend_from_weekday() {
        let resolved = resolve(Some("this weekend"), now()).unwrap();
        assert_eq!(resolved, ResolvedDate::range(date(2024, 6, 15), date(2024, 6, 16)).unwrap());
    }

    #[test]
    fn this_weekend_on_saturday_and_sunday() {
        let saturday = date(2024, 6, 15).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(
            resolve(Some("this weekend"), saturday).unwrap(),
            ResolvedDate::range(date(2024, 6, 15), date(2024, 6, 16)).unwrap()
        );

        let sunday = date(2024, 6, 16).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(
            resolve(Some("this weekend"), sunday).unwrap(),
            ResolvedDate::single(date(2024, 6, 16))
        );
    }

    #[test]
    fn next_n_days() {
        assert_eq!(
            resolve(Some("next 3 days"), now()).unwrap(),
            ResolvedDate::range(date(2024, 6, 11), date(2024, 6, 13)).unwrap()
        );
        assert_eq!(
            resolve(Some("the next few days"), now()).unwrap(),
            ResolvedDate::range(date(2024, 6, 11), date(2024, 6, 13)).unwrap()
        );
        assert_eq!(
            resolve(Some("next seven days"), now()).unwrap(),
            ResolvedDate::range(date(2024, 6, 11), date(2024, 6, 17)).unwrap()
        );
    }

    #[test]
    fn next_one_day_collapses_to_tomorrow() {
        assert_eq!(
            resolve(Some("next 1 day"), now()).unwrap(),
            ResolvedDate::single(date(2024, 6, 11))
        );
    }

    #[test]
    fn next_zero_days_is_unparseable() {
        assert!(matches!(
            resolve(Some("next 0 days"), now()),
            Err(DateError::Unparseable(_))
        ));
    }

    #[test]
    fn range_beyond_horizon_is_out_of_range() {
        let err = resolve(Some("next 10 days"), now()).unwrap_err();
        assert_eq!(
            err,
            DateError::OutOfRange {
                input: "next 10 days".to_string(),
                horizon_days: FORECAST_HORIZON_DAYS,
            }
        );
    }

    #[test]
    fn iso_dates() {
        assert_eq!(single("2024-06-07"), date(2024, 6, 7));
        assert_eq!(single("on 2023-12-25."), date(2023, 12, 25));
        assert_eq!(single("2024/06/07"), date(2024, 6, 7));
    }

    #[test]
    fn numeric_date_with_one_valid_reading() {
        // 25 cannot be a month
        assert_eq!(single("25/12/2023"), date(2023, 12, 25));
        assert_eq!(single("12/25/2023"), date(2023, 12, 25));
        assert_eq!(single("25.12.2023"), date(2023, 12, 25));
    }

    #[test]
    fn numeric_date_with_equal_readings() {
        assert_eq!(single("06/06/2024"), date(2024, 6, 6));
    }

    #[test]
    fn numeric_date_with_two_readings_is_ambiguous() {
        let err = resolve(Some("03/04/2024"), now()).unwrap_err();
        assert_eq!(
            err,
            DateError::Ambiguous {
                input: "03/04/2024".to_string(),
                day_first: date(2024, 4, 3),
                month_first: date(2024, 3, 4),
            }
        );
    }

    #[test]
    fn numeric_date_with_no_valid_reading() {
        assert!(matches!(
            resolve(Some("31/31/2024"), now()),
            Err(DateError::Unparseable(_))
        ));
    }

    #[test]
    fn month_name_forms() {
        assert_eq!(single("June 7"), date(2024, 6, 7));
        assert_eq!(single("7 june"), date(2024, 6, 7));
        assert_eq!(single("June 7, 2023"), date(2023, 6, 7));
        assert_eq!(single("7th of June"), date(2024, 6, 7));
        assert_eq!(single("the 21st of dec 2023"), date(2023, 12, 21));
    }

    #[test]
    fn invalid_month_day_is_unparseable() {
        assert!(matches!(
            resolve(Some("June 31"), now()),
            Err(DateError::Unparseable(_))
        ));
    }

    #[test]
    fn garbage_is_unparseable() {
        let err = resolve(Some("when pigs fly"), now()).unwrap_err();
        assert_eq!(err, DateError::Unparseable("when pigs fly".to_string()));
    }

    #[test]
    fn huge_offsets_do_not_panic() {
        assert!(resolve(Some("4000000000 weeks ago"), now()).is_err());
    }

    #[test]
    fn time_of_day_is_ignored() {
        let late = date(2024, 6, 10).and_hms_opt(23, 59, 59).unwrap();
        let early = date(2024, 6, 10).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(
            resolve(Some("tomorrow"), late).unwrap(),
            resolve(Some("tomorrow"), early).unwrap()
        );
    }

    #[test]
    fn weekday_occurrence_is_within_a_week() {
        for offset in 0..7 {
            let from = date(2024, 6, 10) + Days::new(offset);
            for target in [Weekday::Mon, Weekday::Wed, Weekday::Sun] {
                let ahead = weekday_occurrence(from, target, TemporalLean::Future);
                let behind = weekday_occurrence(from, target, TemporalLean::Past);
                assert_eq!(ahead.weekday(), target);
                assert_eq!(behind.weekday(), target);
                assert!((1..=7).contains(&(ahead - from).num_days()));
                assert!((1..=7).contains(&(from - behind).num_days()));
            }
        }
    }
}
