// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar date helpers shared by the domain and wire types.

use time::Date;
use time::macros::format_description;

use crate::error::DomainError;

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// Parses an ISO-8601 calendar date.
///
/// Timestamps are accepted and truncated to their date part, so
/// `2026-03-01T00:00:00Z` parses as `2026-03-01`.
///
/// # Errors
///
/// Returns `DomainError::InvalidDate` if the leading `YYYY-MM-DD` part
/// does not parse.
pub fn parse_iso_date(field: &str, value: &str) -> Result<Date, DomainError> {
    let trimmed: &str = value.trim();
    let date_part: &str = trimmed.get(..10).unwrap_or(trimmed);
    Date::parse(date_part, format_description!("[year]-[month]-[day]")).map_err(|_| {
        DomainError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        }
    })
}

/// Returns the median of a set of dates.
///
/// With an even count the midpoint of the two middle dates is used,
/// rounding towards the earlier day.
#[must_use]
pub fn median_date(dates: &[Date]) -> Option<Date> {
    if dates.is_empty() {
        return None;
    }
    let mut sorted: Vec<Date> = dates.to_vec();
    sorted.sort_unstable();
    let mid: usize = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        return Some(sorted[mid]);
    }
    let low: i32 = sorted[mid - 1].to_julian_day();
    let high: i32 = sorted[mid].to_julian_day();
    Date::from_julian_day(low + (high - low) / 2).ok()
}
