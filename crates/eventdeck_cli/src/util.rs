use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::error::Error;
use uuid::Uuid;

/// Parses an event date.
///
/// Accepted shapes: RFC 3339 (`2025-09-26T15:00:00Z`), local
/// `YYYY-MM-DD HH:MM`, local `YYYY-MM-DD` (midnight), or a relative day
/// offset such as `+2d` / `-1d` from now.
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, Box<dyn Error>> {
    parse_datetime_from(raw, Utc::now(), &Local)
}

pub fn parse_datetime_from<Tz: TimeZone>(
    raw: &str,
    now: DateTime<Utc>,
    zone: &Tz,
) -> Result<DateTime<Utc>, Box<dyn Error>> {
    let raw = raw.trim();

    if let Some(days) = raw.strip_suffix('d').filter(|rest| rest.starts_with(['+', '-'])) {
        let days: i64 = days.parse()?;
        let offset = chrono::Duration::try_days(days).ok_or("day offset out of range")?;
        return Ok(now
            .checked_add_signed(offset)
            .ok_or("day offset out of range")?);
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }

    let naive = if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        naive
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0).ok_or("invalid midnight")?
    } else {
        return Err(format!(
            "unrecognized date `{raw}`; use RFC 3339, `YYYY-MM-DD HH:MM`, `YYYY-MM-DD` or `+Nd`"
        )
        .into());
    };

    zone.from_local_datetime(&naive)
        .earliest()
        .map(|date| date.with_timezone(&Utc))
        .ok_or_else(|| format!("date `{raw}` does not exist in the local time zone").into())
}

pub fn parse_id(raw: &str) -> Result<Uuid, Box<dyn Error>> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid id `{raw}`").into())
}
