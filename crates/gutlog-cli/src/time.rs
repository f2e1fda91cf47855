//! Parsing of dates and times given on the command line

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse `YYYY-MM-DD`, `today` or `yesterday`
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    let today = Local::now().date_naive();
    match input.to_lowercase().as_str() {
        "today" => return Ok(today),
        "yesterday" => {
            if let Some(date) = today.pred_opt() {
                return Ok(date);
            }
        }
        _ => {}
    }

    match NaiveDate::parse_from_str(input, DATE_FORMAT) {
        Ok(date) => Ok(date),
        Err(_) => bail!("Invalid date '{}'. Use YYYY-MM-DD.", input),
    }
}

/// Parse a local timestamp: `YYYY-MM-DD HH:MM`, or `HH:MM` for today
pub fn parse_when(input: &str) -> Result<(NaiveDate, NaiveTime)> {
    parse_when_on(input, Local::now().date_naive())
}

fn parse_when_on(input: &str, today: NaiveDate) -> Result<(NaiveDate, NaiveTime)> {
    let input = input.trim();

    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(input, format) {
            return Ok((ts.date(), ts.time()));
        }
    }
    if let Ok(time) = NaiveTime::parse_from_str(input, "%H:%M") {
        return Ok((today, time));
    }

    bail!(
        "Invalid time '{}'. Use 'YYYY-MM-DD HH:MM' or 'HH:MM' for today.",
        input
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2026-03-01").unwrap(), date(2026, 3, 1));
        assert_eq!(parse_date("Today").unwrap(), Local::now().date_naive());
        assert!(parse_date("03/01/2026").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }

    #[test]
    fn test_parse_when_full_and_time_only() {
        let today = date(2026, 7, 9);
        assert_eq!(
            parse_when_on("2026-07-01 18:45", today).unwrap(),
            (date(2026, 7, 1), NaiveTime::from_hms_opt(18, 45, 0).unwrap())
        );
        assert_eq!(
            parse_when_on(" 07:05 ", today).unwrap(),
            (today, NaiveTime::from_hms_opt(7, 5, 0).unwrap())
        );
        assert!(parse_when_on("25:00", today).is_err());
        assert!(parse_when_on("noon", today).is_err());
    }
}
