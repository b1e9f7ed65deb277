use std::io;
use std::process::Command;

use chrono::{Local, NaiveDate};

use crate::models::DATE_FORMAT;

/// Today's date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Parse a strict `YYYY-MM-DD` calendar date. Unpadded months and days are
/// rejected so the key matches what gets written.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Open `target` with the platform's default handler. The child is spawned
/// and left running.
pub fn open_url(target: &str) -> io::Result<()> {
    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/c", "start", ""]);
        cmd
    } else {
        Command::new("xdg-open")
    };

    cmd.arg(target).spawn().map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_must_be_full_calendar_dates() {
        assert!(parse_date("2026-01-24").is_some());
        assert!(parse_date("2024-02-29").is_some());
        assert!(parse_date("2026-02-30").is_none());
        assert!(parse_date("2026-1-2x").is_none());
        assert!(parse_date("2026-1-02").is_none());
        assert!(parse_date("24-01-2026").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn today_is_parseable() {
        assert!(parse_date(&today()).is_some());
    }
}
