//! Line header composition: `<timestamp> [<LABEL>] <prefix>`.

use crate::domain::Severity;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

/// Local time as `Mon dd HH:MM:SS.micros`, day space-padded
/// (e.g. `Jan  5 14:03:22.123456`).
pub const TIMESTAMP_FORMAT: &str = "%b %e %H:%M:%S%.6f";

/// Width of a rendered timestamp; every header starts with exactly this many
/// characters of time.
pub const TIMESTAMP_WIDTH: usize = 22;

pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn compose<Tz>(at: &DateTime<Tz>, severity: Severity, prefix: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let timestamp = format_timestamp(at);
    let mut header = String::with_capacity(timestamp.len() + 8 + prefix.len());
    header.push_str(&timestamp);
    header.push_str(" [");
    header.push_str(severity.label());
    header.push_str("] ");
    header.push_str(prefix);
    header
}

/// Header for a line opened now. The clock is read on every call.
pub fn line_header(severity: Severity, prefix: &str) -> String {
    compose(&Local::now(), severity, prefix)
}
