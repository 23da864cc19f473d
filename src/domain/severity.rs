use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity attached to every line written through a log stream.
///
/// Values follow syslog(3) numbering: a lower value means a more urgent
/// message. The numeric value doubles as the bit index inside a
/// [`SeverityMask`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    /// System is unusable
    #[serde(alias = "emergency")]
    Emerg = 0,
    /// Action must be taken immediately
    Alert = 1,
    /// Critical conditions
    #[serde(alias = "critical")]
    Crit = 2,
    /// Error conditions
    #[serde(alias = "error")]
    Err = 3,
    /// Warning conditions
    #[serde(alias = "warn")]
    Warning = 4,
    /// Normal, but significant, condition
    Notice = 5,
    /// Informational message
    Info = 6,
    /// Debug-level message
    Debug = 7,
}

const LABELS: [&str; 8] = ["EMRG", "ALRT", "CRIT", "EROR", "WARN", "NTCE", "INFO", "DEBG"];

impl Severity {
    pub const ALL: [Severity; 8] = [
        Severity::Emerg,
        Severity::Alert,
        Severity::Crit,
        Severity::Err,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    /// Fixed-width four character label used in line headers.
    pub fn label(self) -> &'static str {
        LABELS[self as usize]
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Emerg => "emerg",
            Severity::Alert => "alert",
            Severity::Crit => "crit",
            Severity::Err => "err",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseSeverityError {
    #[error("Unknown severity '{0}'")]
    Unknown(String),
    #[error("Severity value {0} out of range (0-7)")]
    OutOfRange(u8),
}

impl TryFrom<u8> for Severity {
    type Error = ParseSeverityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(ParseSeverityError::OutOfRange(value))
    }
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    /// Accepts the lowercase names, the header labels and a few common
    /// aliases, ignoring case.
    fn from_str(s: &str) -> Result<Self, ParseSeverityError> {
        let lowered = s.trim().to_ascii_lowercase();
        let severity = match lowered.as_str() {
            "emerg" | "emergency" | "emrg" => Severity::Emerg,
            "alert" | "alrt" => Severity::Alert,
            "crit" | "critical" => Severity::Crit,
            "err" | "error" | "eror" => Severity::Err,
            "warning" | "warn" => Severity::Warning,
            "notice" | "ntce" => Severity::Notice,
            "info" => Severity::Info,
            "debug" | "debg" => Severity::Debug,
            _ => return Err(ParseSeverityError::Unknown(s.to_string())),
        };
        Ok(severity)
    }
}

/// Bitmask of enabled severities; bit `i` enables the severity with value `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeverityMask(u8);

impl SeverityMask {
    /// Zero mask. Passing it to `set_mask` leaves the current mask unchanged.
    pub const EMPTY: SeverityMask = SeverityMask(0);
    pub const ALL: SeverityMask = SeverityMask(u8::MAX);
    pub const EMERG_ONLY: SeverityMask = SeverityMask(1);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Mask enabling every severity from `Emerg` through `level` inclusive,
    /// i.e. `(1 << (level + 1)) - 1`.
    pub fn up_to(level: Severity) -> Self {
        let bits = (1u16 << (u16::from(level.as_u8()) + 1)) - 1;
        Self(bits as u8)
    }

    pub fn only(level: Severity) -> Self {
        Self(1 << level.as_u8())
    }

    pub fn contains(self, level: Severity) -> bool {
        self.0 & (1 << level.as_u8()) != 0
    }

    pub fn with(self, level: Severity) -> Self {
        Self(self.0 | (1 << level.as_u8()))
    }

    pub fn without(self, level: Severity) -> Self {
        Self(self.0 & !(1 << level.as_u8()))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Enabled severities, most urgent first.
    pub fn iter(self) -> impl Iterator<Item = Severity> {
        Severity::ALL.into_iter().filter(move |level| self.contains(*level))
    }
}

impl Default for SeverityMask {
    fn default() -> Self {
        Self::EMERG_ONLY
    }
}

impl From<Severity> for SeverityMask {
    fn from(level: Severity) -> Self {
        Self::only(level)
    }
}

impl fmt::Display for SeverityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_four_characters() {
        let labels: Vec<_> = Severity::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            ["EMRG", "ALRT", "CRIT", "EROR", "WARN", "NTCE", "INFO", "DEBG"]
        );
        assert!(labels.iter().all(|l| l.len() == 4));
    }

    #[test]
    fn test_numeric_values_follow_syslog() {
        assert_eq!(Severity::Emerg.as_u8(), 0);
        assert_eq!(Severity::Err.as_u8(), 3);
        assert_eq!(Severity::Debug.as_u8(), 7);
        assert!(Severity::Emerg < Severity::Debug);
        assert_eq!(Severity::try_from(6u8), Ok(Severity::Info));
        assert_eq!(
            Severity::try_from(8u8),
            Err(ParseSeverityError::OutOfRange(8))
        );
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Err));
        assert_eq!("DEBG".parse::<Severity>(), Ok(Severity::Debug));
        assert_eq!(" notice ".parse::<Severity>(), Ok(Severity::Notice));
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn test_mask_up_to() {
        assert_eq!(SeverityMask::up_to(Severity::Emerg).bits(), 0b0000_0001);
        assert_eq!(SeverityMask::up_to(Severity::Err).bits(), 0b0000_1111);
        assert_eq!(
            SeverityMask::up_to(Severity::Info),
            SeverityMask::from_bits(0b0111_1111)
        );
        assert_eq!(SeverityMask::up_to(Severity::Debug), SeverityMask::ALL);
    }

    #[test]
    fn test_mask_membership() {
        let mask = SeverityMask::default();
        assert!(mask.contains(Severity::Emerg));
        assert!(!mask.contains(Severity::Alert));

        let mask = mask.with(Severity::Info).without(Severity::Emerg);
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![Severity::Info]);
        assert!(SeverityMask::EMPTY.is_empty());
    }
}
