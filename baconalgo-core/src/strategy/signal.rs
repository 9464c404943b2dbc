//! Signal — what the strategy wants, independent of what the book holds.

use crate::domain::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Token that is not one of the recognized signal spellings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognized signal token '{0}' (expected 'long', 'short' or 'flat')")]
pub struct SignalParseError(pub String);

/// Desired market exposure for the current bar.
///
/// # Examples
/// - Fast MA above slow MA → Long (regardless of current position)
/// - Bearish engulfing candle → Short
/// - No edge → Flat (closes whatever is open)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Long,
    Short,
    Flat,
}

impl Signal {
    /// Direction a new trade would take, or `None` for Flat.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Long => Some(Direction::Long),
            Self::Short => Some(Direction::Short),
            Self::Flat => None,
        }
    }
}

impl From<Direction> for Signal {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Long => Self::Long,
            Direction::Short => Self::Short,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Long => "long",
            Self::Short => "short",
            Self::Flat => "flat",
        })
    }
}

impl FromStr for Signal {
    type Err = SignalParseError;

    /// Accepts `long`, `short`, `flat` in any case. An empty token or `none`
    /// also means Flat; anything else is rejected rather than coerced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            "flat" | "none" | "" => Ok(Self::Flat),
            _ => Err(SignalParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_mapping() {
        assert_eq!(Signal::Long.direction(), Some(Direction::Long));
        assert_eq!(Signal::Short.direction(), Some(Direction::Short));
        assert_eq!(Signal::Flat.direction(), None);
        assert_eq!(Signal::from(Direction::Short), Signal::Short);
    }

    #[test]
    fn parses_known_tokens() {
        assert_eq!("LONG".parse::<Signal>().unwrap(), Signal::Long);
        assert_eq!("short".parse::<Signal>().unwrap(), Signal::Short);
        assert_eq!("Flat".parse::<Signal>().unwrap(), Signal::Flat);
        assert_eq!("none".parse::<Signal>().unwrap(), Signal::Flat);
        assert_eq!("".parse::<Signal>().unwrap(), Signal::Flat);
    }

    #[test]
    fn rejects_unknown_tokens() {
        let err = "buy".parse::<Signal>().unwrap_err();
        assert_eq!(err, SignalParseError("buy".into()));
    }
}
