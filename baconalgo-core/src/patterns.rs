//! Candlestick pattern detection.
//!
//! Rule-based single- and two-bar patterns. Detection is a pure scan: every
//! bar is checked against every rule, and bars with at least one hit are
//! reported with their index and time.

use crate::domain::{Bar, BarTime};
use serde::{Deserialize, Serialize};

/// Directional bias implied by a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternBias {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Hammer,
    ShootingStar,
    Doji,
    EngulfingBullish,
    EngulfingBearish,
}

impl PatternKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hammer => "hammer",
            Self::ShootingStar => "shooting_star",
            Self::Doji => "doji",
            Self::EngulfingBullish => "engulfing_bullish",
            Self::EngulfingBearish => "engulfing_bearish",
        }
    }

    pub fn bias(&self) -> PatternBias {
        match self {
            Self::Hammer | Self::EngulfingBullish => PatternBias::Bullish,
            Self::ShootingStar | Self::EngulfingBearish => PatternBias::Bearish,
            Self::Doji => PatternBias::Neutral,
        }
    }

    /// Fixed confidence score, 0-100.
    pub fn confidence(&self) -> u8 {
        match self {
            Self::Hammer | Self::ShootingStar => 70,
            Self::Doji => 60,
            Self::EngulfingBullish | Self::EngulfingBearish => 80,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Hammer => "Bullish reversal - small body, long lower wick",
            Self::ShootingStar => "Bearish reversal - small body, long upper wick",
            Self::Doji => "Indecision - open equals close",
            Self::EngulfingBullish => "Bullish - current candle engulfs previous bearish",
            Self::EngulfingBearish => "Bearish - current candle engulfs previous bullish",
        }
    }
}

/// One pattern hit on a bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub pattern: PatternKind,
    #[serde(rename = "type")]
    pub bias: PatternBias,
    pub confidence: u8,
    pub description: String,
}

impl From<PatternKind> for DetectedPattern {
    fn from(kind: PatternKind) -> Self {
        Self {
            pattern: kind,
            bias: kind.bias(),
            confidence: kind.confidence(),
            description: kind.description().to_string(),
        }
    }
}

/// All patterns found on the bar at `index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub index: usize,
    pub timestamp: BarTime,
    pub patterns: Vec<DetectedPattern>,
}

// ─── Rules ──────────────────────────────────────────────────────────

/// Long lower wick, short upper wick, small body.
pub fn is_hammer(bar: &Bar) -> bool {
    let body = bar.body();
    bar.lower_wick() > body * 2.0 && bar.upper_wick() < body * 0.5
}

/// Long upper wick, short lower wick, small body.
pub fn is_shooting_star(bar: &Bar) -> bool {
    let body = bar.body();
    bar.upper_wick() > body * 2.0 && bar.lower_wick() < body * 0.5
}

/// Body under 10% of the high-low range.
pub fn is_doji(bar: &Bar) -> bool {
    bar.body() < bar.range() * 0.1
}

/// Two-bar engulfing reversal, if any.
pub fn engulfing(prev: &Bar, curr: &Bar) -> Option<PatternKind> {
    let prev_bullish = prev.is_bullish();
    let curr_bullish = curr.is_bullish();

    if !prev_bullish && curr_bullish && curr.close > prev.open && curr.open < prev.close {
        return Some(PatternKind::EngulfingBullish);
    }
    if prev_bullish && !curr_bullish && curr.open > prev.close && curr.close < prev.open {
        return Some(PatternKind::EngulfingBearish);
    }
    None
}

/// Patterns completing on the last bar of `bars`.
pub fn patterns_at_end(bars: &[Bar]) -> Vec<PatternKind> {
    let Some((curr, earlier)) = bars.split_last() else {
        return Vec::new();
    };

    let mut found = Vec::new();
    if is_hammer(curr) {
        found.push(PatternKind::Hammer);
    }
    if is_shooting_star(curr) {
        found.push(PatternKind::ShootingStar);
    }
    if is_doji(curr) {
        found.push(PatternKind::Doji);
    }
    if let Some(kind) = earlier.last().and_then(|prev| engulfing(prev, curr)) {
        found.push(kind);
    }
    found
}

/// Scan a bar series and report every bar with at least one pattern.
pub fn detect_patterns(bars: &[Bar]) -> Vec<PatternMatch> {
    (0..bars.len())
        .filter_map(|i| {
            let kinds = patterns_at_end(&bars[..=i]);
            if kinds.is_empty() {
                return None;
            }
            Some(PatternMatch {
                index: i,
                timestamp: BarTime::of(&bars[i], i),
                patterns: kinds.into_iter().map(DetectedPattern::from).collect(),
            })
        })
        .collect()
}
