//! Next-price prediction and movement classification.

use crate::metrics::round2;
use serde::{Deserialize, Serialize};

/// Minimum history for a directional call.
pub const MIN_HISTORY: usize = 10;

/// Moves smaller than this percent are neutral.
const NEUTRAL_BAND_PCT: f64 = 1.0;

/// A move of this percent or more maps to full confidence.
const FULL_CONFIDENCE_PCT: f64 = 5.0;

/// Forecasts the next price from a price history.
pub trait Predictor {
    fn predict_next(&self, prices: &[f64]) -> f64;
}

/// Mean of the trailing window, or the last price when history is shorter.
#[derive(Debug, Clone, Copy)]
pub struct MovingAveragePredictor {
    pub window: usize,
}

impl Default for MovingAveragePredictor {
    fn default() -> Self {
        Self {
            window: MIN_HISTORY,
        }
    }
}

impl Predictor for MovingAveragePredictor {
    fn predict_next(&self, prices: &[f64]) -> f64 {
        if self.window == 0 || prices.len() < self.window {
            return prices.last().copied().unwrap_or(0.0);
        }
        let tail = &prices[prices.len() - self.window..];
        tail.iter().sum::<f64>() / self.window as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementBias {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub symbol: String,
    pub prediction: MovementBias,
    /// 0-100.
    pub confidence: f64,
    pub next_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
}

/// Classify the expected move from the last price to the predicted one.
///
/// Fewer than [`MIN_HISTORY`] prices yields a neutral call with zero
/// confidence and no change estimate.
pub fn predict_price_movement(
    symbol: &str,
    prices: &[f64],
    predictor: &dyn Predictor,
) -> Prediction {
    let last = prices.last().copied().unwrap_or(0.0);
    if prices.len() < MIN_HISTORY {
        return Prediction {
            symbol: symbol.to_string(),
            prediction: MovementBias::Neutral,
            confidence: 0.0,
            next_price: last,
            change_percent: None,
        };
    }

    let next_price = predictor.predict_next(prices);
    let change_pct = if last != 0.0 {
        (next_price - last) / last * 100.0
    } else {
        0.0
    };

    let (prediction, confidence) = if change_pct > NEUTRAL_BAND_PCT {
        (MovementBias::Bullish, scaled_confidence(change_pct))
    } else if change_pct < -NEUTRAL_BAND_PCT {
        (MovementBias::Bearish, scaled_confidence(change_pct))
    } else {
        (MovementBias::Neutral, 50.0)
    };

    Prediction {
        symbol: symbol.to_string(),
        prediction,
        confidence: round2(confidence),
        next_price: round2(next_price),
        change_percent: Some(round2(change_pct)),
    }
}

fn scaled_confidence(change_pct: f64) -> f64 {
    (change_pct.abs() / FULL_CONFIDENCE_PCT).min(1.0) * 100.0
}
