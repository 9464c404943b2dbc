//! Adapter for strategies that speak in text tokens ("long"/"short"/"flat").
//!
//! Unrecognized tokens surface as [`StrategyError::InvalidToken`] instead of
//! being silently treated as no-signal.

use super::{Signal, Strategy, StrategyError};
use crate::domain::Bar;

pub struct TokenStrategy<F> {
    name: String,
    decide_fn: F,
}

impl<F> TokenStrategy<F>
where
    F: Fn(&[Bar]) -> String,
{
    pub fn new(name: impl Into<String>, decide_fn: F) -> Self {
        Self {
            name: name.into(),
            decide_fn,
        }
    }
}

impl<F> Strategy for TokenStrategy<F>
where
    F: Fn(&[Bar]) -> String,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, history: &[Bar]) -> Result<Signal, StrategyError> {
        let token = (self.decide_fn)(history);
        Ok(token.parse::<Signal>()?)
    }
}
