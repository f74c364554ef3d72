//! Currency converter trait and fixed-rate in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{CurrencyCode, Money};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use thiserror::Error;

use super::CallRecorder;
use crate::context::RequestContext;

/// Errors returned by the currency converter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("unsupported currency {0}")]
    UnsupportedCurrency(CurrencyCode),

    #[error("converted amount out of range")]
    OutOfRange,

    #[error("currency service unavailable: {0}")]
    Unavailable(String),
}

/// Converts money between currencies.
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    async fn convert(
        &self,
        ctx: &RequestContext,
        from: &Money,
        to: &CurrencyCode,
    ) -> Result<Money, ConversionError>;
}

/// Units of each currency per one euro.
const EUR_RATES: &[(&str, Decimal)] = &[
    ("EUR", dec!(1.0)),
    ("USD", dec!(1.1305)),
    ("JPY", dec!(126.40)),
    ("GBP", dec!(0.85970)),
    ("TRY", dec!(6.1530)),
    ("CAD", dec!(1.5128)),
];

/// Currency converter with a fixed, euro-based rate table.
///
/// Results are rounded half away from zero to the cent.
#[derive(Debug, Clone)]
pub struct InMemoryCurrencyConverter {
    rates: Arc<HashMap<CurrencyCode, Decimal>>,
    fail_on_convert: Arc<AtomicBool>,
    conversions: Arc<CallRecorder>,
}

impl Default for InMemoryCurrencyConverter {
    fn default() -> Self {
        let rates = EUR_RATES
            .iter()
            .filter_map(|(code, rate)| Some((CurrencyCode::new(code).ok()?, *rate)))
            .collect();
        Self {
            rates: Arc::new(rates),
            fail_on_convert: Arc::default(),
            conversions: Arc::default(),
        }
    }
}

impl InMemoryCurrencyConverter {
    /// Creates a converter with the standard rate table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currencies this converter accepts, sorted.
    pub fn supported_currencies(&self) -> Vec<CurrencyCode> {
        let mut codes: Vec<_> = self.rates.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Configures the converter to fail every conversion.
    pub fn set_fail_on_convert(&self, fail: bool) {
        self.fail_on_convert.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of conversions requested, including failed ones.
    pub fn conversion_count(&self) -> usize {
        self.conversions.count()
    }

    fn rate(&self, code: &CurrencyCode) -> Result<Decimal, ConversionError> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| ConversionError::UnsupportedCurrency(code.clone()))
    }
}

#[async_trait]
impl CurrencyConverter for InMemoryCurrencyConverter {
    async fn convert(
        &self,
        ctx: &RequestContext,
        from: &Money,
        to: &CurrencyCode,
    ) -> Result<Money, ConversionError> {
        self.conversions.record(ctx).await;

        if self.fail_on_convert.load(Ordering::SeqCst) {
            return Err(ConversionError::Unavailable(
                "rate feed unreachable".to_string(),
            ));
        }

        let from_rate = self.rate(from.currency())?;
        let to_rate = self.rate(to)?;
        if from.currency() == to {
            return Ok(from.clone());
        }

        let cents = (Decimal::from(from.cents()) / from_rate * to_rate)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .ok_or(ConversionError::OutOfRange)?;

        Ok(Money::from_cents(cents, to.clone()))
    }
}
