use crate::config;
use crate::models::{FetchOutcome, OptionChain};
use crate::processor::{
    calculate_pivot_levels, find_atm_strike, find_max_oi, last_price_at, open_interest_by_strike,
    round2, MaxOi, OptionKind, PivotLevels,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendered in place of any value that could not be determined.
pub const PLACEHOLDER: &str = "—";

/// Why a price field has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Fetch failed or the chain had no spot price.
    Unavailable,
    /// No directional signal at the ATM strike.
    NoMatch,
    /// Signal found but the target strike has no last traded price.
    NoQuote,
    /// Entry premium under the minimum entry price.
    BelowFloor,
}

/// Entry, target or stop-loss price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Quote {
    Determined(f64),
    Undetermined(Reason),
}

impl Quote {
    pub fn value(&self) -> Option<f64> {
        match self {
            Quote::Determined(v) => Some(*v),
            Quote::Undetermined(_) => None,
        }
    }

    pub fn reason(&self) -> Option<Reason> {
        match self {
            Quote::Determined(_) => None,
            Quote::Undetermined(r) => Some(*r),
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Quote::Determined(v) => write!(f, "{:.2}", v),
            Quote::Undetermined(_) => write!(f, "{}", PLACEHOLDER),
        }
    }
}

/// Recommended trade for one index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TradeSignal {
    Error,
    NoSpot,
    WaitForBreakout,
    BuyCall { strike: f64 },
    BuyPut { strike: f64 },
}

/// Per-index output of one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelResult {
    pub index: String,
    pub spot: Option<f64>,
    pub levels: Option<PivotLevels>,
    pub trade: TradeSignal,
    pub entry: Quote,
    pub target: Quote,
    pub stop_loss: Quote,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LevelResult {
    fn unavailable(index: &str, trade: TradeSignal, error: Option<String>) -> Self {
        let none = Quote::Undetermined(Reason::Unavailable);
        Self {
            index: index.to_string(),
            spot: None,
            levels: None,
            trade,
            entry: none,
            target: none,
            stop_loss: none,
            error,
        }
    }

    pub fn trade_description(&self) -> String {
        match self.trade {
            TradeSignal::Error => "❌ Error".to_string(),
            TradeSignal::NoSpot => "❌ No Spot".to_string(),
            TradeSignal::WaitForBreakout => "⚠️ Wait for Breakout".to_string(),
            TradeSignal::BuyCall { strike } => format!("📈 BUY {} CE {}", self.index, strike),
            TradeSignal::BuyPut { strike } => format!("📉 BUY {} PE {}", self.index, strike),
        }
    }

    pub fn spot_display(&self) -> String {
        self.spot
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

/// Turn one fetch outcome into pivot levels and a trade call. Never fails.
pub fn evaluate(index: &str, tick_step: f64, outcome: &FetchOutcome) -> LevelResult {
    let chain = match outcome {
        FetchOutcome::Failed { message } => {
            return LevelResult::unavailable(index, TradeSignal::Error, Some(message.clone()));
        }
        FetchOutcome::Success(chain) => chain,
    };

    let Some(spot) = chain.spot() else {
        return LevelResult::unavailable(index, TradeSignal::NoSpot, None);
    };

    if !(tick_step.is_finite() && tick_step > 0.0) {
        return LevelResult::unavailable(
            index,
            TradeSignal::Error,
            Some(format!("Invalid tick step {}", tick_step)),
        );
    }

    let levels = calculate_pivot_levels(spot, tick_step);
    let (trade, entry) = decide_trade(chain, spot, tick_step);
    let (entry, target, stop_loss) = price_trade(entry);

    LevelResult {
        index: index.to_string(),
        spot: Some(round2(spot)),
        levels: Some(levels),
        trade,
        entry,
        target,
        stop_loss,
        error: None,
    }
}

/// Compare the ATM strike against the max-OI strikes on both sides.
///
/// Returns the signal and the raw entry premium, if any.
pub fn decide_trade(chain: &OptionChain, spot: f64, step: f64) -> (TradeSignal, Quote) {
    let records = chain.strikes();
    let max_call = find_max_oi(&open_interest_by_strike(records, OptionKind::Call));
    let max_put = find_max_oi(&open_interest_by_strike(records, OptionKind::Put));

    let atm = find_atm_strike(spot, step);
    let no_trade = (
        TradeSignal::WaitForBreakout,
        Quote::Undetermined(Reason::NoMatch),
    );

    let has_atm = records
        .iter()
        .any(|r| r.strike_price == Some(atm) && r.call.is_some() && r.put.is_some());
    if !has_atm {
        return no_trade;
    }

    let (signal, strike, kind) = match bias(atm, max_call, max_put) {
        Some(OptionKind::Call) => {
            let strike = atm + step;
            (TradeSignal::BuyCall { strike }, strike, OptionKind::Call)
        }
        Some(OptionKind::Put) => {
            let strike = atm - step;
            (TradeSignal::BuyPut { strike }, strike, OptionKind::Put)
        }
        None => return no_trade,
    };

    let entry = match last_price_at(records, strike, kind) {
        Some(price) => Quote::Determined(price),
        None => Quote::Undetermined(Reason::NoQuote),
    };

    (signal, entry)
}

/// Below both OI pins leans bullish, above both leans bearish.
fn bias(atm: f64, max_call: MaxOi, max_put: MaxOi) -> Option<OptionKind> {
    if atm < max_put.strike && atm < max_call.strike {
        Some(OptionKind::Call)
    } else if atm > max_put.strike && atm > max_call.strike {
        Some(OptionKind::Put)
    } else {
        None
    }
}

/// Entry, target and stop-loss from a raw entry premium.
pub fn price_trade(entry: Quote) -> (Quote, Quote, Quote) {
    match entry {
        Quote::Determined(price) if price.is_finite() && price >= config::MIN_ENTRY_PRICE => (
            Quote::Determined(round2(price)),
            Quote::Determined(round2(price * config::TARGET_MULTIPLIER)),
            Quote::Determined(round2(price * config::STOP_LOSS_MULTIPLIER)),
        ),
        Quote::Determined(_) => {
            let below = Quote::Undetermined(Reason::BelowFloor);
            (below, below, below)
        }
        undetermined => (undetermined, undetermined, undetermined),
    }
}
