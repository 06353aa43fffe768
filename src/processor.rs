use crate::models::{OptionSide, StrikeRecord};
use serde::{Deserialize, Serialize};

/// CE or PE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    pub fn side<'a>(&self, record: &'a StrikeRecord) -> Option<&'a OptionSide> {
        match self {
            OptionKind::Call => record.call.as_ref(),
            OptionKind::Put => record.put.as_ref(),
        }
    }
}

/// Floor-trader pivot levels, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

/// Strike with the largest open interest on one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxOi {
    pub strike: f64,
    pub open_interest: f64,
}

impl MaxOi {
    /// Stand-in when a side has no strikes at all.
    pub const NONE: MaxOi = MaxOi {
        strike: 0.0,
        open_interest: 0.0,
    };
}

/// Round to 2 decimals from the exact binary value, ties to even.
///
/// Scaling by 100 first would round the product, turning 1.4949999999999999
/// into 149.5 and then 1.50.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Pivots from a synthetic bar: close = spot, high/low = spot ± step.
pub fn calculate_pivot_levels(spot: f64, step: f64) -> PivotLevels {
    let close = spot;
    let high = spot + step;
    let low = spot - step;

    let pivot = (high + low + close) / 3.0;
    let r1 = 2.0 * pivot - low;
    let s1 = 2.0 * pivot - high;
    let r2 = pivot + (high - low);
    let s2 = pivot - (high - low);
    let r3 = high + 2.0 * (pivot - low);
    let s3 = low - 2.0 * (high - pivot);

    PivotLevels {
        pivot: round2(pivot),
        r1: round2(r1),
        r2: round2(r2),
        r3: round2(r3),
        s1: round2(s1),
        s2: round2(s2),
        s3: round2(s3),
    }
}

/// Nearest multiple of `step`; exact halves go to the even multiple.
pub fn find_atm_strike(spot: f64, step: f64) -> f64 {
    (spot / step).round_ties_even() * step
}

/// Open interest per strike for one side, in first-seen strike order.
///
/// A strike listed more than once keeps its first position but takes the last
/// value seen. Missing OI counts as zero; records without a strike are skipped.
pub fn open_interest_by_strike(records: &[StrikeRecord], kind: OptionKind) -> Vec<(f64, f64)> {
    let mut by_strike: Vec<(f64, f64)> = Vec::new();

    for record in records {
        let (Some(strike), Some(side)) = (record.strike_price, kind.side(record)) else {
            continue;
        };
        let oi = side.open_interest.unwrap_or(0.0);

        match by_strike.iter_mut().find(|(s, _)| *s == strike) {
            Some(entry) => entry.1 = oi,
            None => by_strike.push((strike, oi)),
        }
    }

    by_strike
}

/// Highest-OI strike; the earliest one wins a tie. Empty input gives `MaxOi::NONE`.
pub fn find_max_oi(by_strike: &[(f64, f64)]) -> MaxOi {
    by_strike
        .iter()
        .fold(None, |best: Option<MaxOi>, &(strike, oi)| match best {
            Some(b) if b.open_interest >= oi => Some(b),
            _ => Some(MaxOi {
                strike,
                open_interest: oi,
            }),
        })
        .unwrap_or(MaxOi::NONE)
}

/// Last traded price of `kind` at `strike`, from the first record that has that side.
pub fn last_price_at(records: &[StrikeRecord], strike: f64, kind: OptionKind) -> Option<f64> {
    records
        .iter()
        .filter(|r| r.strike_price == Some(strike))
        .find_map(|r| kind.side(r))
        .and_then(|side| side.last_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(strike: f64, call_oi: Option<f64>, put_oi: Option<f64>) -> StrikeRecord {
        StrikeRecord {
            strike_price: Some(strike),
            expiry_date: None,
            call: call_oi.map(|oi| OptionSide {
                open_interest: Some(oi),
                last_price: None,
            }),
            put: put_oi.map(|oi| OptionSide {
                open_interest: Some(oi),
                last_price: None,
            }),
        }
    }

    #[test]
    fn test_pivot_levels_hand_computed() {
        let levels = calculate_pivot_levels(20000.0, 50.0);
        assert_eq!(levels.pivot, 20000.0);
        assert_eq!(levels.r1, 20050.0);
        assert_eq!(levels.s1, 19950.0);
        assert_eq!(levels.r2, 20100.0);
        assert_eq!(levels.s2, 19900.0);
        assert_eq!(levels.r3, 20150.0);
        assert_eq!(levels.s3, 19850.0);
    }

    #[test]
    fn test_pivot_levels_are_rounded() {
        let levels = calculate_pivot_levels(20012.3, 50.0);
        assert_eq!(levels.pivot, 20012.3);
        assert_eq!(levels.r1, 20062.3);
        assert_eq!(levels.s2, 19912.3);
        assert_eq!(levels.s3, 19862.3);
    }

    #[test]
    fn test_round2_uses_exact_value() {
        assert_eq!(round2(1.3 * 1.15), 1.49);
        assert_eq!(round2(2.1 * 0.95), 1.99);
        // exactly representable tie
        assert_eq!(round2(20000.125), 20000.12);
        assert_eq!(round2(45.35 * 1.15), 52.15);
        assert_eq!(round2(-0.004), 0.0);
    }

    #[test]
    fn test_atm_rounds_half_to_even() {
        assert_eq!(find_atm_strike(20012.0, 50.0), 20000.0);
        assert_eq!(find_atm_strike(20030.0, 50.0), 20050.0);
        // 20025 / 50 = 400.5 -> 400
        assert_eq!(find_atm_strike(20025.0, 50.0), 20000.0);
        // 20075 / 50 = 401.5 -> 402
        assert_eq!(find_atm_strike(20075.0, 50.0), 20100.0);
    }

    #[test]
    fn test_open_interest_duplicates_keep_position_take_last_value() {
        let records = vec![
            record(100.0, Some(10.0), None),
            record(110.0, Some(30.0), Some(5.0)),
            record(100.0, Some(50.0), None),
        ];

        let calls = open_interest_by_strike(&records, OptionKind::Call);
        assert_eq!(calls, vec![(100.0, 50.0), (110.0, 30.0)]);

        let puts = open_interest_by_strike(&records, OptionKind::Put);
        assert_eq!(puts, vec![(110.0, 5.0)]);
    }

    #[test]
    fn test_max_oi_first_wins_tie_and_empty_is_sentinel() {
        let max = find_max_oi(&[(100.0, 40.0), (110.0, 40.0), (90.0, 10.0)]);
        assert_eq!(max.strike, 100.0);
        assert_eq!(find_max_oi(&[]), MaxOi::NONE);
    }

    #[test]
    fn test_last_price_uses_first_record_with_side() {
        let mut first = record(100.0, None, Some(1.0));
        first.put.as_mut().unwrap().last_price = Some(12.5);
        let mut second = record(100.0, Some(1.0), None);
        second.call.as_mut().unwrap().last_price = Some(40.0);
        let records = vec![first, second];

        assert_eq!(last_price_at(&records, 100.0, OptionKind::Call), Some(40.0));
        assert_eq!(last_price_at(&records, 100.0, OptionKind::Put), Some(12.5));
        assert_eq!(last_price_at(&records, 110.0, OptionKind::Call), None);
    }
}
