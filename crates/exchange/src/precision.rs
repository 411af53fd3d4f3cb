//! Per-symbol price and size granularity.
//!
//! All arithmetic is decimal. Ties are resolved half-to-even
//! (`RoundingStrategy::MidpointNearestEven`) for every symbol.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

/// Step sizes the exchange accepts for one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolPrecision {
  pub price_step: Decimal,
  pub size_step: Decimal,
  pub min_size: Decimal,
}

impl SymbolPrecision {
  /// Returns `None` unless every step is strictly positive.
  pub fn new(price_step: Decimal, size_step: Decimal, min_size: Decimal) -> Option<Self> {
    let positive = |d: Decimal| d > Decimal::ZERO;
    (positive(price_step) && positive(size_step) && positive(min_size)).then_some(Self {
      price_step,
      size_step,
      min_size,
    })
  }

  /// Rounded to `size_step`, never below `min_size`.
  pub fn adjust_size(&self, size: Decimal) -> Decimal {
    round_to_step(size, self.size_step).max(self.min_size)
  }

  pub fn adjust_price(&self, price: Decimal) -> Decimal {
    round_to_step(price, self.price_step)
  }

  pub fn price_decimals(&self) -> u32 {
    step_decimals(self.price_step)
  }

  pub fn size_decimals(&self) -> u32 {
    step_decimals(self.size_step)
  }

  pub fn format_price(&self, price: Decimal) -> String {
    format_fixed(price, self.price_decimals())
  }

  /// At most `size_decimals` fraction digits, trailing zeros dropped.
  pub fn format_size(&self, size: Decimal) -> String {
    size
      .round_dp_with_strategy(self.size_decimals(), RoundingStrategy::MidpointNearestEven)
      .normalize()
      .to_string()
  }
}

/// Nearest multiple of `step`, ties to even. A non-positive step, or a
/// quotient that overflows, leaves `value` untouched.
pub fn round_to_step(value: Decimal, step: Decimal) -> Decimal {
  if step <= Decimal::ZERO {
    return value;
  }
  value
    .checked_div(step)
    .map(|units| units.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven))
    .and_then(|units| units.checked_mul(step))
    .unwrap_or(value)
}

/// Fraction digits implied by a step: `0.01` → 2, `0.10` → 1, `1` or `100` → 0.
pub fn step_decimals(step: Decimal) -> u32 {
  if step >= Decimal::ONE {
    0
  } else {
    step.normalize().scale()
  }
}

/// Fixed-point rendering with exactly `decimals` fraction digits.
pub fn format_fixed(value: Decimal, decimals: u32) -> String {
  let mut value = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven);
  value.rescale(decimals);
  value.to_string()
}

/// Immutable symbol → precision map, iterated in symbol order.
#[derive(Debug, Clone)]
pub struct PrecisionTable {
  entries: BTreeMap<String, SymbolPrecision>,
}

impl PrecisionTable {
  pub fn new(entries: impl IntoIterator<Item = (String, SymbolPrecision)>) -> Self {
    Self {
      entries: entries.into_iter().collect(),
    }
  }

  /// `None` means "unknown symbol, pass values through", not failure.
  pub fn lookup(&self, symbol: &str) -> Option<&SymbolPrecision> {
    self.entries.get(symbol)
  }

  pub fn symbols(&self) -> impl Iterator<Item = &str> {
    self.entries.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl Default for PrecisionTable {
  /// Contracts listed on WEEX perpetuals.
  fn default() -> Self {
    // (symbol, price_step, size_step, min_size) as (mantissa, scale) pairs
    const CONTRACTS: [(&str, (i64, u32), (i64, u32), (i64, u32)); 8] = [
      ("cmt_btcusdt", (1, 1), (1, 3), (1, 3)),
      ("cmt_ethusdt", (1, 2), (1, 3), (1, 3)),
      ("cmt_solusdt", (1, 3), (1, 1), (1, 1)),
      ("cmt_dogeusdt", (1, 5), (100, 0), (100, 0)),
      ("cmt_xrpusdt", (1, 4), (10, 0), (10, 0)),
      ("cmt_adausdt", (1, 4), (10, 0), (10, 0)),
      ("cmt_bnbusdt", (1, 2), (1, 1), (1, 1)),
      ("cmt_ltcusdt", (1, 2), (1, 1), (1, 1)),
    ];

    let dec = |(mantissa, scale): (i64, u32)| Decimal::new(mantissa, scale);
    Self::new(CONTRACTS.iter().map(|&(symbol, price, size, min)| {
      (
        symbol.to_string(),
        SymbolPrecision {
          price_step: dec(price),
          size_step: dec(size),
          min_size: dec(min),
        },
      )
    }))
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use proptest::prelude::*;

  use super::*;

  fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
  }

  #[test]
  fn rounds_to_nearest_step() {
    assert_eq!(round_to_step(d("0.0567"), d("0.01")), d("0.06"));
    assert_eq!(round_to_step(d("0.0549"), d("0.01")), d("0.05"));
    assert_eq!(round_to_step(d("79999.96"), d("0.1")), d("80000.0"));
    assert_eq!(round_to_step(d("149"), d("100")), d("100"));
    assert_eq!(round_to_step(d("151"), d("100")), d("200"));
  }

  #[test]
  fn midpoints_round_half_to_even() {
    assert_eq!(round_to_step(d("0.065"), d("0.01")), d("0.06"));
    assert_eq!(round_to_step(d("0.075"), d("0.01")), d("0.08"));
    assert_eq!(round_to_step(d("250"), d("100")), d("200"));
    assert_eq!(round_to_step(d("350"), d("100")), d("400"));
    assert_eq!(round_to_step(d("0.0005"), d("0.001")), d("0"));
  }

  #[test]
  fn non_positive_step_is_identity() {
    assert_eq!(round_to_step(d("1.2345"), Decimal::ZERO), d("1.2345"));
    assert_eq!(round_to_step(d("1.2345"), d("-0.1")), d("1.2345"));
  }

  #[test]
  fn step_decimals_follow_step() {
    assert_eq!(step_decimals(d("0.01")), 2);
    assert_eq!(step_decimals(d("0.10")), 1);
    assert_eq!(step_decimals(d("0.00001")), 5);
    assert_eq!(step_decimals(d("1")), 0);
    assert_eq!(step_decimals(d("1.0")), 0);
    assert_eq!(step_decimals(d("100")), 0);
  }

  #[test]
  fn formats_with_exact_fraction_digits() {
    assert_eq!(format_fixed(d("80000"), 2), "80000.00");
    assert_eq!(format_fixed(d("0.06"), 2), "0.06");
    assert_eq!(format_fixed(d("123.0"), 0), "123");
    assert_eq!(format_fixed(d("0.5"), 3), "0.500");
  }

  #[test]
  fn default_table_has_known_contracts() {
    let table = PrecisionTable::default();
    assert_eq!(table.len(), 8);

    let btc = table.lookup("cmt_btcusdt").unwrap();
    assert_eq!(btc.price_step, d("0.1"));
    assert_eq!(btc.size_step, d("0.001"));
    assert_eq!(btc.min_size, d("0.001"));

    let doge = table.lookup("cmt_dogeusdt").unwrap();
    assert_eq!(doge.price_step, d("0.00001"));
    assert_eq!(doge.size_step, d("100"));
    assert_eq!(doge.min_size, d("100"));

    assert!(table.lookup("cmt_unknown").is_none());
  }

  #[test]
  fn symbols_iterate_in_order() {
    let table = PrecisionTable::default();
    let symbols: Vec<&str> = table.symbols().collect();
    let mut sorted = symbols.clone();
    sorted.sort();
    assert_eq!(symbols, sorted);
    assert_eq!(symbols.first(), Some(&"cmt_adausdt"));
  }

  #[test]
  fn doge_size_raised_to_minimum() {
    let table = PrecisionTable::default();
    let doge = table.lookup("cmt_dogeusdt").unwrap();
    assert_eq!(doge.adjust_size(d("50")), d("100"));
    assert_eq!(doge.format_size(doge.adjust_size(d("50"))), "100");
    assert_eq!(doge.adjust_size(d("1049")), d("1000"));
    assert_eq!(doge.format_size(doge.adjust_size(d("1049"))), "1000");
  }

  #[test]
  fn size_strings_drop_trailing_zeros() {
    let table = PrecisionTable::default();
    let btc = table.lookup("cmt_btcusdt").unwrap();
    assert_eq!(btc.format_size(btc.adjust_size(d("0.0104"))), "0.01");
    assert_eq!(btc.format_size(btc.adjust_size(d("0.0126"))), "0.013");
    assert_eq!(btc.format_size(btc.adjust_size(d("2"))), "2");

    let sol = table.lookup("cmt_solusdt").unwrap();
    assert_eq!(sol.format_size(sol.adjust_size(d("1.25"))), "1.2");
  }

  #[test]
  fn price_strings_match_step() {
    let table = PrecisionTable::default();
    let eth = table.lookup("cmt_ethusdt").unwrap();
    assert_eq!(eth.format_price(eth.adjust_price(d("3000"))), "3000.00");
    assert_eq!(eth.format_price(eth.adjust_price(d("3000.126"))), "3000.13");

    let whole = SymbolPrecision::new(d("1"), d("1"), d("1")).unwrap();
    assert_eq!(whole.format_price(whole.adjust_price(d("80000.4"))), "80000");
  }

  #[test]
  fn rejects_non_positive_steps() {
    assert!(SymbolPrecision::new(d("0"), d("1"), d("1")).is_none());
    assert!(SymbolPrecision::new(d("1"), d("-1"), d("1")).is_none());
    assert!(SymbolPrecision::new(d("1"), d("1"), d("0")).is_none());
    assert!(SymbolPrecision::new(d("0.1"), d("0.1"), d("0.1")).is_some());
  }

  fn steps() -> impl Strategy<Value = Decimal> {
    prop_oneof![
      Just(Decimal::new(1, 5)),
      Just(Decimal::new(1, 3)),
      Just(Decimal::new(1, 2)),
      Just(Decimal::new(1, 1)),
      Just(Decimal::ONE),
      Just(Decimal::new(10, 0)),
      Just(Decimal::new(100, 0)),
    ]
  }

  fn amounts() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000_000, 0u32..8).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
  }

  proptest! {
    #[test]
    fn rounding_is_idempotent(value in amounts(), step in steps()) {
      let once = round_to_step(value, step);
      prop_assert_eq!(round_to_step(once, step), once);
    }

    #[test]
    fn rounded_values_are_step_aligned(value in amounts(), step in steps()) {
      let rounded = round_to_step(value, step);
      prop_assert!((rounded % step).is_zero());
    }

    #[test]
    fn small_sizes_are_raised_to_minimum(value in amounts()) {
      let table = PrecisionTable::default();
      for symbol in table.symbols() {
        let precision = table.lookup(symbol).unwrap();
        let size = value.min(precision.min_size);
        prop_assert_eq!(precision.adjust_size(size), precision.min_size);
      }
    }

    #[test]
    fn adjusted_sizes_are_aligned_and_floored(value in amounts()) {
      let table = PrecisionTable::default();
      for symbol in table.symbols() {
        let precision = table.lookup(symbol).unwrap();
        let adjusted = precision.adjust_size(value);
        prop_assert!(adjusted >= precision.min_size);
        prop_assert!((adjusted % precision.size_step).is_zero());
      }
    }

    #[test]
    fn formatted_prices_carry_step_digits(value in amounts()) {
      let table = PrecisionTable::default();
      for symbol in table.symbols() {
        let precision = table.lookup(symbol).unwrap();
        let text = precision.format_price(precision.adjust_price(value));
        let digits = text.split('.').nth(1).map_or(0, str::len) as u32;
        prop_assert_eq!(digits, precision.price_decimals());
      }
    }
  }
}
