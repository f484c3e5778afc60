//! Fixed-precision decimal type used for prices and sizes.
//!
//! Binary floating point is never used for value storage or comparison —
//! [`Price`] wraps [`rust_decimal::Decimal`], an exact base-10 fixed-point
//! type, so that addition, subtraction, and equality are exact.

use rust_decimal::Decimal;
use rust_decimal::prelude::Zero;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error returned when a wire-format decimal string cannot be parsed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid decimal value: {raw:?}")]
pub struct ParseError {
    /// The text that failed to parse.
    pub raw: String,
}

/// An exact, arbitrary-precision-within-`Decimal`'s-range fixed-point value.
///
/// Used for both prices and order sizes (see the [`Size`] alias). `Price`
/// is `Copy`, so it can be passed across thread boundaries (e.g. into a
/// published [`crate::orderbook::viewer::BookSnapshot`]) without any
/// synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

/// Sizes share `Price`'s representation and arithmetic; the spec treats
/// them as the same kind of exact decimal value with one extra convention
/// (zero size signals removal).
pub type Size = Price;

impl Price {
    /// The additive identity. Used to pad shallow bid sides in
    /// [`super::side_book::SideBook::top_n`].
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// A positive sentinel larger than any real price, used to pad shallow
    /// ask sides so that downstream spread computations never see a
    /// misleadingly low value. Backed by `Decimal::MAX` since `Decimal` has
    /// no literal infinity.
    pub const INFINITY: Price = Price(Decimal::MAX);

    /// Parses a decimal string as transmitted on the wire (exchange feed
    /// and REST snapshot both encode prices/sizes as decimal strings).
    pub fn parse(raw: &str) -> Result<Price, ParseError> {
        Decimal::from_str(raw)
            .map(Price)
            .map_err(|_| ParseError { raw: raw.to_string() })
    }

    /// True if this value is exactly zero. A zero `Size` on an `open`-style
    /// insert is meaningless (the order-present invariant requires
    /// `size > 0`); a zero `Size` from a `match` decrement means the order
    /// is fully filled and must be removed.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Saturating subtraction: never goes below [`Price::ZERO`]. Used when
    /// decrementing a resting order's size on `match` — the feed is
    /// expected to never over-decrement, but this keeps the invariant
    /// `size >= 0` even if it does.
    pub fn saturating_sub(self, rhs: Price) -> Price {
        if rhs.0 > self.0 {
            Price::ZERO
        } else {
            Price(self.0 - rhs.0)
        }
    }

    /// Exact subtraction without clamping, for spread calculations where a
    /// negative result would indicate a crossed or degenerate book.
    pub fn sub(self, rhs: Price) -> Price {
        Price(self.0 - rhs.0)
    }

    /// Exact addition, used to accumulate a price level's aggregate size.
    pub fn add(self, rhs: Price) -> Price {
        Price(self.0 + rhs.0)
    }

    /// Formats with a fixed number of fractional digits.
    pub fn format_fixed(&self, decimal_places: u32) -> String {
        format!("{:.*}", decimal_places as usize, self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::ZERO
    }
}

// Wire format is always a decimal string, so `Price` serializes/deserializes
// through `Display`/`FromStr` rather than relying on `rust_decimal`'s serde
// feature (kept off to avoid pulling in a format we don't use).
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

struct PriceVisitor;

impl<'de> Visitor<'de> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        Price::parse(v).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Price, D::Error> {
        deserializer.deserialize_str(PriceVisitor)
    }
}
