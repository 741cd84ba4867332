use crate::core::errors::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Declares a closed set of exchange enumeration values.
///
/// Parsing is ASCII case-insensitive and rejects anything outside the set with
/// a [`ValidationError`] naming the field, so an out-of-range value can never
/// reach the encoder.
macro_rules! exchange_enum {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| ValidationError::invalid($field, s))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

exchange_enum!(
    OrderSide, field = "side" {
        Buy => "BUY",
        Sell => "SELL",
    }
);

exchange_enum!(
    OrderType, field = "type" {
        Limit => "LIMIT",
        Market => "MARKET",
        StopLoss => "STOP_LOSS",
        StopLossLimit => "STOP_LOSS_LIMIT",
        TakeProfit => "TAKE_PROFIT",
        TakeProfitLimit => "TAKE_PROFIT_LIMIT",
        LimitMaker => "LIMIT_MAKER",
    }
);

exchange_enum!(
    TimeInForce, field = "timeInForce" {
        Gtc => "GTC",
        Ioc => "IOC",
        Fok => "FOK",
    }
);

exchange_enum!(
    /// Verbosity of the order placement response
    OrderResponseType, field = "newOrderRespType" {
        Ack => "ACK",
        Result => "RESULT",
        Full => "FULL",
    }
);

exchange_enum!(
    SelfTradePreventionMode, field = "selfTradePreventionMode" {
        ExpireTaker => "EXPIRE_TAKER",
        ExpireMaker => "EXPIRE_MAKER",
        ExpireBoth => "EXPIRE_BOTH",
        None => "NONE",
    }
);

exchange_enum!(
    CancelRestrictions, field = "cancelRestrictions" {
        OnlyNew => "ONLY_NEW",
        OnlyPartiallyFilled => "ONLY_PARTIALLY_FILLED",
    }
);

exchange_enum!(
    CancelReplaceMode, field = "cancelReplaceMode" {
        StopOnFailure => "STOP_ON_FAILURE",
        AllowFailure => "ALLOW_FAILURE",
    }
);

impl OrderType {
    /// Stop and take-profit variants, which trigger on `stopPrice` or `trailingDelta`
    pub const fn is_conditional(self) -> bool {
        matches!(
            self,
            Self::StopLoss | Self::StopLossLimit | Self::TakeProfit | Self::TakeProfitLimit
        )
    }
}

/// Candlestick interval. Case matters: `1m` is a minute, `1M` a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KlineInterval {
    Seconds1,
    Minutes1,
    Minutes3,
    Minutes5,
    Minutes15,
    Minutes30,
    Hours1,
    Hours2,
    Hours4,
    Hours6,
    Hours8,
    Hours12,
    Days1,
    Days3,
    Weeks1,
    Months1,
}

impl KlineInterval {
    pub const ALL: &'static [Self] = &[
        Self::Seconds1,
        Self::Minutes1,
        Self::Minutes3,
        Self::Minutes5,
        Self::Minutes15,
        Self::Minutes30,
        Self::Hours1,
        Self::Hours2,
        Self::Hours4,
        Self::Hours6,
        Self::Hours8,
        Self::Hours12,
        Self::Days1,
        Self::Days3,
        Self::Weeks1,
        Self::Months1,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seconds1 => "1s",
            Self::Minutes1 => "1m",
            Self::Minutes3 => "3m",
            Self::Minutes5 => "5m",
            Self::Minutes15 => "15m",
            Self::Minutes30 => "30m",
            Self::Hours1 => "1h",
            Self::Hours2 => "2h",
            Self::Hours4 => "4h",
            Self::Hours6 => "6h",
            Self::Hours8 => "8h",
            Self::Hours12 => "12h",
            Self::Days1 => "1d",
            Self::Days3 => "3d",
            Self::Weeks1 => "1w",
            Self::Months1 => "1M",
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KlineInterval {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| ValidationError::invalid("interval", s))
    }
}

impl Serialize for KlineInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for KlineInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One side of a book level, decoded from the `["price", "qty"]` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Decimal, Decimal)")]
pub struct PriceLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

impl From<(Decimal, Decimal)> for PriceLevel {
    fn from((price, quantity): (Decimal, Decimal)) -> Self {
        Self { price, quantity }
    }
}

/// Current UTC time in milliseconds, the unit every signed request is stamped in
pub fn current_timestamp_millis() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// Loss-tolerant numeric conversions for stream payloads
pub mod conversion {
    use super::Decimal;
    use tracing::warn;

    /// Parse a wire decimal string. A malformed value becomes zero and is
    /// reported, so the surrounding event is still delivered.
    #[inline]
    pub fn decimal_or_zero(field: &'static str, raw: &str) -> Decimal {
        raw.parse().unwrap_or_else(|err| {
            warn!(field, raw, error = %err, "Malformed decimal in stream event, using zero");
            Decimal::ZERO
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case("BUY", OrderSide::Buy)]
    #[case("sell", OrderSide::Sell)]
    #[case("Buy", OrderSide::Buy)]
    fn test_order_side_parses_case_insensitively(#[case] raw: &str, #[case] expected: OrderSide) {
        assert_eq!(raw.parse::<OrderSide>().unwrap(), expected);
    }

    #[test]
    fn test_order_side_rejects_unknown_value() {
        let err = "HOLD".parse::<OrderSide>().unwrap_err();
        assert_eq!(err, ValidationError::invalid("side", "HOLD"));
    }

    #[rstest]
    #[case("LIMIT_MAKER", OrderType::LimitMaker)]
    #[case("STOP_LOSS_LIMIT", OrderType::StopLossLimit)]
    #[case("take_profit", OrderType::TakeProfit)]
    fn test_order_type_parses(#[case] raw: &str, #[case] expected: OrderType) {
        assert_eq!(raw.parse::<OrderType>().unwrap(), expected);
        assert_eq!(expected.as_str(), raw.to_ascii_uppercase());
    }

    #[test]
    fn test_time_in_force_rejects_gtx() {
        assert!("GTX".parse::<TimeInForce>().is_err());
        assert_eq!("gtc".parse::<TimeInForce>().unwrap(), TimeInForce::Gtc);
    }

    #[test]
    fn test_kline_interval_is_case_sensitive() {
        assert_eq!("1m".parse::<KlineInterval>().unwrap(), KlineInterval::Minutes1);
        assert_eq!("1M".parse::<KlineInterval>().unwrap(), KlineInterval::Months1);
        assert!("2m".parse::<KlineInterval>().is_err());
    }

    #[test]
    fn test_enum_serde_uses_wire_names() {
        let json = serde_json::to_string(&SelfTradePreventionMode::ExpireBoth).unwrap();
        assert_eq!(json, "\"EXPIRE_BOTH\"");

        let parsed: CancelReplaceMode = serde_json::from_str("\"ALLOW_FAILURE\"").unwrap();
        assert_eq!(parsed, CancelReplaceMode::AllowFailure);

        assert!(serde_json::from_str::<OrderSide>("\"HOLD\"").is_err());
    }

    #[test]
    fn test_price_level_from_string_pair() {
        let level: PriceLevel = serde_json::from_str(r#"["1.23","4.56"]"#).unwrap();
        assert_eq!(level.price, Decimal::new(123, 2));
        assert_eq!(level.quantity, Decimal::new(456, 2));
    }

    #[test]
    fn test_decimal_or_zero() {
        assert_eq!(conversion::decimal_or_zero("p", "0.0010"), Decimal::new(10, 4));
        assert_eq!(conversion::decimal_or_zero("p", "not-a-number"), Decimal::ZERO);
        assert_eq!(conversion::decimal_or_zero("p", ""), Decimal::ZERO);
    }

    #[test]
    fn test_current_timestamp_is_milliseconds() {
        // Anything after 2020-01-01 in ms and before year 3000
        let now = current_timestamp_millis();
        assert!(now > 1_577_836_800_000);
        assert!(now < 32_503_680_000_000);
    }
}
