use std::fmt::Display;
use url::form_urlencoded;

/// Ordered query-string encoder
///
/// Pairs are emitted in the order they are pushed, which for request structs is
/// field declaration order. The signed payload is this exact string, so the
/// order must never depend on hashing or sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    pairs: Vec<(&'static str, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always emitted, even when the rendered value is empty
    pub fn required(mut self, key: &'static str, value: impl Display) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    /// Emitted only when present and non-empty
    pub fn optional<V: Display>(mut self, key: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            let rendered = value.to_string();
            if !rendered.is_empty() {
                self.pairs.push((key, rendered));
            }
        }
        self
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// URL-encoded `k=v&k=v` form, without a leading `?`
    pub fn build(self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())))
            .finish()
    }
}

/// A request value that can be rendered into its canonical query string
pub trait ToQuery {
    fn to_query(&self) -> String;
}

/// No filters at all
impl ToQuery for () {
    fn to_query(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_order_follows_push_order() {
        let query = QueryBuilder::new()
            .required("symbol", "SOLUSDT")
            .required("side", "BUY")
            .optional("price", Some(Decimal::new(205, 1)))
            .required("timestamp", 1_700_000_000_000u64)
            .build();
        assert_eq!(query, "symbol=SOLUSDT&side=BUY&price=20.5&timestamp=1700000000000");
    }

    #[test]
    fn test_optional_omits_none_and_empty() {
        let query = QueryBuilder::new()
            .required("symbol", "BTCUSDT")
            .optional::<u32>("limit", None)
            .optional("newClientOrderId", Some(""))
            .optional("recvWindow", Some(5000u64))
            .build();
        assert_eq!(query, "symbol=BTCUSDT&recvWindow=5000");
    }

    #[test]
    fn test_required_keeps_empty_value() {
        let query = QueryBuilder::new().required("symbol", "").build();
        assert_eq!(query, "symbol=");
    }

    #[test]
    fn test_values_are_url_encoded() {
        let query = QueryBuilder::new()
            .required("symbols", r#"["BTCUSDT","BNBBTC"]"#)
            .required("newClientOrderId", "a b&c")
            .build();
        assert_eq!(
            query,
            "symbols=%5B%22BTCUSDT%22%2C%22BNBBTC%22%5D&newClientOrderId=a+b%26c"
        );
    }

    #[test]
    fn test_decimal_renders_without_exponent() {
        let tiny: Decimal = "0.00000001".parse().unwrap();
        let big: Decimal = "12345678901234.5".parse().unwrap();
        let query = QueryBuilder::new()
            .required("quantity", tiny)
            .required("price", big)
            .required("flag", true)
            .build();
        assert_eq!(query, "quantity=0.00000001&price=12345678901234.5&flag=true");
    }

    #[test]
    fn test_empty_parameter_set() {
        assert!(QueryBuilder::new().is_empty());
        assert_eq!(QueryBuilder::new().build(), "");
        assert_eq!(().to_query(), "");
    }
}
