//! REST façade.
//!
//! Every operation runs the same template: validate the request locally,
//! stamp it if it is signed, encode it, hand it to the executor. The method,
//! path and security level of each operation are fixed. Market-data
//! operations live in [`market_data`], order operations in [`trading`].

mod market_data;
mod trading;

use crate::core::errors::ExchangeError;
use crate::core::kernel::{RequestSpec, RestClient, Security, ToQuery};
use crate::core::types::current_timestamp_millis;
use crate::exchanges::binance::requests::{Timestamped, Validate};
use reqwest::Method;
use serde::de::DeserializeOwned;

/// Binance spot REST client, generic over the transport
pub struct BinanceConnector<R: RestClient> {
    rest: R,
    clock: fn() -> u64,
}

impl<R: RestClient> BinanceConnector<R> {
    pub fn new(rest: R) -> Self {
        Self {
            rest,
            clock: current_timestamp_millis,
        }
    }

    /// Replace the clock used to stamp signed requests that carry no timestamp
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn rest(&self) -> &R {
        &self.rest
    }

    async fn call<Q, T>(
        &self,
        operation: &'static str,
        method: Method,
        path: &'static str,
        request: &Q,
        security: Security,
    ) -> Result<T, ExchangeError>
    where
        Q: Validate + ToQuery + Sync,
        T: DeserializeOwned,
    {
        request
            .validate()
            .map_err(|reason| ExchangeError::Validation { operation, reason })?;

        let spec = RequestSpec::new(method, path, request.to_query(), security);
        self.rest.execute_json(spec).await
    }

    async fn signed<Q, T>(
        &self,
        operation: &'static str,
        method: Method,
        path: &'static str,
        request: &Q,
    ) -> Result<T, ExchangeError>
    where
        Q: Validate + ToQuery + Timestamped + Clone + Sync,
        T: DeserializeOwned,
    {
        let mut request = request.clone();
        request.stamp_with(self.clock);
        self.call(operation, method, path, &request, Security::Signed)
            .await
    }
}
