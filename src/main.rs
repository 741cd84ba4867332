use anyhow::Context;
use spotlink::exchanges::binance::{self, DepthSpeed};
use spotlink::ExchangeConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Credentials are optional; streams are public
#[cfg(feature = "env-file")]
fn load_config() -> ExchangeConfig {
    ExchangeConfig::from_env_file("BINANCE").unwrap_or_else(|_| ExchangeConfig::read_only())
}

#[cfg(not(feature = "env-file"))]
fn load_config() -> ExchangeConfig {
    ExchangeConfig::from_env("BINANCE").unwrap_or_else(|_| ExchangeConfig::read_only())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config();
    let streams = binance::build_streams(&config);

    let subscription = streams
        .subscribe_depth("BTCUSDT", DepthSpeed::Standard, |update| {
            info!(
                symbol = %update.symbol,
                final_update_id = update.final_update_id,
                best_bid = ?update.bids.first(),
                best_ask = ?update.asks.first(),
                "depth update"
            );
            Ok(())
        })
        .await
        .context("failed to subscribe to BTCUSDT depth")?;

    info!(url = subscription.url(), "Press Ctrl-C to stop");
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            subscription.cancel();
        }
        () = subscription.closed() => {}
    }

    subscription.join().await?;
    info!("Stream closed");
    Ok(())
}
