use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

use alert_store::{DailyLogWriter, LogSearcher};

use super::feed::{connect, feed_url, run_feed, Ingest};
use super::shutdown_signal;
use crate::config::{Effective, ListenArgs};
use crate::error::WdcError;

/// What ended the listener's main wait.
enum Stop {
    Signal(std::io::Result<()>),
    Feed(Result<Result<(), WdcError>, JoinError>),
    Api(Result<Result<(), String>, JoinError>),
}

pub async fn run(args: ListenArgs) -> Result<(), WdcError> {
    let eff = Effective::for_listen(&args)?;
    tracing::info!(log_dir = %eff.store.log_dir.display(), "wdc listener starting");

    let writer = DailyLogWriter::open(&eff.store.log_dir)?;
    let ws = connect(&feed_url(&eff.addr, &eff.end_point)).await?;

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();

    let mut feed_handle = tokio::spawn(run_feed(ws, Ingest::new(writer), token.clone()));

    // --- Info server (HTTP) ---
    let searcher = LogSearcher::from_config(&eff.store);
    let mut api_handle =
        tokio::spawn(alert_api_server::run(eff.http_port, searcher, token.clone()));

    tracing::info!("listening for alerts");

    // --- Wait for a signal, or for the feed or the info server to die ---
    let stop = tokio::select! {
        signal = shutdown_signal() => Stop::Signal(signal),
        joined = &mut feed_handle => Stop::Feed(joined),
        joined = &mut api_handle => Stop::Api(joined),
    };
    match &stop {
        Stop::Signal(_) => tracing::info!("saving logs..."),
        Stop::Feed(_) => tracing::error!("alert feed stopped, shutting down"),
        Stop::Api(_) => tracing::error!("info server stopped, shutting down"),
    }

    // Closes the ws, flushes the day log and stops the info server.
    token.cancel();

    let (signal, feed, api) = match stop {
        Stop::Signal(signal) => (signal, feed_handle.await, api_handle.await),
        Stop::Feed(feed) => (Ok(()), feed, api_handle.await),
        Stop::Api(api) => (Ok(()), feed_handle.await, api),
    };

    feed.map_err(|e| WdcError::Feed(format!("feed task: {e}")))??;
    api.map_err(|e| WdcError::Api(format!("server task: {e}")))?
        .map_err(WdcError::Api)?;
    signal?;

    tracing::info!("done");
    Ok(())
}
