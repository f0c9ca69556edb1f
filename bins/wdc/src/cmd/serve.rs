use tokio_util::sync::CancellationToken;

use alert_store::LogSearcher;

use super::shutdown_signal;
use crate::config::{Effective, ServeArgs};
use crate::error::WdcError;

pub async fn run(args: ServeArgs) -> Result<(), WdcError> {
    let eff = Effective::for_serve(&args)?;
    let searcher = LogSearcher::from_config(&eff.store);
    tracing::info!(
        log_dir = %searcher.dir().display(),
        window_days = searcher.window_days().get(),
        "wdc info server starting"
    );

    let token = CancellationToken::new();
    let mut api_handle = tokio::spawn(alert_api_server::run(eff.http_port, searcher, token.clone()));

    let signal = tokio::select! {
        signal = shutdown_signal() => signal,
        joined = &mut api_handle => {
            // Bind/serve failure before any signal.
            return match joined {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(WdcError::Api(e)),
                Err(e) => Err(WdcError::Api(format!("server task: {e}"))),
            };
        }
    };

    tracing::info!("shutting down...");
    token.cancel();
    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(WdcError::Api(e)),
        Err(e) => return Err(WdcError::Api(format!("server task: {e}"))),
    }
    signal?;

    tracing::info!("shutdown complete");
    Ok(())
}
