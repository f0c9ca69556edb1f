use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use alert_store::{AlertRecord, DailyLogWriter};

use super::console::AlertTable;
use crate::error::WdcError;

// ═══════════════════════════════════════════════════════════════
//  Connection
// ═══════════════════════════════════════════════════════════════

pub(crate) fn feed_url(addr: &str, end_point: &str) -> String {
    if end_point.starts_with('/') {
        format!("ws://{addr}{end_point}")
    } else {
        format!("ws://{addr}/{end_point}")
    }
}

pub(crate) async fn connect(
    url: &str,
) -> Result<WebSocketStream<MaybeTlsStream<TcpStream>>, WdcError> {
    let (ws, _) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| WdcError::Feed(format!("connect {url}: {e}")))?;
    tracing::info!(%url, "connected to alert server");
    Ok(ws)
}

// ═══════════════════════════════════════════════════════════════
//  Ingestion loop: ws message → AlertRecord → console + day log
// ═══════════════════════════════════════════════════════════════

/// Decode and validate one feed payload.
pub(crate) fn decode_alert(payload: &str) -> Result<AlertRecord, WdcError> {
    let alert: AlertRecord = serde_json::from_str(payload)?;
    alert.validate()?;
    Ok(alert)
}

/// Single ingestion path: owns the writer for the lifetime of the feed.
pub(crate) struct Ingest {
    writer: DailyLogWriter,
    table: AlertTable,
}

impl Ingest {
    pub(crate) fn new(writer: DailyLogWriter) -> Self {
        Self { writer, table: AlertTable::default() }
    }

    fn handle(&mut self, payload: &str) {
        let alert = match decode_alert(payload) {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!(error = %e, "dropping alert");
                return;
            }
        };

        self.table.print(&alert);
        if let Err(e) = self.writer.append(&alert) {
            tracing::error!(id = %alert.id, error = %e, "could not log alert");
        }
    }

    fn close(self) -> Result<(), WdcError> {
        self.writer.close()?;
        Ok(())
    }
}

/// Read alerts until `token` fires (clean close, `Ok`) or the connection
/// fails (`Err`). The writer is closed on both paths.
pub(crate) async fn run_feed<S>(
    mut ws: WebSocketStream<S>,
    mut ingest: Ingest,
    token: CancellationToken,
) -> Result<(), WdcError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let result = loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => {
                let frame = CloseFrame { code: CloseCode::Normal, reason: Utf8Bytes::from_static("") };
                match ws.send(Message::Close(Some(frame))).await {
                    Ok(()) => tracing::info!("connection closed"),
                    Err(e) => tracing::warn!(error = %e, "could not close connection"),
                }
                break Ok(());
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => ingest.handle(text.as_str()),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => ingest.handle(text),
                        Err(e) => tracing::warn!(error = %e, "dropping non-utf8 alert"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        break Err(WdcError::Feed(format!("server closed connection: {frame:?}")));
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => break Err(WdcError::Feed(format!("read: {e}"))),
                    None => break Err(WdcError::Feed("connection dropped".into())),
                }
            }
        }
    };

    let closed = ingest.close();
    result.and(closed)
}
