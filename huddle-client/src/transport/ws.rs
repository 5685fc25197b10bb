use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use huddle_core::SignalMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::transport::{SignalTransport, TransportEvent};

/// WebSocket link to the relay: one writer task draining an outbound queue,
/// one reader task decoding frames into [`TransportEvent`]s.
pub struct WsTransport {
    out_tx: Option<mpsc::UnboundedSender<SignalMessage>>,
    open: Arc<AtomicBool>,
    recv_task: JoinHandle<()>,
}

impl WsTransport {
    /// Connects to the relay endpoint. Fails with [`Error::Connection`] on
    /// refusal or network error; nothing is retried.
    pub async fn connect(endpoint: &str) -> Result<(Self, mpsc::Receiver<TransportEvent>)> {
        let (stream, _) = connect_async(endpoint)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        debug!(endpoint, "relay link established");

        let (mut sink, mut source) = stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SignalMessage>();
        let (event_tx, event_rx) = mpsc::channel(64);
        let open = Arc::new(AtomicBool::new(true));

        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                match serde_json::to_string(&message) {
                    Ok(json) => {
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => error!("failed to serialize signal message: {e}"),
                }
            }
            let _ = sink.close().await;
        });

        let recv_task = tokio::spawn({
            let open = open.clone();
            async move {
                while let Some(frame) = source.next().await {
                    match frame {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<SignalMessage>(&text) {
                                Ok(signal) => {
                                    if event_tx.send(TransportEvent::Signal(signal)).await.is_err()
                                    {
                                        // session is gone
                                        return;
                                    }
                                }
                                Err(e) => warn!("dropping malformed relay frame: {e}"),
                            }
                        }
                        Ok(Message::Close(_)) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
                open.store(false, Ordering::Relaxed);
                let _ = event_tx.send(TransportEvent::Closed).await;
            }
        });

        Ok((
            Self {
                out_tx: Some(out_tx),
                open,
                recv_task,
            },
            event_rx,
        ))
    }
}

#[async_trait]
impl SignalTransport for WsTransport {
    fn send(&self, message: SignalMessage) {
        let Some(out_tx) = &self.out_tx else {
            warn!("relay link closed, dropping outbound signal");
            return;
        };
        if out_tx.send(message).is_err() {
            warn!("relay link is down, dropping outbound signal");
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed) && self.out_tx.is_some()
    }

    async fn close(&mut self) {
        // dropping the queue ends the writer task, which closes the sink
        self.out_tx.take();
        self.open.store(false, Ordering::Relaxed);
        self.recv_task.abort();
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
